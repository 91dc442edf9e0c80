//! Runtime configuration.
//!
//! Each key resolves from the process environment first, then from the
//! bundled `assets/config.env`, then from the hard-coded default.

use std::collections::HashMap;

/// Bundled config for builds without a `.env` (wasm, mobile)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:3000";
pub const DEFAULT_MODEL: &str = "deepseek-chat@DeepSeek";
pub const DEFAULT_MAX_TOKENS: u32 = 256;

pub fn bundled_values() -> HashMap<String, String> {
    parse_env_file(BUNDLED_CONFIG)
}

pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    dotenvy::from_read_iter(contents.as_bytes())
        .filter_map(Result::ok)
        .collect()
}

/// Resolves keys from a lookup function with a fallback map.
pub struct ConfigSource<F> {
    lookup: F,
    fallback: HashMap<String, String>,
}

impl ConfigSource<fn(&str) -> Option<String>> {
    pub fn from_env() -> Self {
        fn env_lookup(key: &str) -> Option<String> {
            std::env::var(key).ok()
        }
        Self {
            lookup: env_lookup,
            fallback: bundled_values(),
        }
    }
}

impl<F: Fn(&str) -> Option<String>> ConfigSource<F> {
    pub fn new(lookup: F, fallback: HashMap<String, String>) -> Self {
        Self { lookup, fallback }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .or_else(|| self.fallback.get(key).cloned())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_source(&ConfigSource::from_env())
    }

    pub fn from_source<F: Fn(&str) -> Option<String>>(source: &ConfigSource<F>) -> Self {
        let api_base = source
            .get("CHATDESK_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = source
            .get("CHATDESK_MODEL")
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let max_tokens = source
            .get("CHATDESK_MAX_TOKENS")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);
        Self {
            api_base,
            model,
            max_tokens,
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.api_base)
    }

    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.api_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_env_file_skipping_comments() {
        let values = parse_env_file("# comment\nA=1\n\nB = two\n");
        assert_eq!(values.get("A").map(String::as_str), Some("1"));
        assert!(values.contains_key("B"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn env_wins_over_bundled_and_defaults() {
        let mut fallback = HashMap::new();
        fallback.insert("CHATDESK_MODEL".to_string(), "bundled-model".to_string());
        fallback.insert("CHATDESK_API_BASE".to_string(), "http://bundled".to_string());
        let source = ConfigSource::new(
            |key: &str| (key == "CHATDESK_API_BASE").then(|| "http://env:9000/".to_string()),
            fallback,
        );
        let config = ClientConfig::from_source(&source);
        assert_eq!(config.api_base, "http://env:9000");
        assert_eq!(config.model, "bundled-model");
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.chat_url(), "http://env:9000/api/chat");
    }

    #[test]
    fn bad_max_tokens_falls_back() {
        let source = ConfigSource::new(
            |key: &str| (key == "CHATDESK_MAX_TOKENS").then(|| "lots".to_string()),
            HashMap::new(),
        );
        assert_eq!(ClientConfig::from_source(&source).max_tokens, 256);
    }
}
