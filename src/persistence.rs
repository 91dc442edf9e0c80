//! Conversation history and preference flags on top of a [`KeyValueStore`].
//!
//! Every operation here is best effort: read failures fall back to defaults
//! and write failures are logged and dropped.

use crate::storage::KeyValueStore;
use crate::types::{ChatMessage, ThemeMode};
use tracing::{debug, warn};

pub const MESSAGES_KEY: &str = "chat_messages";
pub const PERSIST_KEY: &str = "chat_persist";
pub const SYSTEM_PROMPT_KEY: &str = "chat_system_prompt";
pub const THEME_KEY: &str = "theme";

/// Upper bound on persisted history.
pub const MAX_PERSISTED_MESSAGES: usize = 200;

#[derive(Clone, Debug, PartialEq)]
pub struct StoredPreferences {
    /// `None` when nothing (valid) is stored; callers fall back to the system preference.
    pub theme: Option<ThemeMode>,
    pub persist_enabled: bool,
    pub system_prompt: String,
}

impl Default for StoredPreferences {
    fn default() -> Self {
        Self {
            theme: None,
            persist_enabled: true,
            system_prompt: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Messages as stored, not yet migrated. Empty when absent or unreadable.
    pub conversation: Vec<ChatMessage>,
    pub preferences: StoredPreferences,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Preference {
    Theme(ThemeMode),
    PersistEnabled(bool),
    SystemPrompt(String),
}

pub struct PersistenceStore<S> {
    store: S,
}

impl<S: KeyValueStore> PersistenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "storage read failed");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            warn!(key, error = %err, "storage write dropped");
        }
    }

    fn erase(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!(key, error = %err, "storage remove failed");
        }
    }

    pub fn load(&self) -> Snapshot {
        let conversation = self
            .read(MESSAGES_KEY)
            .map(|raw| match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
                Ok(messages) => messages,
                Err(err) => {
                    warn!(error = %err, "ignoring unreadable stored conversation");
                    Vec::new()
                }
            })
            .unwrap_or_default();

        let theme = self.read(THEME_KEY).and_then(|raw| ThemeMode::parse(&raw));
        let persist_enabled = self
            .read(PERSIST_KEY)
            .map(|raw| raw.trim() == "1")
            .unwrap_or(true);
        let system_prompt = self.read(SYSTEM_PROMPT_KEY).unwrap_or_default();

        debug!(
            messages = conversation.len(),
            persist_enabled, "loaded stored chat state"
        );

        Snapshot {
            conversation,
            preferences: StoredPreferences {
                theme,
                persist_enabled,
                system_prompt,
            },
        }
    }

    /// Write the newest [`MAX_PERSISTED_MESSAGES`] messages.
    pub fn save(&self, messages: &[ChatMessage]) {
        let start = messages.len().saturating_sub(MAX_PERSISTED_MESSAGES);
        match serde_json::to_string(&messages[start..]) {
            Ok(json) => self.write(MESSAGES_KEY, &json),
            Err(err) => warn!(error = %err, "failed to serialize conversation"),
        }
    }

    /// Write when persistence is on, erase when it is off.
    pub fn sync(&self, messages: &[ChatMessage], persist_enabled: bool) {
        if persist_enabled {
            self.save(messages);
        } else {
            self.clear();
        }
    }

    pub fn save_preference(&self, preference: &Preference) {
        match preference {
            Preference::Theme(mode) => self.write(THEME_KEY, mode.as_str()),
            Preference::PersistEnabled(enabled) => {
                self.write(PERSIST_KEY, if *enabled { "1" } else { "0" });
                if !enabled {
                    self.clear();
                }
            }
            Preference::SystemPrompt(text) => {
                if text.trim().is_empty() {
                    self.erase(SYSTEM_PROMPT_KEY);
                } else {
                    self.write(SYSTEM_PROMPT_KEY, text);
                }
            }
        }
    }

    /// Remove the stored conversation. Preferences are untouched.
    pub fn clear(&self) {
        self.erase(MESSAGES_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError, StorageResult};
    use crate::types::Role;

    struct FullStore;

    impl KeyValueStore for FullStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("broken".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Rejected("QuotaExceededError".into()))
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Rejected("nope".into()))
        }
    }

    fn messages(count: usize) -> Vec<ChatMessage> {
        (0..count)
            .map(|i| ChatMessage::user(format!("m{i}"), i as i64))
            .collect()
    }

    #[test]
    fn load_defaults_on_empty_store() {
        let persistence = PersistenceStore::new(MemoryStore::new());
        assert_eq!(persistence.load(), Snapshot::default());
    }

    #[test]
    fn load_survives_corrupted_values() {
        let store = MemoryStore::new();
        store.set(MESSAGES_KEY, "{not json").unwrap();
        store.set(THEME_KEY, "purple").unwrap();
        let snapshot = PersistenceStore::new(store).load();
        assert!(snapshot.conversation.is_empty());
        assert_eq!(snapshot.preferences.theme, None);
    }

    #[test]
    fn load_rejects_type_mismatch() {
        let store = MemoryStore::new();
        store.set(MESSAGES_KEY, r#"{"role":"user"}"#).unwrap();
        assert!(PersistenceStore::new(store).load().conversation.is_empty());

        let store = MemoryStore::new();
        store
            .set(MESSAGES_KEY, r#"[{"role":"robot","content":"x"}]"#)
            .unwrap();
        assert!(PersistenceStore::new(store).load().conversation.is_empty());
    }

    #[test]
    fn failing_backend_is_never_fatal() {
        let persistence = PersistenceStore::new(FullStore);
        persistence.save(&messages(3));
        persistence.save_preference(&Preference::PersistEnabled(false));
        persistence.clear();
        assert_eq!(persistence.load(), Snapshot::default());
    }

    #[test]
    fn save_keeps_only_latest_messages() {
        let persistence = PersistenceStore::new(MemoryStore::new());
        persistence.save(&messages(250));
        let loaded = persistence.load().conversation;
        assert_eq!(loaded.len(), MAX_PERSISTED_MESSAGES);
        assert_eq!(loaded[0].content, "m50");
        assert_eq!(loaded.last().map(|m| m.content.as_str()), Some("m249"));
    }

    #[test]
    fn disabling_persistence_erases_history() {
        let persistence = PersistenceStore::new(MemoryStore::new());
        persistence.save(&messages(2));
        persistence.save_preference(&Preference::PersistEnabled(false));
        let snapshot = persistence.load();
        assert!(snapshot.conversation.is_empty());
        assert!(!snapshot.preferences.persist_enabled);
    }

    #[test]
    fn blank_system_prompt_removes_key() {
        let persistence = PersistenceStore::new(MemoryStore::new());
        persistence.save_preference(&Preference::SystemPrompt("Be brief.".into()));
        assert_eq!(persistence.load().preferences.system_prompt, "Be brief.");
        persistence.save_preference(&Preference::SystemPrompt("   ".into()));
        assert_eq!(persistence.inner().get(SYSTEM_PROMPT_KEY).unwrap(), None);
    }

    #[test]
    fn preferences_round_trip() {
        let persistence = PersistenceStore::new(MemoryStore::new());
        persistence.save_preference(&Preference::Theme(ThemeMode::Dark));
        persistence.save_preference(&Preference::PersistEnabled(true));
        let prefs = persistence.load().preferences;
        assert_eq!(prefs.theme, Some(ThemeMode::Dark));
        assert!(prefs.persist_enabled);
        assert_eq!(
            persistence.inner().get(PERSIST_KEY).unwrap().as_deref(),
            Some("1")
        );
    }

    #[test]
    fn stored_messages_keep_roles() {
        let persistence = PersistenceStore::new(MemoryStore::new());
        persistence.save(&[
            ChatMessage::user("q", 1),
            ChatMessage::assistant("a", 2),
        ]);
        let loaded = persistence.load().conversation;
        assert_eq!(loaded[1].role, Role::Assistant);
    }
}
