use super::extract::extract_reply;
use super::transport::{HttpTransport, Transport, TransportReply};
use crate::config::ClientConfig;
use crate::conversation::now_millis;
use crate::types::{ChatMessage, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

// ============================================
// Error Types
// ============================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("{0}")]
    Network(String),

    /// Non-success reply; `message` is what the user sees.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Decode(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

/// Prefix marking a locally synthesized failure message.
pub const ERROR_PREFIX: &str = "⚠️ Error: ";

pub fn error_banner(err: &ChatError) -> ChatMessage {
    ChatMessage::new(Role::Assistant, format!("{ERROR_PREFIX}{err}"), None)
}

pub fn is_error_banner(message: &ChatMessage) -> bool {
    message.role == Role::Assistant && message.content.starts_with(ERROR_PREFIX)
}

// ============================================
// Request payload
// ============================================

/// A message as sent over the wire: role and content only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Optional system prompt, then `history`, then `user_message`.
    pub fn build(
        history: &[ChatMessage],
        system_prompt: &str,
        user_message: &ChatMessage,
        model: &str,
        max_tokens: u32,
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !system_prompt.trim().is_empty() {
            messages.push(WireMessage {
                role: Role::System,
                content: system_prompt.to_string(),
            });
        }
        messages.extend(history.iter().map(WireMessage::from));
        messages.push(WireMessage::from(user_message));
        Self {
            messages,
            model: Some(model.to_string()),
            max_tokens: Some(max_tokens),
        }
    }
}

#[derive(Deserialize)]
struct HealthReply {
    #[serde(rename = "hasToken")]
    has_token: Option<bool>,
}

// ============================================
// Reply interpretation
// ============================================

/// Map a proxy reply onto the assistant text or a user-facing error.
pub fn interpret_reply(reply: &TransportReply) -> ChatResult<String> {
    let payload: Option<Value> = serde_json::from_str(&reply.body).ok();

    let reported_ok = payload
        .as_ref()
        .and_then(|p| p.get("ok"))
        .and_then(Value::as_bool)
        .unwrap_or(true);

    if !reply.is_success() || !reported_ok {
        let status = payload
            .as_ref()
            .and_then(|p| p.get("status"))
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
            .filter(|_| reply.is_success())
            .unwrap_or(reply.status);
        let message = payload
            .as_ref()
            .and_then(|p| p.get("error"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed ({status})"));
        return Err(ChatError::Status { status, message });
    }

    let payload = payload.ok_or_else(|| {
        ChatError::Decode(format!("proxy returned non-JSON body ({} bytes)", reply.body.len()))
    })?;
    let data = payload.get("data").unwrap_or(&Value::Null);
    Ok(extract_reply(data))
}

// ============================================
// Client
// ============================================

pub struct CompletionClient<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl CompletionClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(HttpTransport::new(), config)
    }
}

impl<T: Transport> CompletionClient<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One POST to the proxy. No retry.
    pub async fn complete(&self, request: &CompletionRequest) -> ChatResult<String> {
        let body = serde_json::to_value(request)?;
        let url = self.config.chat_url();
        debug!(%url, messages = request.messages.len(), "sending completion request");
        let reply = self.transport.post_json(&url, &body).await?;
        debug!(status = reply.status, "completion reply received");
        interpret_reply(&reply)
    }

    /// Like [`Self::complete`], but failures come back as an error banner.
    pub async fn send(&self, request: &CompletionRequest) -> ChatMessage {
        match self.complete(request).await {
            Ok(text) => ChatMessage::assistant(text, now_millis()),
            Err(err) => {
                warn!(error = %err, "completion failed");
                error_banner(&err)
            }
        }
    }

    /// Whether the proxy has an upstream credential. Assumes yes when unknown.
    pub async fn check_health(&self) -> bool {
        let url = self.config.health_url();
        match self.transport.get(&url).await {
            Ok(reply) => serde_json::from_str::<HealthReply>(&reply.body)
                .ok()
                .and_then(|health| health.has_token)
                .unwrap_or(true),
            Err(err) => {
                debug!(error = %err, "health check failed");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_prepends_system_prompt() {
        let history = vec![ChatMessage::assistant("hi", 1)];
        let user = ChatMessage::user("question", 2);
        let request = CompletionRequest::build(&history, "Be brief.", &user, "m", 64);
        let roles: Vec<_> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
        assert_eq!(request.messages[0].content, "Be brief.");
        assert_eq!(request.max_tokens, Some(64));
    }

    #[test]
    fn blank_system_prompt_is_omitted() {
        let user = ChatMessage::user("q", 2);
        let request = CompletionRequest::build(&[], "  \n", &user, "m", 64);
        assert_eq!(request.messages.len(), 1);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({"messages": [{"role": "user", "content": "q"}], "model": "m", "max_tokens": 64})
        );
    }

    #[test]
    fn success_reply_extracts_content() {
        let reply = TransportReply::new(
            200,
            r#"{"ok":true,"status":200,"data":{"choices":[{"message":{"content":"hello"}}]}}"#,
        );
        assert_eq!(interpret_reply(&reply).unwrap(), "hello");
    }

    #[test]
    fn failed_reply_without_error_reports_status() {
        let reply = TransportReply::new(500, r#"{"ok":false,"status":500,"data":{"detail":"x"}}"#);
        let err = interpret_reply(&reply).unwrap_err();
        assert_eq!(
            err,
            ChatError::Status {
                status: 500,
                message: "Request failed (500)".into()
            }
        );
        assert!(error_banner(&err).content.contains("500"));
    }

    #[test]
    fn proxy_error_message_wins() {
        let reply = TransportReply::new(500, r#"{"error":"Missing server token"}"#);
        assert_eq!(
            interpret_reply(&reply).unwrap_err().to_string(),
            "Missing server token"
        );
    }

    #[test]
    fn ok_false_envelope_is_a_failure_even_with_200() {
        let reply = TransportReply::new(200, r#"{"ok":false,"status":429,"data":{}}"#);
        let err = interpret_reply(&reply).unwrap_err();
        assert_eq!(err.to_string(), "Request failed (429)");
    }

    #[test]
    fn non_json_bodies() {
        let reply = TransportReply::new(502, "<html>Bad Gateway</html>");
        assert_eq!(
            interpret_reply(&reply).unwrap_err().to_string(),
            "Request failed (502)"
        );
        let reply = TransportReply::new(200, "not json");
        assert!(matches!(interpret_reply(&reply), Err(ChatError::Decode(_))));
    }

    #[test]
    fn banner_is_untimestamped_assistant_message() {
        let banner = error_banner(&ChatError::Network("connection refused".into()));
        assert_eq!(banner.role, Role::Assistant);
        assert_eq!(banner.created_at, None);
        assert!(is_error_banner(&banner));
        assert_eq!(banner.content, "⚠️ Error: connection refused");
    }
}
