/// Remote completion client for chatdesk
///
/// Sends the conversation to the local proxy (`/api/chat`) and turns whatever
/// comes back into an assistant message.
///
/// # Architecture
///
/// - `client` - payload building, reply interpretation, error banners
/// - `extract` - ordered reply extractors for the proxy's `data` field
/// - `transport` - HTTP seam (reqwest by default, stubbed in tests)
///
/// # Usage
///
/// ```rust,no_run
/// use chatdesk::ai::{CompletionClient, CompletionRequest};
/// use chatdesk::config::ClientConfig;
/// use chatdesk::types::ChatMessage;
///
/// # async fn example() {
/// let client = CompletionClient::new(ClientConfig::from_env());
/// let user = ChatMessage::user("Hello!", 0);
/// let request = CompletionRequest::build(&[], "", &user, "deepseek-chat@DeepSeek", 256);
/// let reply = client.send(&request).await;
/// println!("{}", reply.content);
/// # }
/// ```
mod client;
pub mod extract;
mod transport;

pub use client::{
    ChatError, ChatResult, CompletionClient, CompletionRequest, ERROR_PREFIX, WireMessage,
    error_banner, interpret_reply, is_error_banner,
};
pub use transport::{HttpTransport, Transport, TransportReply};
