//! Local completion proxy.
//!
//! Keeps the upstream API token server-side. The UI posts
//! `{messages, model?, max_tokens?}` to `/api/chat` and gets back
//! `{ok, status, data}` where `data` is whatever the provider returned
//! (or `{raw: <text>}` when that was not JSON).

mod error;

pub use error::ProxyError;

use crate::config::{ConfigSource, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.deepseek.com/chat/completions";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq)]
pub struct ProxyConfig {
    pub token: Option<String>,
    pub upstream_url: String,
    pub bind_address: String,
    /// Comma-separated allow list; `None` allows any origin.
    pub cors_origins: Option<String>,
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self::from_source(&ConfigSource::from_env())
    }

    pub fn from_source<F: Fn(&str) -> Option<String>>(source: &ConfigSource<F>) -> Self {
        Self {
            token: source.get("CHATDESK_API_TOKEN"),
            upstream_url: source
                .get("CHATDESK_UPSTREAM_URL")
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
            bind_address: source
                .get("CHATDESK_BIND")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            cors_origins: source.get("CHATDESK_CORS_ORIGINS"),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

pub struct ProxyState {
    pub config: ProxyConfig,
    pub client: reqwest::Client,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatProxyRequest {
    #[serde(default)]
    pub messages: Vec<Value>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct UpstreamPayload<'a> {
    model: &'a str,
    messages: &'a [Value],
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyEnvelope {
    pub ok: bool,
    pub status: u16,
    pub data: Value,
}

/// Upstream body as JSON, or wrapped as `{raw: text}` when it is not.
pub fn parse_upstream_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

pub fn envelope(status: u16, body: &str) -> ProxyEnvelope {
    ProxyEnvelope {
        ok: (200..300).contains(&status),
        status,
        data: parse_upstream_body(body),
    }
}

fn cors_layer(config: &ProxyConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .as_deref()
        .map(|list| list.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let layer = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .layer(cors_layer(&state.config))
        .with_state(state)
}

pub async fn chat(State(state): State<Arc<ProxyState>>, body: Bytes) -> Result<Response, ProxyError> {
    let token = state
        .config
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or(ProxyError::MissingToken)?;

    let request: ChatProxyRequest =
        serde_json::from_slice(&body).map_err(|e| ProxyError::BadRequest(e.to_string()))?;

    let payload = UpstreamPayload {
        model: request.model.as_deref().unwrap_or(DEFAULT_MODEL),
        messages: &request.messages,
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        stream: false,
    };
    debug!(model = payload.model, messages = payload.messages.len(), "forwarding chat request");

    let upstream = state
        .client
        .post(&state.config.upstream_url)
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await?;
    let status = upstream.status().as_u16();
    let text = upstream.text().await?;
    info!(status, "upstream replied");

    let reply = envelope(status, &text);
    let http_status = if reply.ok {
        StatusCode::OK
    } else {
        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
    };
    Ok((http_status, Json(reply)).into_response())
}

pub async fn health(State(state): State<Arc<ProxyState>>) -> Json<Value> {
    Json(json!({ "ok": true, "hasToken": state.config.has_token() }))
}
