use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Missing server token. Set CHATDESK_API_TOKEN in .env")]
    MissingToken,

    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::MissingToken => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(e) => {
                error!(error = %e, "upstream request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
