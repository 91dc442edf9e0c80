//! chatdesk-proxy: keeps the upstream token server-side for the chat UI.

use chatdesk::proxy::{self, ProxyConfig, ProxyState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    let config = ProxyConfig::from_env();
    if !config.has_token() {
        warn!("CHATDESK_API_TOKEN is not set; /api/chat will answer 500");
    }

    let addr: SocketAddr = config.bind_address.parse()?;
    let app = proxy::router(Arc::new(ProxyState::new(config)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "chatdesk proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("chatdesk proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install CTRL+C signal handler");
    }
}
