#[cfg(target_arch = "wasm32")]
use dioxus::prelude::document;

pub async fn copy_to_clipboard(text: String) {
    #[cfg(not(any(target_arch = "wasm32", feature = "desktop", feature = "mobile")))]
    tracing::debug!(len = text.len(), "no clipboard on this target");
    #[cfg(all(
        not(target_arch = "wasm32"),
        any(feature = "desktop", feature = "mobile")
    ))]
    {
        match arboard::Clipboard::new() {
            Ok(mut cb) => {
                if let Err(err) = cb.set_text(text) {
                    tracing::warn!(error = %err, "clipboard write failed");
                }
            }
            Err(err) => tracing::warn!(error = %err, "clipboard unavailable"),
        }
    }
    #[cfg(target_arch = "wasm32")]
    {
        if let Ok(literal) = serde_json::to_string(&text) {
            let script = format!("await navigator.clipboard.writeText({literal}); return true;");
            if let Err(err) = document::eval(&script).await {
                tracing::warn!(error = ?err, "clipboard write failed");
            }
        }
    }
}

pub async fn pause_ms(ms: u64) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }
    #[cfg(target_arch = "wasm32")]
    {
        let script = format!("await new Promise(r => setTimeout(r, {ms})); return true;");
        let _ = document::eval(&script).await;
    }
}
