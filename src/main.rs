#[cfg(not(target_arch = "wasm32"))]
fn init_native() {
    // .env is optional; the bundled config covers everything else.
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    init_native();

    dioxus::launch(chatdesk::ui::App);
}
