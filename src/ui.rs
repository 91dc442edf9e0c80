use crate::ai::CompletionClient;
use crate::config::ClientConfig;
use crate::conversation::now_millis;
use crate::session::ChatSession;
use crate::storage::{PlatformStore, platform_store};
use crate::theme::{system_prefers_dark, theme_definition};
use crate::types::ThemeMode;
use crate::view_state::UiState;
use crate::views::{ChatView, SystemPromptPanel};
use dioxus::prelude::*;

const CHATDESK_CSS: Asset = asset!("/assets/chatdesk.css");

pub type AppSession = ChatSession<PlatformStore>;

#[component]
pub fn App() -> Element {
    let config = use_signal(ClientConfig::from_env);
    let session = use_signal(|| {
        ChatSession::restore(
            platform_store(),
            &config.peek(),
            system_prefers_dark(),
            now_millis(),
        )
    });
    let ui = use_signal(UiState::default);

    use_health_check(config, ui);

    let theme = session.read().preferences().theme;
    let definition = theme_definition(theme);
    let show_prompt = ui.read().show_system_prompt;
    let feedback = ui.read().copy_feedback.clone();

    rsx! {
        ThemeStyles { theme }
        div { class: "{definition.root_class}",
            AppHeader { session, ui }
            if show_prompt {
                SystemPromptPanel { session }
            }
            ChatView { session, ui, config }
            if let Some(message) = feedback {
                div { class: "toast", "{message}" }
            }
        }
    }
}

fn use_health_check(config: Signal<ClientConfig>, ui: Signal<UiState>) {
    let mut ui = ui;
    use_future(move || async move {
        let client = CompletionClient::new(config.peek().clone());
        let has_token = client.check_health().await;
        ui.write().has_token = has_token;
    });
}

#[component]
fn ThemeStyles(theme: ThemeMode) -> Element {
    let definition = theme_definition(theme);
    rsx! {
        document::Link { rel: "stylesheet", href: CHATDESK_CSS }
        style { dangerous_inner_html: "{definition.css}" }
    }
}

#[component]
fn AppHeader(session: Signal<AppSession>, ui: Signal<UiState>) -> Element {
    let mut session = session;
    let mut ui = ui;
    let (model, persist_enabled, theme) = {
        let state = session.read();
        (
            state.model().to_string(),
            state.preferences().persist_enabled,
            state.preferences().theme,
        )
    };
    let has_token = ui.read().has_token;
    let persist_class = if persist_enabled {
        "btn persist on"
    } else {
        "btn persist"
    };
    let persist_label = if persist_enabled {
        "Persist: On"
    } else {
        "Persist: Off"
    };
    let theme_label = match theme {
        ThemeMode::Light => "Dark mode",
        ThemeMode::Dark => "Light mode",
    };

    rsx! {
        header { class: "header",
            div { class: "header-content",
                div { class: "brand",
                    h1 { class: "title", "Chat" }
                    span { class: "badge", "{model}" }
                    if !has_token {
                        span { class: "badge warning", "Server token missing" }
                    }
                }
                div { class: "header-actions",
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| {
                            ui.write().last_error = None;
                            session.write().clear(now_millis());
                        },
                        "Clear"
                    }
                    button {
                        class: persist_class,
                        r#type: "button",
                        title: "Save messages in this browser",
                        onclick: move |_| {
                            session.write().toggle_persist();
                        },
                        "{persist_label}"
                    }
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| {
                            session.write().toggle_theme();
                        },
                        "{theme_label}"
                    }
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| {
                            let mut state = ui.write();
                            state.show_system_prompt = !state.show_system_prompt;
                        },
                        "System prompt"
                    }
                }
            }
        }
    }
}
