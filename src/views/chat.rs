use crate::ai::{CompletionClient, ERROR_PREFIX, is_error_banner};
use crate::config::ClientConfig;
use crate::conversation::{
    date_label, format_message_time, local_offset, needs_date_separator, now_millis,
};
use crate::markdown::markdown_to_html;
use crate::types::{ChatMessage, Role};
use crate::ui::AppSession;
use crate::view_state::{
    COPY_FEEDBACK_MS, KeyIntent, SUGGESTIONS, ScrollMetrics, SendSource, UiState, key_intent,
};
use crate::views::shared::{copy_to_clipboard, pause_ms};
use dioxus::events::Key;
use dioxus::prelude::*;
use std::rc::Rc;
use time::{OffsetDateTime, UtcOffset};

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    }
}

async fn read_scroll_metrics(el: Rc<MountedData>) -> Option<ScrollMetrics> {
    let offset = el.get_scroll_offset().await.ok()?;
    let size = el.get_scroll_size().await.ok()?;
    let rect = el.get_client_rect().await.ok()?;
    Some(ScrollMetrics {
        scroll_height: size.height,
        scroll_top: offset.y,
        client_height: rect.size.height,
    })
}

fn scroll_into_view(el: Option<Rc<MountedData>>) {
    if let Some(el) = el {
        spawn(async move {
            let _ = el.scroll_to(ScrollBehavior::Smooth).await;
        });
    }
}

#[component]
pub fn ChatView(
    session: Signal<AppSession>,
    ui: Signal<UiState>,
    config: Signal<ClientConfig>,
) -> Element {
    let mut session = session;
    let mut ui = ui;
    let mut input = use_signal(String::new);
    let mut list_el = use_signal(|| Option::<Rc<MountedData>>::None);
    let mut bottom_el = use_signal(|| Option::<Rc<MountedData>>::None);

    // Follow the newest message unless the user scrolled away.
    use_effect(move || {
        let _ = session.read().messages().len();
        let _ = session.read().is_busy();
        if ui.read().auto_scroll {
            scroll_into_view(bottom_el());
        }
    });

    let mut send_message = move |text: String, source: SendSource| {
        let Some(request) = session.write().begin_send(&text, now_millis()) else {
            return;
        };
        if source.clears_input() {
            input.set(String::new());
        }
        ui.write().last_error = None;
        let client_config = config.read().clone();
        spawn(async move {
            let client = CompletionClient::new(client_config);
            let reply = client.send(&request).await;
            if is_error_banner(&reply) {
                let reason = reply.content.trim_start_matches(ERROR_PREFIX).to_string();
                ui.write().last_error = Some(reason);
            }
            session.write().finish_send(reply, now_millis());
        });
    };

    let offset = local_offset();
    let today = OffsetDateTime::now_utc().to_offset(offset).date();
    let (messages_snapshot, busy) = {
        let state = session.read();
        (state.messages().to_vec(), state.is_busy())
    };
    let separators: Vec<Option<String>> = (0..messages_snapshot.len())
        .map(|i| {
            if needs_date_separator(&messages_snapshot, i, offset) {
                messages_snapshot[i]
                    .created_at
                    .and_then(|ts| date_label(ts, today, offset))
            } else {
                None
            }
        })
        .collect();
    let auto_scroll = ui.read().auto_scroll;
    let last_error = ui.read().last_error.clone();
    let can_send = !busy && !input().trim().is_empty();

    rsx! {
        div { class: "main-container",
            div { class: "chat-wrap",
                div {
                    id: "chat-list",
                    class: "chat-list",
                    onmounted: move |ev| list_el.set(Some(ev.data())),
                    onscroll: move |_| async move {
                        if let Some(el) = list_el() {
                            if let Some(metrics) = read_scroll_metrics(el).await {
                                ui.write().on_scroll(metrics);
                            }
                        }
                    },
                    if messages_snapshot.is_empty() {
                        p { class: "text-muted", "No messages yet." }
                    }
                    for (i, msg) in messages_snapshot.iter().enumerate() {
                        MessageRow {
                            key: "{i}",
                            message: msg.clone(),
                            separator: separators[i].clone(),
                            offset,
                            ui,
                        }
                    }
                    if busy {
                        div { class: "message-row assistant",
                            div { class: "bubble assistant",
                                span { class: "typing-dots",
                                    span { class: "dot" }
                                    span { class: "dot" }
                                    span { class: "dot" }
                                }
                            }
                        }
                    }
                    div { class: "chat-bottom", onmounted: move |ev| bottom_el.set(Some(ev.data())) }
                }
                if !auto_scroll {
                    button {
                        class: "jump-bottom",
                        r#type: "button",
                        onclick: move |_| {
                            ui.write().jump_to_bottom();
                            scroll_into_view(bottom_el());
                        },
                        "Jump to latest"
                    }
                }
            }

            div { class: "suggestions",
                for suggestion in SUGGESTIONS.iter().copied() {
                    button {
                        class: "suggestion",
                        r#type: "button",
                        disabled: busy,
                        onclick: move |_| send_message(suggestion.to_string(), SendSource::Suggestion),
                        "{suggestion}"
                    }
                }
            }

            form { class: "composer", onsubmit: move |ev| ev.prevent_default(),
                div { class: "composer-inner",
                    textarea {
                        rows: "2",
                        placeholder: "Type a message… (Enter to send, Shift+Enter for a new line)",
                        value: "{input}",
                        oninput: move |ev| input.set(ev.value()),
                        onkeydown: move |ev| {
                            let modifiers = ev.modifiers();
                            let intent = key_intent(
                                ev.key() == Key::Enter,
                                modifiers.shift(),
                                modifiers.ctrl() || modifiers.meta(),
                            );
                            if intent == KeyIntent::Send {
                                ev.prevent_default();
                                send_message(input(), SendSource::Typed);
                            }
                        },
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: !can_send,
                        onclick: move |_| send_message(input(), SendSource::Typed),
                        "Send"
                    }
                }
            }

            if let Some(err) = last_error {
                p { class: "error-line", "{err}" }
            }
        }
    }
}

#[component]
fn MessageRow(
    message: ChatMessage,
    separator: Option<String>,
    offset: UtcOffset,
    ui: Signal<UiState>,
) -> Element {
    let mut ui = ui;
    let class = role_class(message.role);
    let time_label = message
        .created_at
        .and_then(|ts| format_message_time(ts, offset));
    let body_html = match message.role {
        Role::Assistant => Some(markdown_to_html(&message.content)),
        _ => None,
    };
    let copy_payload = message.content.clone();
    let on_copy = move |_| {
        let text = copy_payload.clone();
        spawn(async move {
            copy_to_clipboard(text).await;
            ui.write().copy_feedback = Some("Copied!".to_string());
            pause_ms(COPY_FEEDBACK_MS).await;
            ui.write().copy_feedback = None;
        });
    };

    rsx! {
        if let Some(label) = separator {
            div { class: "date-separator",
                span { class: "date-pill", "{label}" }
            }
        }
        div { class: format_args!("message-row {}", class),
            if matches!(message.role, Role::Assistant) {
                div { class: "avatar assistant", "AI" }
            }
            div { class: format_args!("bubble {}", class),
                button { class: "action-btn", title: "Copy", onclick: on_copy, "Copy" }
                if let Some(html) = body_html {
                    div { class: "md", dangerous_inner_html: "{html}" }
                } else {
                    p { class: "plain", "{message.content}" }
                }
                if let Some(ts) = time_label {
                    span { class: "message-timestamp", "{ts}" }
                }
            }
            if matches!(message.role, Role::User) {
                div { class: "avatar user", "U" }
            }
        }
    }
}
