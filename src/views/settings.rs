use crate::ui::AppSession;
use dioxus::prelude::*;

#[component]
pub fn SystemPromptPanel(session: Signal<AppSession>) -> Element {
    let mut session = session;
    let prompt = session.read().preferences().system_prompt.clone();

    rsx! {
        div { class: "settings-section panel",
            label { class: "section-title", r#for: "system-prompt", "System prompt (optional)" }
            textarea {
                id: "system-prompt",
                rows: "2",
                placeholder: "e.g. You are a friendly assistant. Keep answers short.",
                value: "{prompt}",
                oninput: move |ev| session.write().set_system_prompt(ev.value()),
            }
            p { class: "text-muted",
                "Sent silently with the 'system' role to steer every reply."
            }
        }
    }
}
