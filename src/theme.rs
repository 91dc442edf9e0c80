use crate::types::ThemeMode;

pub struct ThemeDefinition {
    pub css: &'static str,
    pub root_class: &'static str,
}

pub fn theme_definition(mode: ThemeMode) -> ThemeDefinition {
    match mode {
        ThemeMode::Dark => ThemeDefinition {
            css: DARK_THEME,
            root_class: "app dark",
        },
        ThemeMode::Light => ThemeDefinition {
            css: LIGHT_THEME,
            root_class: "app",
        },
    }
}

/// Stored preference, then system preference, then light.
pub fn resolve_theme(stored: Option<ThemeMode>, system_prefers_dark: bool) -> ThemeMode {
    match stored {
        Some(mode) => mode,
        None if system_prefers_dark => ThemeMode::Dark,
        None => ThemeMode::Light,
    }
}

#[cfg(target_arch = "wasm32")]
pub fn system_prefers_dark() -> bool {
    web_sys::window()
        .and_then(|window| window.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|query| query.matches())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn system_prefers_dark() -> bool {
    false
}

const LIGHT_THEME: &str = r#"
:root {
    --color-bg-primary: #f7f8fa;
    --color-bg-panel: rgba(255, 255, 255, 0.8);
    --color-text-primary: #18181b;
    --color-text-muted: #71717a;
    --color-border: #e4e4e7;
    --color-input-bg: #ffffff;
    --color-chat-user-bg: #4f46e5;
    --color-chat-user-text: #ffffff;
    --color-chat-assistant-bg: #ffffff;
    --color-chat-assistant-text: #27272a;
    --color-badge-bg: rgba(255, 255, 255, 0.7);
    --color-warning-bg: #fef2f2;
    --color-warning-text: #dc2626;
    --color-persist-on: #d1fae5;
    --color-toast-bg: #059669;
}
body { background: var(--color-bg-primary); color: var(--color-text-primary); }
"#;

const DARK_THEME: &str = r#"
:root {
    --color-bg-primary: #09090b;
    --color-bg-panel: rgba(24, 24, 27, 0.7);
    --color-text-primary: #f4f4f5;
    --color-text-muted: #a1a1aa;
    --color-border: #3f3f46;
    --color-input-bg: #18181b;
    --color-chat-user-bg: #4f46e5;
    --color-chat-user-text: #ffffff;
    --color-chat-assistant-bg: #27272a;
    --color-chat-assistant-text: #f4f4f5;
    --color-badge-bg: rgba(39, 39, 42, 0.7);
    --color-warning-bg: rgba(127, 29, 29, 0.4);
    --color-warning-text: #fca5a5;
    --color-persist-on: rgba(6, 78, 59, 0.4);
    --color-toast-bg: #059669;
}
body { background: var(--color-bg-primary); color: var(--color-text-primary); }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_preference_wins() {
        assert_eq!(resolve_theme(Some(ThemeMode::Light), true), ThemeMode::Light);
        assert_eq!(resolve_theme(Some(ThemeMode::Dark), false), ThemeMode::Dark);
    }

    #[test]
    fn system_then_default() {
        assert_eq!(resolve_theme(None, true), ThemeMode::Dark);
        assert_eq!(resolve_theme(None, false), ThemeMode::Light);
    }

    #[test]
    fn definitions_differ_per_mode() {
        assert!(theme_definition(ThemeMode::Dark).root_class.contains("dark"));
        assert_ne!(
            theme_definition(ThemeMode::Dark).css,
            theme_definition(ThemeMode::Light).css
        );
    }
}
