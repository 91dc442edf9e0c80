//! View-side state and input policies that do not depend on a renderer.

/// Distance from the bottom, in pixels, beyond which autoscroll pauses.
pub const AUTOSCROLL_THRESHOLD_PX: f64 = 80.0;

/// How long the "Copied!" toast stays up.
pub const COPY_FEEDBACK_MS: u64 = 2_000;

pub const SUGGESTIONS: &[&str] = &[
    "Tell me what you can do",
    "Summarize this paragraph",
    "Write a leave request email",
    "Suggest some content ideas",
];

/// Per-window UI state that is not persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct UiState {
    pub auto_scroll: bool,
    pub has_token: bool,
    pub show_system_prompt: bool,
    pub copy_feedback: Option<String>,
    pub last_error: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            auto_scroll: true,
            has_token: true,
            show_system_prompt: false,
            copy_feedback: None,
            last_error: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_height: f64,
    pub scroll_top: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn distance_from_bottom(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    pub fn is_near_bottom(&self) -> bool {
        self.distance_from_bottom() < AUTOSCROLL_THRESHOLD_PX
    }
}

impl UiState {
    /// Follow new messages only while the user stays near the bottom.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        self.auto_scroll = metrics.is_near_bottom();
    }

    pub fn jump_to_bottom(&mut self) {
        self.auto_scroll = true;
    }
}

/// Where a send came from. Only typed input is cleared afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendSource {
    Typed,
    Suggestion,
}

impl SendSource {
    pub fn clears_input(self) -> bool {
        matches!(self, SendSource::Typed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyIntent {
    Send,
    Newline,
    Other,
}

/// Enter sends; Shift+Enter is a newline; Ctrl/Cmd+Enter also sends.
pub fn key_intent(is_enter: bool, shift: bool, ctrl_or_meta: bool) -> KeyIntent {
    match (is_enter, shift, ctrl_or_meta) {
        (false, _, _) => KeyIntent::Other,
        (true, _, true) => KeyIntent::Send,
        (true, true, false) => KeyIntent::Newline,
        (true, false, false) => KeyIntent::Send,
    }
}
