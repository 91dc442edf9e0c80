//! The chat session: conversation, preferences and storage behind the
//! user actions the UI exposes.

use crate::ai::{CompletionClient, CompletionRequest, Transport};
use crate::config::ClientConfig;
use crate::conversation::Conversation;
use crate::persistence::{PersistenceStore, Preference};
use crate::storage::KeyValueStore;
use crate::theme::resolve_theme;
use crate::types::{ChatMessage, ThemeMode};
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub struct Preferences {
    pub theme: ThemeMode,
    pub persist_enabled: bool,
    pub system_prompt: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Light,
            persist_enabled: true,
            system_prompt: String::new(),
        }
    }
}

pub struct ChatSession<S> {
    conversation: Conversation,
    preferences: Preferences,
    busy: bool,
    store: PersistenceStore<S>,
    model: String,
    max_tokens: u32,
}

impl<S: KeyValueStore> ChatSession<S> {
    /// Restore from storage. Theme: stored, then system preference, then light.
    pub fn restore(store: S, config: &ClientConfig, system_prefers_dark: bool, now: i64) -> Self {
        let store = PersistenceStore::new(store);
        let snapshot = store.load();
        let prefs = snapshot.preferences;
        let conversation = if prefs.persist_enabled {
            Conversation::from_loaded(snapshot.conversation, now)
        } else {
            Conversation::seeded_at(now)
        };
        debug!(messages = conversation.len(), "chat session restored");
        let session = Self {
            conversation,
            preferences: Preferences {
                theme: resolve_theme(prefs.theme, system_prefers_dark),
                persist_enabled: prefs.persist_enabled,
                system_prompt: prefs.system_prompt,
            },
            busy: false,
            store,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        };
        // Migrated stamps must stick, or they shift on every launch.
        session.sync();
        session
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn store(&self) -> &PersistenceStore<S> {
        &self.store
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_send(&self, text: &str) -> bool {
        !self.busy && !text.trim().is_empty()
    }

    fn sync(&self) {
        self.store
            .sync(self.conversation.messages(), self.preferences.persist_enabled);
    }

    /// Append the user message and mark the session busy.
    ///
    /// Returns `None` (and changes nothing) for blank text or while a
    /// request is already in flight.
    pub fn begin_send(&mut self, text: &str, now: i64) -> Option<CompletionRequest> {
        if !self.can_send(text) {
            return None;
        }
        let user_message = ChatMessage::user(text.trim(), now);
        let request = CompletionRequest::build(
            self.conversation.messages(),
            &self.preferences.system_prompt,
            &user_message,
            &self.model,
            self.max_tokens,
        );
        self.conversation.append(user_message, now);
        self.busy = true;
        self.sync();
        Some(request)
    }

    /// Append the reply (or error banner) and release the busy flag.
    pub fn finish_send(&mut self, reply: ChatMessage, now: i64) {
        self.conversation.append(reply, now);
        self.busy = false;
        self.sync();
    }

    /// Full round trip. Returns the appended reply, or `None` if nothing was sent.
    pub async fn send<T: Transport>(
        &mut self,
        client: &CompletionClient<T>,
        text: &str,
        now: i64,
    ) -> Option<ChatMessage> {
        let request = self.begin_send(text, now)?;
        let reply = client.send(&request).await;
        self.finish_send(reply, crate::conversation::now_millis().max(now));
        self.conversation.last().cloned()
    }

    pub fn clear(&mut self, now: i64) {
        self.conversation.reset(now);
        self.sync();
    }

    pub fn set_persist_enabled(&mut self, enabled: bool) {
        self.preferences.persist_enabled = enabled;
        self.store
            .save_preference(&Preference::PersistEnabled(enabled));
        if enabled {
            self.sync();
        }
    }

    pub fn toggle_persist(&mut self) -> bool {
        let next = !self.preferences.persist_enabled;
        self.set_persist_enabled(next);
        next
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.preferences.theme = theme;
        self.store.save_preference(&Preference::Theme(theme));
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        let next = self.preferences.theme.toggled();
        self.set_theme(next);
        next
    }

    pub fn set_system_prompt(&mut self, text: impl Into<String>) {
        self.preferences.system_prompt = text.into();
        self.store.save_preference(&Preference::SystemPrompt(
            self.preferences.system_prompt.clone(),
        ));
    }
}
