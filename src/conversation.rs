use crate::types::{ChatMessage, Role};
use time::{
    Date, Duration, OffsetDateTime, UtcOffset, format_description::FormatItem,
    macros::format_description,
};

pub const GREETING: &str = "Hello! Let's start chatting 👋";

const DATE_LABEL_FORMAT: &[FormatItem<'static>] =
    format_description!("[day padding:zero]/[month padding:zero]/[year]");

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:24 padding:zero]:[minute padding:zero]");

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn to_datetime(millis: i64, offset: UtcOffset) -> Option<OffsetDateTime> {
    let nanos = i128::from(millis) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .map(|dt| dt.to_offset(offset))
}

fn calendar_date(millis: i64, offset: UtcOffset) -> Option<Date> {
    to_datetime(millis, offset).map(|dt| dt.date())
}

/// Ordered message history, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// The greeting alone, untimestamped. Sessions seed with [`Self::seeded_at`]
    /// so nothing reaches storage without a timestamp.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::Assistant, GREETING, None)],
        }
    }

    pub fn seeded_at(now: i64) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING, now)],
        }
    }

    /// Rebuild from stored messages. An empty batch yields the greeting stamped `now`.
    pub fn from_loaded(loaded: Vec<ChatMessage>, now: i64) -> Self {
        if loaded.is_empty() {
            return Self::seeded_at(now);
        }
        Self {
            messages: migrate(loaded, now),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Tail of at most `limit` messages.
    pub fn tail(&self, limit: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    pub fn append(&mut self, mut message: ChatMessage, now: i64) {
        if message.created_at.is_none() {
            message.created_at = Some(now);
        }
        self.messages.push(message);
    }

    pub fn reset(&mut self, now: i64) {
        *self = Self::seeded_at(now);
    }

    pub fn needs_date_separator(&self, index: usize, offset: UtcOffset) -> bool {
        needs_date_separator(&self.messages, index, offset)
    }
}

/// Stamp legacy records that predate timestamps with `now + index`.
pub fn migrate(loaded: Vec<ChatMessage>, now: i64) -> Vec<ChatMessage> {
    loaded
        .into_iter()
        .enumerate()
        .map(|(index, mut message)| {
            if message.created_at.is_none() {
                message.created_at = Some(now + index as i64);
            }
            message
        })
        .collect()
}

/// Whether a date separator goes before `messages[index]`.
pub fn needs_date_separator(messages: &[ChatMessage], index: usize, offset: UtcOffset) -> bool {
    let Some(current) = messages
        .get(index)
        .and_then(|msg| msg.created_at)
        .and_then(|ts| calendar_date(ts, offset))
    else {
        return false;
    };

    let previous = index
        .checked_sub(1)
        .and_then(|prev| messages.get(prev))
        .and_then(|msg| msg.created_at)
        .and_then(|ts| calendar_date(ts, offset));

    match previous {
        Some(previous) => previous != current,
        None => true,
    }
}

/// "Today", "Yesterday", or `DD/MM/YYYY` relative to `today`.
pub fn date_label(timestamp: i64, today: Date, offset: UtcOffset) -> Option<String> {
    let date = calendar_date(timestamp, offset)?;
    if date == today {
        return Some("Today".to_string());
    }
    if today.checked_sub(Duration::days(1)) == Some(date) {
        return Some("Yesterday".to_string());
    }
    date.format(DATE_LABEL_FORMAT).ok()
}

pub fn format_message_time(timestamp: i64, offset: UtcOffset) -> Option<String> {
    to_datetime(timestamp, offset)?.format(MESSAGE_TIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn millis(dt: OffsetDateTime) -> i64 {
        (dt.unix_timestamp_nanos() / 1_000_000) as i64
    }

    #[test]
    fn append_assigns_missing_timestamp() {
        let mut conversation = Conversation::new();
        conversation.append(ChatMessage::new(Role::User, "hi", None), 1_000);
        conversation.append(ChatMessage::user("there", 5), 2_000);
        assert_eq!(conversation.messages()[1].created_at, Some(1_000));
        assert_eq!(conversation.messages()[2].created_at, Some(5));
    }

    #[test]
    fn reset_replaces_with_stamped_greeting() {
        let mut conversation = Conversation::new();
        conversation.append(ChatMessage::user("hi", 1), 1);
        conversation.reset(99);
        assert_eq!(conversation.len(), 1);
        let greeting = &conversation.messages()[0];
        assert_eq!(greeting.role, Role::Assistant);
        assert_eq!(greeting.content, GREETING);
        assert_eq!(greeting.created_at, Some(99));
    }

    #[test]
    fn migrate_fills_gaps_in_order() {
        let loaded = vec![
            ChatMessage::new(Role::User, "a", None),
            ChatMessage::new(Role::Assistant, "b", Some(7)),
            ChatMessage::new(Role::User, "c", None),
            ChatMessage::new(Role::Assistant, "d", None),
        ];
        let migrated = migrate(loaded, 1_000);
        let stamps: Vec<_> = migrated.iter().map(|m| m.created_at).collect();
        assert_eq!(stamps, vec![Some(1_000), Some(7), Some(1_002), Some(1_003)]);
        let contents: Vec<_> = migrated.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn empty_load_keeps_greeting() {
        let conversation = Conversation::from_loaded(Vec::new(), 10);
        assert_eq!(conversation, Conversation::seeded_at(10));
    }

    #[test]
    fn tail_is_bounded() {
        let mut conversation = Conversation::new();
        for i in 0..10 {
            conversation.append(ChatMessage::user(format!("m{i}"), i), i);
        }
        assert_eq!(conversation.tail(3).len(), 3);
        assert_eq!(conversation.tail(3)[2].content, "m9");
        assert_eq!(conversation.tail(100).len(), 11);
    }

    #[test]
    fn separator_only_on_date_change() {
        let day_one_morning = millis(datetime!(2024-03-01 08:00 UTC));
        let day_one_evening = millis(datetime!(2024-03-01 21:30 UTC));
        let day_two = millis(datetime!(2024-03-02 00:05 UTC));
        let messages = vec![
            ChatMessage::user("a", day_one_morning),
            ChatMessage::assistant("b", day_one_evening),
            ChatMessage::user("c", day_two),
        ];
        assert!(needs_date_separator(&messages, 0, UtcOffset::UTC));
        assert!(!needs_date_separator(&messages, 1, UtcOffset::UTC));
        assert!(needs_date_separator(&messages, 2, UtcOffset::UTC));
    }

    #[test]
    fn separator_respects_display_offset() {
        let late = millis(datetime!(2024-03-01 23:30 UTC));
        let later = millis(datetime!(2024-03-02 00:30 UTC));
        let messages = vec![ChatMessage::user("a", late), ChatMessage::user("b", later)];
        let plus_two = UtcOffset::from_hms(2, 0, 0).unwrap();
        assert!(needs_date_separator(&messages, 1, UtcOffset::UTC));
        assert!(!needs_date_separator(&messages, 1, plus_two));
    }

    #[test]
    fn untimestamped_messages_get_no_separator() {
        let messages = vec![
            ChatMessage::new(Role::Assistant, GREETING, None),
            ChatMessage::user("a", millis(datetime!(2024-03-01 08:00 UTC))),
        ];
        assert!(!needs_date_separator(&messages, 0, UtcOffset::UTC));
        assert!(needs_date_separator(&messages, 1, UtcOffset::UTC));
        assert!(!needs_date_separator(&messages, 5, UtcOffset::UTC));
    }

    #[test]
    fn date_labels() {
        let today = date!(2024 - 03 - 02);
        let at = |dt: OffsetDateTime| date_label(millis(dt), today, UtcOffset::UTC);
        assert_eq!(at(datetime!(2024-03-02 10:00 UTC)).as_deref(), Some("Today"));
        assert_eq!(at(datetime!(2024-03-01 10:00 UTC)).as_deref(), Some("Yesterday"));
        assert_eq!(at(datetime!(2024-02-07 10:00 UTC)).as_deref(), Some("07/02/2024"));
    }

    #[test]
    fn message_time_is_24h() {
        let ts = millis(datetime!(2024-03-02 17:05 UTC));
        assert_eq!(format_message_time(ts, UtcOffset::UTC).as_deref(), Some("17:05"));
    }
}
