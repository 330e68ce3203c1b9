//! Conversation and message types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person using the app.
    User,
    /// Produced by the companion.
    Assistant,
}

/// A single chat message, as it appears on the wire and in storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Millisecond-timestamp identifier, unique within a conversation.
    pub id: String,

    /// Author of the message.
    pub role: Role,

    /// Message text.
    pub content: String,

    /// ISO-8601 creation time, kept exactly as stored.
    pub timestamp: String,
}

impl Message {
    /// Create a message with an explicit id and timestamp.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Parse the timestamp, if it is RFC 3339.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Format `now` the way browsers write `Date.toISOString()`.
fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Ordered, append-only message list for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
    ids: MessageIds,
}

impl Conversation {
    /// Create an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a conversation from stored messages, keeping their order.
    #[must_use]
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let mut ids = MessageIds::default();
        for message in &messages {
            ids.observe(&message.id);
        }
        Self { messages, ids }
    }

    /// Append a new message authored by `role`, stamped now.
    ///
    /// Returns a copy of the appended message.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> Message {
        let now = Utc::now();
        let message = Message::new(self.ids.next(now), role, content, iso_timestamp(now));
        self.messages.push(message.clone());
        message
    }

    /// All messages in insertion order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the final message, used as the stored summary.
    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }
}

/// Issues strictly increasing millisecond ids.
///
/// Two messages created in the same millisecond get consecutive integers
/// instead of colliding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct MessageIds {
    last: Option<i64>,
}

impl MessageIds {
    fn next(&mut self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();
        let id = match self.last {
            Some(last) if last >= millis => last + 1,
            _ => millis,
        };
        self.last = Some(id);
        id.to_string()
    }

    /// Account for an id loaded from storage. Non-numeric ids are ignored.
    fn observe(&mut self, id: &str) {
        if let Ok(value) = id.parse::<i64>() {
            self.last = Some(self.last.map_or(value, |last| last.max(value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn message_wire_shape() {
        let message = Message::new(
            "1740821400000",
            Role::User,
            "hello",
            "2025-03-01T09:30:00.000Z",
        );
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["id"], "1740821400000");
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
        assert_eq!(json["timestamp"], "2025-03-01T09:30:00.000Z");
    }

    #[test]
    fn message_parses_javascript_iso_timestamp() {
        let json = r#"{"id":"1","role":"assistant","content":"hi","timestamp":"2025-03-01T09:30:00.123Z"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.timestamp, "2025-03-01T09:30:00.123Z");
        assert_eq!(message.created_at().unwrap().timestamp_subsec_millis(), 123);
    }

    #[test]
    fn timestamp_text_survives_reencoding() {
        for stamp in [
            "2024-05-29T16:26:40.000Z",
            "2024-05-29T16:26:40+00:00",
            "2024-05-29 16:26:40",
        ] {
            let json =
                format!(r#"{{"id":"1","role":"user","content":"hi","timestamp":"{stamp}"}}"#);
            let message: Message = serde_json::from_str(&json).unwrap();
            let encoded = serde_json::to_value(&message).unwrap();
            assert_eq!(encoded["timestamp"], stamp);
        }
    }

    #[test]
    fn offset_timestamps_parse_to_utc() {
        let message = Message::new("1", Role::User, "hi", "2024-05-29T18:26:40+02:00");
        let expected = Utc.with_ymd_and_hms(2024, 5, 29, 16, 26, 40).unwrap();
        assert_eq!(message.created_at(), Some(expected));

        let message = Message::new("1", Role::User, "hi", "yesterday");
        assert_eq!(message.created_at(), None);
    }

    #[test]
    fn pushed_messages_use_browser_timestamp_format() {
        let mut conversation = Conversation::new();
        let message = conversation.push(Role::Assistant, "hi there");

        // 2024-05-29T16:26:40.000Z
        assert_eq!(message.timestamp.len(), 24);
        assert!(message.timestamp.ends_with('Z'));
        assert_eq!(&message.timestamp[19..20], ".");
        assert!(message.created_at().is_some());
    }

    #[test]
    fn push_appends_in_order() {
        let mut conversation = Conversation::new();
        conversation.push(Role::Assistant, "hi there");
        conversation.push(Role::User, "hello");

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0].role, Role::Assistant);
        assert_eq!(conversation.messages()[1].content, "hello");
        assert_eq!(conversation.last_message(), Some("hello"));
    }

    #[test]
    fn ids_strictly_increase_within_same_millisecond() {
        let mut conversation = Conversation::new();
        for i in 0..50 {
            conversation.push(Role::User, format!("message {i}"));
        }

        let ids: Vec<i64> = conversation
            .messages()
            .iter()
            .map(|m| m.id.parse().unwrap())
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn ids_continue_after_loaded_history() {
        let far_future = Utc::now().timestamp_millis() + 1_000_000;
        let mut conversation = Conversation::from_messages(vec![Message::new(
            far_future.to_string(),
            Role::Assistant,
            "from storage",
            "2024-05-29T16:26:40.000Z",
        )]);

        let id = conversation.push(Role::User, "new").id;
        assert_eq!(id, (far_future + 1).to_string());
    }

    #[test]
    fn empty_conversation_has_no_last_message() {
        let conversation = Conversation::new();
        assert!(conversation.is_empty());
        assert_eq!(conversation.last_message(), None);
    }
}
