//! Storage trait definitions.

use crate::core::Message;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend holding at most one active conversation per user.
///
/// Mirrors the two remote procedures the hosted backend exposes.
pub trait ConversationStore: Send + Sync {
    /// Fetch the user's most recent conversation row, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or answers with
    /// something that is not a list of rows.
    fn get_recent_conversation(&self, user_id: &str) -> Result<Vec<StoredConversation>>;

    /// Upsert the user's conversation with the full message list.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save_chat_conversation(
        &self,
        user_id: &str,
        messages: &[Message],
        last_message: &str,
    ) -> Result<()>;
}

/// Conversation row as returned by `get_recent_conversation`.
///
/// `messages` stays raw JSON until the adapter decodes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredConversation {
    /// Row identifier.
    pub id: String,

    /// JSON array of messages.
    pub messages: Value,

    /// Content of the final message.
    #[serde(default)]
    pub last_message: Option<String>,

    /// When the row was first written.
    pub created_at: DateTime<Utc>,

    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

impl StoredConversation {
    /// Build a fresh row for `messages`.
    ///
    /// # Errors
    ///
    /// Returns an error if the messages cannot be encoded as JSON.
    pub fn new(messages: &[Message], last_message: &str) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            messages: serde_json::to_value(messages)?,
            last_message: Some(last_message.to_string()),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace this row's contents, keeping its id and creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the messages cannot be encoded as JSON.
    pub fn overwrite(&mut self, messages: &[Message], last_message: &str) -> Result<()> {
        self.messages = serde_json::to_value(messages)?;
        self.last_message = Some(last_message.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Decode the stored message array one entry at a time.
    ///
    /// An entry that lacks a field or has the wrong type is counted as
    /// unreadable without affecting its neighbours. A `messages` value that is
    /// not an array counts as a single unreadable entry; `null` is empty.
    #[must_use]
    pub fn decode_messages(&self) -> DecodedMessages {
        let entries = match &self.messages {
            Value::Array(entries) => entries,
            Value::Null => return DecodedMessages::default(),
            _ => {
                return DecodedMessages {
                    messages: Vec::new(),
                    unreadable: 1,
                };
            }
        };

        let mut decoded = DecodedMessages::default();
        for entry in entries {
            match Message::deserialize(entry) {
                Ok(message) => decoded.messages.push(message),
                Err(_) => decoded.unreadable += 1,
            }
        }
        decoded
    }
}

/// Result of decoding a stored message array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMessages {
    /// Entries that decoded, in stored order.
    pub messages: Vec<Message>,

    /// Entries that did not.
    pub unreadable: usize,
}

impl DecodedMessages {
    /// Whether every stored entry decoded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unreadable == 0
    }
}
