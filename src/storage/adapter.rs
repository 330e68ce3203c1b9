//! Best-effort bridge between the in-memory conversation and a store.
//!
//! Nothing here returns an error: load failures read as "no history" and save
//! failures are reported through [`SaveStatus`] after being logged. Stored
//! entries that cannot be decoded are reported through [`LoadedHistory`] so
//! callers can avoid saving over them.

use crate::core::{Conversation, Message};
use crate::storage::traits::ConversationStore;

/// Outcome of a persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// The store accepted the transcript.
    Saved,
    /// Nothing to save.
    Skipped,
    /// The store rejected or never received the transcript.
    Failed(String),
    /// Not attempted, because the stored row holds entries this session could
    /// not read and a save would drop them.
    Withheld,
}

/// What a load found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedHistory {
    /// No row, no messages, or the store could not be read.
    Empty,
    /// Every stored message decoded.
    Complete(Conversation),
    /// The row exists but some entries could not be decoded.
    Partial {
        /// The entries that did decode, in stored order.
        conversation: Conversation,
        /// How many entries were skipped.
        unreadable: usize,
    },
}

impl SaveStatus {
    /// Whether the transcript reached the store.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Loads and saves a user's conversation through a [`ConversationStore`].
#[derive(Clone, Copy)]
pub struct ConversationStoreAdapter<'a> {
    store: &'a dyn ConversationStore,
}

impl<'a> ConversationStoreAdapter<'a> {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: &'a dyn ConversationStore) -> Self {
        Self { store }
    }

    /// Load the user's most recent conversation.
    ///
    /// Returns `None` when there is no stored row, no readable messages, or
    /// the store could not be read. Unreadable entries are left out.
    #[must_use]
    pub fn load_recent(&self, user_id: &str) -> Option<Conversation> {
        match self.load_history(user_id) {
            LoadedHistory::Complete(conversation)
            | LoadedHistory::Partial { conversation, .. }
                if !conversation.is_empty() =>
            {
                Some(conversation)
            }
            _ => None,
        }
    }

    /// Load the user's most recent conversation, reporting unreadable entries.
    #[must_use]
    pub fn load_history(&self, user_id: &str) -> LoadedHistory {
        let rows = match self.store.get_recent_conversation(user_id) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "failed to load conversation");
                return LoadedHistory::Empty;
            }
        };

        let Some(row) = rows.into_iter().next() else {
            return LoadedHistory::Empty;
        };
        let decoded = row.decode_messages();

        if !decoded.is_complete() {
            tracing::warn!(
                user_id,
                row_id = %row.id,
                unreadable = decoded.unreadable,
                readable = decoded.messages.len(),
                "some stored messages could not be read"
            );
            return LoadedHistory::Partial {
                conversation: Conversation::from_messages(decoded.messages),
                unreadable: decoded.unreadable,
            };
        }
        if decoded.messages.is_empty() {
            return LoadedHistory::Empty;
        }

        tracing::debug!(user_id, count = decoded.messages.len(), "loaded conversation");
        LoadedHistory::Complete(Conversation::from_messages(decoded.messages))
    }

    /// Persist the full message list, replacing whatever the store holds.
    pub fn save_all(
        &self,
        user_id: &str,
        messages: &[Message],
        last_message: &str,
    ) -> SaveStatus {
        if messages.is_empty() {
            return SaveStatus::Skipped;
        }

        match self
            .store
            .save_chat_conversation(user_id, messages, last_message)
        {
            Ok(()) => {
                tracing::debug!(user_id, count = messages.len(), "saved conversation");
                SaveStatus::Saved
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "failed to save conversation");
                SaveStatus::Failed(e.to_string())
            }
        }
    }
}
