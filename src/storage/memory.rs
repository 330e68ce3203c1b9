//! In-memory storage backend for testing.

use crate::core::Message;
use crate::error::{Error, Result};
use crate::storage::traits::{ConversationStore, StoredConversation};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory storage backend for testing.
///
/// Can be switched into a failing mode to exercise the degraded paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    conversations: RwLock<HashMap<String, StoredConversation>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryBackend {
    /// Create a new in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful save calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Seed a raw row, bypassing message encoding.
    pub fn insert_row(&self, user_id: &str, row: StoredConversation) {
        let mut conversations = self.conversations.write().unwrap();
        conversations.insert(user_id.to_string(), row);
    }

    /// Current row for a user.
    #[must_use]
    pub fn row(&self, user_id: &str) -> Option<StoredConversation> {
        let conversations = self.conversations.read().unwrap();
        conversations.get(user_id).cloned()
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Transport("memory backend offline".to_string()));
        }
        Ok(())
    }
}

impl ConversationStore for MemoryBackend {
    fn get_recent_conversation(&self, user_id: &str) -> Result<Vec<StoredConversation>> {
        self.check_available()?;
        let conversations = self.conversations.read().unwrap();
        Ok(conversations.get(user_id).cloned().into_iter().collect())
    }

    fn save_chat_conversation(
        &self,
        user_id: &str,
        messages: &[Message],
        last_message: &str,
    ) -> Result<()> {
        self.check_available()?;
        let mut conversations = self.conversations.write().unwrap();
        match conversations.get_mut(user_id) {
            Some(row) => row.overwrite(messages, last_message)?,
            None => {
                let row = StoredConversation::new(messages, last_message)?;
                conversations.insert(user_id.to_string(), row);
            }
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
