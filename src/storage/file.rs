//! File-based storage backend.

use crate::core::Message;
use crate::error::{Error, Result};
use crate::storage::traits::{ConversationStore, StoredConversation};
use std::fs;
use std::path::{Path, PathBuf};

/// Local backend keeping one JSON row per user, written atomically.
#[derive(Debug)]
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    /// Create a new file backend.
    ///
    /// Creates the conversations directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversations directory cannot be created.
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(base_dir.join("conversations"))?;
        Ok(Self { base_dir })
    }

    /// Get the path to a user's conversation file.
    fn conversation_path(&self, user_id: &str) -> Result<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self
            .base_dir
            .join("conversations")
            .join(format!("{user_id}.json")))
    }

    fn read_row(path: &Path) -> Result<Option<StoredConversation>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let row: StoredConversation = serde_json::from_str(&contents)?;
        Ok(Some(row))
    }
}

impl ConversationStore for FileBackend {
    fn get_recent_conversation(&self, user_id: &str) -> Result<Vec<StoredConversation>> {
        let path = self.conversation_path(user_id)?;
        Ok(Self::read_row(&path)?.into_iter().collect())
    }

    fn save_chat_conversation(
        &self,
        user_id: &str,
        messages: &[Message],
        last_message: &str,
    ) -> Result<()> {
        let path = self.conversation_path(user_id)?;

        // An unreadable row is replaced rather than blocking every later save
        let row = match Self::read_row(&path) {
            Ok(Some(mut row)) => {
                row.overwrite(messages, last_message)?;
                row
            }
            Ok(None) | Err(Error::Serde(_)) => StoredConversation::new(messages, last_message)?,
            Err(e) => return Err(e),
        };

        let temp = path.with_extension("tmp");
        let contents = serde_json::to_string_pretty(&row)?;
        fs::write(&temp, &contents)?;

        // Atomic rename - a crash mid-write never leaves a torn row
        fs::rename(&temp, &path)?;

        Ok(())
    }
}

/// Reject user ids that could escape the conversations directory.
fn validate_user_id(user_id: &str) -> Result<()> {
    let valid = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidUserId(user_id.to_string()))
    }
}

/// Get the default mirrormind home directory.
///
/// Uses `MIRRORMIND_HOME` environment variable if set, otherwise `~/.mirrormind`.
#[must_use]
pub fn get_mirrormind_home() -> PathBuf {
    if let Ok(home) = std::env::var("MIRRORMIND_HOME") {
        PathBuf::from(home)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".mirrormind")
    } else {
        PathBuf::from(".mirrormind")
    }
}
