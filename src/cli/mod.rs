//! CLI command implementations.

pub mod chat;
pub mod history;
pub mod reply;
pub mod say;

use crate::config::{BackendKind, Config};
use crate::core::{Message, Role};
use crate::error::Result;
use crate::storage::{ConversationStore, FileBackend, RemoteBackend};
use chrono::Local;

/// Open the store selected by configuration.
///
/// # Errors
///
/// Returns an error if the file store cannot create its directory or the
/// remote store is missing its URL or key.
pub fn open_store(config: &Config) -> Result<Box<dyn ConversationStore>> {
    match config.backend.kind {
        BackendKind::File => Ok(Box::new(FileBackend::new(config.storage.path.clone())?)),
        BackendKind::Remote => Ok(Box::new(RemoteBackend::from_config(&config.backend)?)),
    }
}

/// Render a message as one transcript line.
///
/// Timestamps that are not RFC 3339 are shown as stored.
#[must_use]
pub fn format_message(message: &Message) -> String {
    let time = message.created_at().map_or_else(
        || message.timestamp.clone(),
        |ts| ts.with_timezone(&Local).format("%H:%M").to_string(),
    );
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "companion",
    };
    format!("[{time}] {speaker}: {}", message.content)
}
