//! `mirrormind history` command implementation.

use crate::cli::{format_message, open_store};
use crate::config::load_config;
use crate::core::Conversation;
use crate::error::Result;
use crate::storage::{ConversationStore, ConversationStoreAdapter, LoadedHistory};

/// Run the history command.
///
/// Prints the user's stored conversation, one line per message, or the raw
/// message array with `--json`.
///
/// # Errors
///
/// Returns an error if configuration is invalid or JSON encoding fails.
pub fn run(user: Option<&str>, json: bool) -> Result<()> {
    let config = load_config()?;
    let user_id = config.user_id(user)?;
    let store = open_store(&config)?;

    print!("{}", render(store.as_ref(), &user_id, json)?);
    Ok(())
}

/// Render the stored conversation for display.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn render(store: &dyn ConversationStore, user_id: &str, json: bool) -> Result<String> {
    let adapter = ConversationStoreAdapter::new(store);
    let (conversation, unreadable) = match adapter.load_history(user_id) {
        LoadedHistory::Empty => (Conversation::new(), 0),
        LoadedHistory::Complete(conversation) => (conversation, 0),
        LoadedHistory::Partial {
            conversation,
            unreadable,
        } => (conversation, unreadable),
    };

    if json {
        return Ok(format!(
            "{}\n",
            serde_json::to_string_pretty(conversation.messages())?
        ));
    }

    if conversation.is_empty() && unreadable == 0 {
        return Ok(format!("No conversation found for {user_id}.\n"));
    }

    let mut lines: Vec<String> = conversation.messages().iter().map(format_message).collect();
    lines.push(format!("{} message(s)", conversation.len()));
    if unreadable > 0 {
        lines.push(format!("{unreadable} stored message(s) could not be read"));
    }
    Ok(lines.join("\n") + "\n")
}
