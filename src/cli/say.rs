//! `mirrormind say` command implementation.

use crate::cli::open_store;
use crate::config::load_config;
use crate::core::ChatSession;
use crate::error::{Error, Result};
use crate::storage::{ConversationStoreAdapter, SaveStatus};

/// Run the say command.
///
/// Resumes the user's conversation, sends one message, and prints the reply.
/// Blank text does nothing.
///
/// # Errors
///
/// Returns an error if configuration is invalid. Storage failures are logged,
/// never returned.
pub fn run(text: &str, user: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let user_id = config.user_id(user)?;
    let store = open_store(&config)?;

    let mut session = ChatSession::new(
        user_id,
        ConversationStoreAdapter::new(store.as_ref()),
        config.chat,
        rand::thread_rng(),
    );
    session.hydrate()?;

    match session.send(text) {
        Ok(exchange) => {
            println!("{}", exchange.reply.content);
            if exchange.save == SaveStatus::Withheld {
                eprintln!(
                    "mirrormind: warning: stored conversation has {} unreadable message(s); \
                     not saved",
                    session.unreadable()
                );
            }
            Ok(())
        }
        Err(Error::EmptyInput) => Ok(()),
        Err(e) => Err(e),
    }
}
