//! `mirrormind chat` command implementation.

use crate::cli::{format_message, open_store};
use crate::config::{ChatConfig, load_config};
use crate::core::{ChatSession, Hydration};
use crate::error::{Error, Result};
use crate::storage::{ConversationStore, ConversationStoreAdapter};
use rand::Rng;
use std::io::{self, BufRead, Write};

/// Typing this ends the session.
const QUIT_COMMAND: &str = "/quit";

/// Typing this lets saves replace a stored conversation with unreadable entries.
const OVERWRITE_COMMAND: &str = "/overwrite";

/// Run the interactive chat command.
///
/// Reads one message per line from stdin until EOF or `/quit`.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the terminal cannot be
/// read or written. Storage failures are logged, never returned.
pub fn run(user: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let user_id = config.user_id(user)?;
    let store = open_store(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    converse(
        store.as_ref(),
        &user_id,
        config.chat,
        rand::thread_rng(),
        stdin.lock(),
        stdout.lock(),
    )
}

/// Drive a session from `input`, writing the transcript to `out`.
///
/// # Errors
///
/// Returns an error if reading `input` or writing `out` fails.
pub fn converse<R: Rng, I: BufRead, W: Write>(
    store: &dyn ConversationStore,
    user_id: &str,
    pacing: ChatConfig,
    rng: R,
    input: I,
    mut out: W,
) -> Result<()> {
    let mut session = ChatSession::new(
        user_id,
        ConversationStoreAdapter::new(store),
        pacing,
        rng,
    );

    match session.hydrate()? {
        Hydration::WithHistory { messages } => {
            writeln!(out, "(restored {messages} earlier message(s))")?;
        }
        Hydration::Partial {
            messages,
            unreadable,
        } => {
            if messages > 0 {
                writeln!(out, "(restored {messages} earlier message(s))")?;
            }
            writeln!(
                out,
                "({unreadable} stored message(s) could not be read. This chat will not be \
                 saved unless you type {OVERWRITE_COMMAND}, which drops them.)"
            )?;
        }
        Hydration::Greeted => {}
    }
    for message in session.messages() {
        writeln!(out, "{}", format_message(message))?;
    }
    prompt(&mut out)?;

    for line in input.lines() {
        let line = line?;
        match line.trim() {
            QUIT_COMMAND => break,
            OVERWRITE_COMMAND => {
                let dropped = session.discard_unreadable();
                writeln!(
                    out,
                    "(saving enabled, {dropped} unreadable message(s) will be dropped)"
                )?;
                prompt(&mut out)?;
                continue;
            }
            _ => {}
        }

        match session.send(&line) {
            Ok(exchange) => writeln!(out, "{}", format_message(&exchange.reply))?,
            Err(Error::EmptyInput) => {}
            Err(e) => return Err(e),
        }
        prompt(&mut out)?;
    }

    Ok(())
}

fn prompt<W: Write>(out: &mut W) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}
