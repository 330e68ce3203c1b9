//! `mirrormind reply` command implementation.

use crate::core::{Reply, ReplyKind, select_reply};
use crate::error::Result;

/// Run the reply command.
///
/// Shows which rule answers `text` at the given conversation length, without
/// touching any store.
///
/// # Errors
///
/// Never fails; returns `Result` for symmetry with the other commands.
pub fn run(text: &str, length: usize) -> Result<()> {
    let reply = select_reply(length, text, &mut rand::thread_rng());
    println!("{}", describe(&reply));
    Ok(())
}

/// Format a reply with the rule that produced it.
#[must_use]
pub fn describe(reply: &Reply) -> String {
    let rule = match reply.kind {
        ReplyKind::Keyword(topic) => format!("keyword ({topic:?})").to_lowercase(),
        ReplyKind::ShortMessage => "short message".to_string(),
        ReplyKind::FollowUp => "follow-up pool".to_string(),
        ReplyKind::Supportive => "supportive pool".to_string(),
    };
    format!("[{rule}] {}", reply.text)
}
