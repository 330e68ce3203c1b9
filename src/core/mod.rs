//! Chat types, reply rules, and the session loop.

pub mod message;
pub mod responder;
pub mod session;

pub use message::{Conversation, Message, Role};
pub use responder::{Reply, ReplyKind, Topic, classify, generate_reply, select_reply};
pub use session::{ChatSession, Exchange, Hydration, SessionPhase};
