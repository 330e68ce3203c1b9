//! Chat session: hydrate once, then run the send/reply/persist loop.

use crate::config::ChatConfig;
use crate::core::message::{Conversation, Message, Role};
use crate::core::responder::{ReplyKind, pick_greeting, select_reply};
use crate::error::{Error, Result};
use crate::storage::{ConversationStoreAdapter, LoadedHistory, SaveStatus};
use rand::Rng;
use std::thread;
use std::time::Duration;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, history not loaded yet.
    Uninitialized,
    /// Loading history from the store.
    Hydrating,
    /// Ready for the next user message.
    AwaitingInput,
    /// User message being appended.
    Sending,
    /// Companion is "thinking".
    AwaitingReply,
    /// Transcript being written to the store.
    Persisting,
}

/// How the session was seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// Stored history was loaded.
    WithHistory {
        /// Number of messages restored.
        messages: usize,
    },
    /// No history; a greeting was synthesized and not yet persisted.
    Greeted,
    /// Stored history was only partly readable. Saves are withheld until
    /// [`ChatSession::discard_unreadable`] is called.
    Partial {
        /// Number of readable messages restored.
        messages: usize,
        /// Number of stored entries that could not be read.
        unreadable: usize,
    },
}

/// One completed user/companion exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// The user's message as appended.
    pub user: Message,
    /// The companion's reply.
    pub reply: Message,
    /// Rule that produced the reply.
    pub reply_kind: ReplyKind,
    /// Result of persisting the transcript afterwards.
    pub save: SaveStatus,
}

/// A single user's chat session.
pub struct ChatSession<'a, R: Rng> {
    user_id: String,
    adapter: ConversationStoreAdapter<'a>,
    pacing: ChatConfig,
    rng: R,
    conversation: Conversation,
    phase: SessionPhase,
    unreadable: usize,
}

impl<'a, R: Rng> ChatSession<'a, R> {
    /// Create a session for `user_id`. Call [`hydrate`](Self::hydrate) next.
    pub fn new(
        user_id: impl Into<String>,
        adapter: ConversationStoreAdapter<'a>,
        pacing: ChatConfig,
        rng: R,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            adapter,
            pacing,
            rng,
            conversation: Conversation::new(),
            phase: SessionPhase::Uninitialized,
            unreadable: 0,
        }
    }

    /// Load stored history, or greet when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the session was already hydrated.
    pub fn hydrate(&mut self) -> Result<Hydration> {
        if self.phase != SessionPhase::Uninitialized {
            return Err(Error::InvalidState(format!(
                "session already hydrated (phase {:?})",
                self.phase
            )));
        }
        self.enter(SessionPhase::Hydrating);

        let hydration = match self.adapter.load_history(&self.user_id) {
            LoadedHistory::Complete(conversation) => {
                self.conversation = conversation;
                Hydration::WithHistory {
                    messages: self.conversation.len(),
                }
            }
            LoadedHistory::Partial {
                conversation,
                unreadable,
            } => {
                let messages = conversation.len();
                self.conversation = conversation;
                self.unreadable = unreadable;
                if messages == 0 {
                    self.greet();
                }
                Hydration::Partial {
                    messages,
                    unreadable,
                }
            }
            LoadedHistory::Empty => {
                self.greet();
                Hydration::Greeted
            }
        };

        self.enter(SessionPhase::AwaitingInput);
        Ok(hydration)
    }

    /// Send a user message and wait for the companion's reply.
    ///
    /// The transcript is persisted after the reply; a failed save is reported
    /// in [`Exchange::save`] and does not fail the exchange. While the stored
    /// row holds unreadable entries the save is [`SaveStatus::Withheld`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for blank text (nothing changes), or
    /// [`Error::InvalidState`] if the session is not awaiting input.
    pub fn send(&mut self, text: &str) -> Result<Exchange> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.phase != SessionPhase::AwaitingInput {
            return Err(Error::InvalidState(format!(
                "cannot send while {:?}",
                self.phase
            )));
        }

        self.enter(SessionPhase::Sending);
        let user = self.conversation.push(Role::User, text);

        self.enter(SessionPhase::AwaitingReply);
        pause(self.pacing.reply_delay());
        let reply = select_reply(self.conversation.len(), text, &mut self.rng);
        let reply_message = self.conversation.push(Role::Assistant, reply.text);

        self.enter(SessionPhase::Persisting);
        let save = if self.unreadable > 0 {
            tracing::warn!(
                user_id = %self.user_id,
                unreadable = self.unreadable,
                "not saving over unreadable stored messages"
            );
            SaveStatus::Withheld
        } else {
            pause(self.pacing.save_delay());
            self.adapter.save_all(
                &self.user_id,
                self.conversation.messages(),
                &reply_message.content,
            )
        };

        self.enter(SessionPhase::AwaitingInput);
        Ok(Exchange {
            user,
            reply: reply_message,
            reply_kind: reply.kind,
            save,
        })
    }

    /// Messages shown so far, greeting included.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Stored entries that could not be read and would be lost on save.
    #[must_use]
    pub fn unreadable(&self) -> usize {
        self.unreadable
    }

    /// Allow later saves to replace the stored row, dropping its unreadable
    /// entries. Returns how many entries will be lost.
    pub fn discard_unreadable(&mut self) -> usize {
        let dropped = std::mem::take(&mut self.unreadable);
        if dropped > 0 {
            tracing::info!(
                user_id = %self.user_id,
                dropped,
                "unreadable stored messages discarded"
            );
        }
        dropped
    }

    /// Content of the newest message.
    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.conversation.last_message()
    }

    fn greet(&mut self) {
        let greeting = pick_greeting(&mut self.rng);
        self.conversation.push(Role::Assistant, greeting);
    }

    fn enter(&mut self, phase: SessionPhase) {
        tracing::trace!(
            user_id = %self.user_id,
            from = ?self.phase,
            to = ?phase,
            "session phase"
        );
        self.phase = phase;
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
