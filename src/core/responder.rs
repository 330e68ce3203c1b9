//! Scripted companion replies.
//!
//! Replies come from a fixed keyword table checked in priority order. When no
//! keyword matches, short messages get a "tell me more" prompt and longer ones
//! draw from one of two fallback pools, alternating on conversation length.
//! The only non-determinism is the draw inside a pool, which goes through the
//! caller's random source.

use rand::Rng;
use rand::seq::SliceRandom;

/// Messages with fewer tokens than this get the short-message prompt.
pub const SHORT_MESSAGE_TOKENS: usize = 5;

/// Reply for short messages that match no keyword.
pub const SHORT_MESSAGE_REPLY: &str =
    "I'd love to hear more about that. Could you tell me a bit more?";

/// Emotional topics recognised by keyword, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Anxiety,
    Sadness,
    Positive,
    Fatigue,
    Anger,
    Gratitude,
    Help,
}

struct KeywordRule {
    topic: Topic,
    keywords: &'static [&'static str],
    reply: &'static str,
}

// First match wins. A message mentioning both "happy" and "tired" is Positive.
const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        topic: Topic::Anxiety,
        keywords: &["anxious", "anxiety", "worried"],
        reply: "It sounds like you're feeling some anxiety. Remember that's a normal response, though it can be uncomfortable. What specifically is causing these feelings?",
    },
    KeywordRule {
        topic: Topic::Sadness,
        keywords: &["sad", "depressed", "down"],
        reply: "I hear that you're feeling down. It takes courage to acknowledge these feelings. Would you like to talk more about what might be contributing to this?",
    },
    KeywordRule {
        topic: Topic::Positive,
        keywords: &["happy", "good", "great"],
        reply: "I'm glad to hear you're feeling positive! What's been contributing to these good feelings lately?",
    },
    KeywordRule {
        topic: Topic::Fatigue,
        keywords: &["tired", "exhausted", "sleep"],
        reply: "Feeling tired can really affect our mental state. How has your sleep been lately? Are you able to get enough rest?",
    },
    KeywordRule {
        topic: Topic::Anger,
        keywords: &["angry", "frustrated", "mad"],
        reply: "I can hear your frustration. Sometimes anger points us toward what matters to us. What boundaries or values feel like they might have been crossed?",
    },
    KeywordRule {
        topic: Topic::Gratitude,
        keywords: &["thank"],
        reply: "You're very welcome. I'm here anytime you want to reflect or process your thoughts.",
    },
    KeywordRule {
        topic: Topic::Help,
        keywords: &["help", "advice", "suggestion"],
        reply: "I'd be happy to help you think through this. What specific aspect would you like to explore further?",
    },
];

/// Questions used on even conversation lengths.
pub const FOLLOW_UP_RESPONSES: [&str; 10] = [
    "That's really interesting. Can you tell me more about that?",
    "I understand. How did that make you feel?",
    "Thank you for sharing. What do you think triggered that?",
    "I see. Have you noticed this happening before?",
    "That sounds challenging. How have you been coping with it?",
    "I appreciate you opening up. What would help you feel better right now?",
    "I'm here for you. Is there something specific you'd like to focus on today?",
    "That's a good observation. What patterns have you noticed around this?",
    "It sounds like you've been thinking about this a lot. What insights have you gained?",
    "I'm curious - how might you approach this differently next time?",
];

/// Statements used on odd conversation lengths.
pub const SUPPORTIVE_RESPONSES: [&str; 10] = [
    "It's completely normal to feel that way. Many people have similar experiences.",
    "You're doing great by acknowledging these feelings. That's an important first step.",
    "Remember that emotions are temporary - they come and go like waves.",
    "It's okay to not have all the answers right now. Being patient with yourself is important.",
    "You've shown a lot of self-awareness in our conversation today.",
    "I notice how thoughtful you are about your experiences. That's a valuable quality.",
    "Small steps forward are still progress. Be proud of each one.",
    "Consider this a journey of self-discovery. Each insight is valuable.",
    "Your willingness to reflect shows real emotional intelligence.",
    "Remember to be as kind to yourself as you would be to a good friend.",
];

/// Opening lines for a session with no stored history.
pub const GREETINGS: [&str; 10] = [
    "Hello there! I'm your MirrorMind companion. How are you feeling today?",
    "I notice you seem thoughtful today. Would you like to talk about it?",
    "It sounds like you've had quite a day. Would you like to reflect on what went well?",
    "I'm here to listen and help you process your thoughts. What's on your mind?",
    "Sometimes putting our feelings into words can help us understand them better. What are you experiencing right now?",
    "Every emotion has something to teach us. What do you think yours is telling you today?",
    "I'm curious to hear more about that. Could you tell me what led to this feeling?",
    "Thank you for sharing that with me. How long have you been feeling this way?",
    "That's really insightful! Have you noticed any patterns in when these thoughts come up?",
    "It takes courage to look inward like this. What would be helpful for you right now?",
];

/// Which rule produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// A keyword group matched.
    Keyword(Topic),
    /// Too few tokens to say anything specific.
    ShortMessage,
    /// Drawn from [`FOLLOW_UP_RESPONSES`].
    FollowUp,
    /// Drawn from [`SUPPORTIVE_RESPONSES`].
    Supportive,
}

/// A generated reply and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: &'static str,
}

/// Find the highest-priority topic whose keywords appear in `text`.
///
/// Matching is a case-insensitive substring search, so "download" counts as
/// "down".
#[must_use]
pub fn classify(text: &str) -> Option<Topic> {
    matching_rule(&text.to_lowercase()).map(|rule| rule.topic)
}

fn matching_rule(lowered: &str) -> Option<&'static KeywordRule> {
    KEYWORD_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
}

/// Pick a reply for `user_text`.
///
/// `conversation_length` is the number of messages before the reply is
/// appended, i.e. including the user message being answered.
pub fn select_reply<R: Rng + ?Sized>(
    conversation_length: usize,
    user_text: &str,
    rng: &mut R,
) -> Reply {
    let lowered = user_text.to_lowercase();

    if let Some(rule) = matching_rule(&lowered) {
        return Reply {
            kind: ReplyKind::Keyword(rule.topic),
            text: rule.reply,
        };
    }

    if user_text.split_whitespace().count() < SHORT_MESSAGE_TOKENS {
        return Reply {
            kind: ReplyKind::ShortMessage,
            text: SHORT_MESSAGE_REPLY,
        };
    }

    if conversation_length % 2 == 0 {
        Reply {
            kind: ReplyKind::FollowUp,
            text: pick(&FOLLOW_UP_RESPONSES, rng),
        }
    } else {
        Reply {
            kind: ReplyKind::Supportive,
            text: pick(&SUPPORTIVE_RESPONSES, rng),
        }
    }
}

/// Reply text for `user_text`. See [`select_reply`].
pub fn generate_reply<R: Rng + ?Sized>(
    conversation_length: usize,
    user_text: &str,
    rng: &mut R,
) -> &'static str {
    select_reply(conversation_length, user_text, rng).text
}

/// Pick an opening greeting.
pub fn pick_greeting<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(&GREETINGS, rng)
}

fn pick<R: Rng + ?Sized>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or(SHORT_MESSAGE_REPLY)
}
