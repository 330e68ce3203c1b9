//! Integration tests for the full chat flow.

use mirrormind::config::ChatConfig;
use mirrormind::core::responder::{FOLLOW_UP_RESPONSES, GREETINGS};
use mirrormind::core::{ChatSession, Hydration, ReplyKind, Role, Topic, generate_reply};
use mirrormind::storage::{
    ConversationStore, ConversationStoreAdapter, FileBackend, MemoryBackend, SaveStatus,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

const ANXIETY_REPLY: &str = "It sounds like you're feeling some anxiety. Remember that's a normal response, though it can be uncomfortable. What specifically is causing these feelings?";
const GRATITUDE_REPLY: &str =
    "You're very welcome. I'm here anytime you want to reflect or process your thoughts.";

fn instant() -> ChatConfig {
    ChatConfig {
        reply_delay_ms: 0,
        save_delay_ms: 0,
    }
}

/// Write a row the way the hosted backend stores it, as a file-store row.
fn write_hosted_row(temp_dir: &TempDir, user_id: &str, messages: &Value) {
    let row = json!({
        "id": "9b2f6a0e-0000-4000-8000-000000000001",
        "messages": messages,
        "last_message": "thanks",
        "created_at": "2024-05-29T16:26:46.120914+00:00",
        "updated_at": "2024-05-29T16:26:46.120914+00:00",
    });
    let path = temp_dir
        .path()
        .join("conversations")
        .join(format!("{user_id}.json"));
    fs::write(path, serde_json::to_string_pretty(&row).unwrap()).unwrap();
}

fn new_session<'a>(
    store: &'a dyn ConversationStore,
    user_id: &str,
    seed: u64,
) -> ChatSession<'a, StdRng> {
    ChatSession::new(
        user_id,
        ConversationStoreAdapter::new(store),
        instant(),
        StdRng::seed_from_u64(seed),
    )
}

#[test]
fn anxious_first_message_on_empty_store() {
    let store = MemoryBackend::new();
    let mut session = new_session(&store, "user-1", 1);

    // Step 1: no stored conversation, so the session greets
    assert_eq!(session.hydrate().unwrap(), Hydration::Greeted);
    assert_eq!(session.messages().len(), 1);
    assert!(GREETINGS.contains(&session.messages()[0].content.as_str()));
    assert_eq!(store.save_count(), 0);

    // Step 2: user shares something anxious
    let exchange = session.send("I feel anxious about work").unwrap();
    assert_eq!(exchange.reply.content, ANXIETY_REPLY);
    assert_eq!(exchange.save, SaveStatus::Saved);

    // Step 3: greeting, user message, reply, in that order
    let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::Assistant, Role::User, Role::Assistant]);

    // Step 4: exactly one save carrying all three messages
    assert_eq!(store.save_count(), 1);
    let rows = store.get_recent_conversation("user-1").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].decode_messages().messages.len(), 3);
    assert_eq!(rows[0].last_message.as_deref(), Some(ANXIETY_REPLY));
}

#[test]
fn conversation_survives_file_store_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();

    let saved = {
        let mut session = new_session(&store, "user-1", 2);
        session.hydrate().unwrap();
        session.send("thanks for listening").unwrap();
        session
            .send("the weekend was long and I spent it cleaning the flat")
            .unwrap();
        session.messages().to_vec()
    };

    // Reopen the store as a later process would
    let store = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
    let mut session = new_session(&store, "user-1", 3);
    assert_eq!(
        session.hydrate().unwrap(),
        Hydration::WithHistory { messages: 5 }
    );
    assert_eq!(session.messages(), saved.as_slice());
}

#[test]
fn repeated_saves_keep_one_conversation() {
    let store = MemoryBackend::new();
    let adapter = ConversationStoreAdapter::new(&store);

    let mut session = new_session(&store, "user-1", 4);
    session.hydrate().unwrap();
    session.send("thanks").unwrap();
    let messages = session.messages().to_vec();
    let last = session.last_message().unwrap().to_string();

    let before = store.row("user-1").unwrap();
    assert!(adapter.save_all("user-1", &messages, &last).is_saved());
    assert!(adapter.save_all("user-1", &messages, &last).is_saved());
    let after = store.row("user-1").unwrap();

    assert_eq!(before.id, after.id);
    assert_eq!(before.messages, after.messages);
    assert_eq!(store.get_recent_conversation("user-1").unwrap().len(), 1);
}

#[test]
fn gratitude_reply_ignores_conversation_length() {
    let mut rng = StdRng::seed_from_u64(5);
    for length in 0..10 {
        assert_eq!(generate_reply(length, "thanks", &mut rng), GRATITUDE_REPLY);
    }
}

#[test]
fn users_do_not_see_each_others_history() {
    let store = MemoryBackend::new();

    let mut alice = new_session(&store, "alice", 6);
    alice.hydrate().unwrap();
    alice.send("I am worried about exams").unwrap();

    let mut bob = new_session(&store, "bob", 7);
    assert_eq!(bob.hydrate().unwrap(), Hydration::Greeted);
    assert_eq!(bob.messages().len(), 1);
}

#[test]
fn outage_during_chat_is_invisible_to_the_exchange() {
    let store = MemoryBackend::new();
    let mut session = new_session(&store, "user-1", 8);
    session.hydrate().unwrap();

    store.set_failing(true);
    let exchange = session.send("so frustrated with my landlord").unwrap();
    assert_eq!(exchange.reply_kind, ReplyKind::Keyword(Topic::Anger));
    assert!(matches!(exchange.save, SaveStatus::Failed(_)));

    // Last write wins once the store recovers
    store.set_failing(false);
    let exchange = session
        .send("we talked it over and agreed on a plan for the repairs")
        .unwrap();
    // greeting, first exchange, this user message: 4 before the reply
    assert_eq!(exchange.reply_kind, ReplyKind::FollowUp);
    assert!(FOLLOW_UP_RESPONSES.contains(&exchange.reply.content.as_str()));
    assert_eq!(
        store.row("user-1").unwrap().decode_messages().messages.len(),
        5
    );
}

#[test]
fn browser_written_history_is_kept_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
    let stored = json!([
        {"id": "1717000000000", "role": "assistant", "content": "Hello there!", "timestamp": "2024-05-29T16:26:40.000Z"},
        {"id": "1717000005000", "role": "user", "content": "thanks", "timestamp": "2024-05-29T16:26:45+00:00"},
        {"id": "1717000006000", "role": "assistant", "content": "You're welcome.", "timestamp": "2024-05-29 16:26:46"},
    ]);
    write_hosted_row(&temp_dir, "user-1", &stored);

    let mut session = new_session(&store, "user-1", 5);
    assert_eq!(
        session.hydrate().unwrap(),
        Hydration::WithHistory { messages: 3 }
    );
    let exchange = session.send("I feel anxious about work").unwrap();
    assert_eq!(exchange.save, SaveStatus::Saved);

    // Stored entries come back untouched, new ones follow
    let row = store.get_recent_conversation("user-1").unwrap().remove(0);
    let saved = row.messages.as_array().unwrap();
    assert_eq!(saved.len(), 5);
    assert_eq!(saved[..3], stored.as_array().unwrap()[..]);
    assert_eq!(saved[4]["content"], ANXIETY_REPLY);
    assert_eq!(row.id, "9b2f6a0e-0000-4000-8000-000000000001");
}

#[test]
fn off_shape_entry_is_never_saved_over_silently() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
    let stored = json!([
        {"id": "1717000000000", "role": "assistant", "content": "Hello there!", "timestamp": "2024-05-29T16:26:40.000Z"},
        {"id": "1717000005000", "role": "user", "content": "thanks", "timestamp": "2024-05-29T16:26:45.000Z"},
        {"id": "1717000006000", "role": "system", "content": "imported", "timestamp": "2024-05-29T16:26:46.000Z"},
        {"id": "1717000007000", "role": "assistant", "content": "You're welcome.", "timestamp": "2024-05-29T16:26:47.000Z"},
    ]);
    write_hosted_row(&temp_dir, "user-1", &stored);
    let path = temp_dir.path().join("conversations").join("user-1.json");
    let before = fs::read_to_string(&path).unwrap();

    // Step 1: readable entries are shown, the save is held back
    let mut session = new_session(&store, "user-1", 6);
    assert_eq!(
        session.hydrate().unwrap(),
        Hydration::Partial {
            messages: 3,
            unreadable: 1
        }
    );
    let exchange = session.send("thank you so much").unwrap();
    assert_eq!(exchange.save, SaveStatus::Withheld);
    assert_eq!(exchange.reply.content, GRATITUDE_REPLY);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);

    // Step 2: once the loss is accepted, the next exchange saves
    assert_eq!(session.discard_unreadable(), 1);
    let exchange = session.send("thanks again").unwrap();
    assert_eq!(exchange.save, SaveStatus::Saved);

    let row = store.get_recent_conversation("user-1").unwrap().remove(0);
    let decoded = row.decode_messages();
    assert!(decoded.is_complete());
    assert_eq!(decoded.messages.len(), 7);
    assert!(decoded.messages.iter().all(|m| m.content != "imported"));
}
