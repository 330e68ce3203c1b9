//! Conversation storage: the backend seam, its implementations, and the
//! best-effort adapter the chat session talks to.

pub mod adapter;
pub mod file;
pub mod memory;
pub mod remote;
pub mod traits;

pub use adapter::{ConversationStoreAdapter, LoadedHistory, SaveStatus};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use remote::RemoteBackend;
pub use traits::{ConversationStore, DecodedMessages, StoredConversation};
