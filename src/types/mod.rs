// Public modules
pub mod context;
pub mod conversation;
pub mod identity;
pub mod message;
pub mod request;

// Re-exports
pub use context::{ContextMode, ContextSelection};
pub use conversation::ConversationSummary;
pub use identity::{Identity, validate_password};
pub use message::{Message, Role};
pub use request::{ChatReply, ChatRequest, HistoryEntry, HistoryPair, RegisterParams};
