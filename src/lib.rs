// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod format;
pub mod observability;
pub mod render;
pub mod store;
pub mod types;

// Re-exports
pub use client::{Backend, DocQa};
pub use error::{Error, Result};
pub use format::{CodeBlock, Segment, format_message, reconstruct};
pub use store::IdentityStore;
pub use types::*;
