//! Interactive chat shell for the document Q&A service.
//!
//! This module provides the terminal chat interface built on top of the
//! docqa client library. It supports:
//!
//! - Login, registration, and a saved identity across runs
//! - Conversation history, archiving, and resume
//! - Document uploads and context-mode selection
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management
//! - [`shell`]: Login state and conversation switching
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod session;
mod shell;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::ChatSession;
pub use shell::SessionShell;
