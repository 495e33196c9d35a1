//! Configuration types for the chat shell.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for the interactive shell.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_API_URL;

/// Command-line arguments for the docqa-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the document Q&A service.
    #[arrrg(optional, "Service base URL (default: http://localhost:5000)", "URL")]
    pub url: Option<String>,

    /// Directory holding the saved identity.
    #[arrrg(optional, "Directory for saved login state (default: ~/.docqa)", "DIR")]
    pub state_dir: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for the chat shell.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the service.
    pub url: String,

    /// Directory for the saved identity, when overridden.
    pub state_dir: Option<PathBuf>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - URL: http://localhost:5000
    /// - State directory: ~/.docqa
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            state_dir: None,
            use_color: true,
        }
    }

    /// Sets the service base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the saved-identity directory.
    pub fn with_state_dir(mut self, dir: PathBuf) -> Self {
        self.state_dir = Some(dir);
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            url: args.url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            state_dir: args.state_dir.map(PathBuf::from),
            use_color: !args.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_resolve_to_config() {
        let args = ChatArgs {
            url: Some("http://qa.internal:8080".to_string()),
            state_dir: Some("/tmp/docqa-state".to_string()),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.url, "http://qa.internal:8080");
        assert_eq!(config.state_dir, Some(PathBuf::from("/tmp/docqa-state")));
        assert!(!config.use_color);
    }

    #[test]
    fn defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config.url, DEFAULT_API_URL);
        assert!(config.state_dir.is_none());
        assert!(config.use_color);
    }
}
