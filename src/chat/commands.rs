//! Parse user chat commands.

use std::path::PathBuf;

use crate::types::ContextMode;

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Start a fresh conversation.
    New,
    /// List archived conversations.
    Chats,
    /// Resume an archived conversation by its list index.
    Resume(usize),
    /// Switch the context mode.
    Context(ContextMode),
    /// Pick the single document for document mode.
    Doc(String),
    /// Toggle a document in the custom-mode selection.
    Docs(String),
    /// List the documents known to the service.
    Files,
    /// Upload files as document context.
    Upload(Vec<PathBuf>),
    /// Show who is logged in.
    Whoami,
    /// Log out and clear the saved identity.
    Logout,
    /// Show available commands.
    Help,
    /// Exit the shell.
    Quit,
    /// An unrecognized or malformed command, with a message to display.
    Invalid(String),
}

/// Parses a line as a slash command.
///
/// Returns None when the line does not start with `/`, in which case it
/// is a chat message.
pub fn parse_command(line: &str) -> Option<ChatCommand> {
    let line = line.trim();
    if !line.starts_with('/') {
        return None;
    }
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    let rest: Vec<&str> = parts.collect();
    let parsed = match command {
        "/new" => ChatCommand::New,
        "/chats" => ChatCommand::Chats,
        "/resume" => match rest.first().map(|s| s.parse::<usize>()) {
            Some(Ok(idx)) => ChatCommand::Resume(idx),
            _ => ChatCommand::Invalid("usage: /resume <index>".to_string()),
        },
        "/context" => match rest.first().map(|s| s.parse::<ContextMode>()) {
            Some(Ok(mode)) => ChatCommand::Context(mode),
            Some(Err(err)) => ChatCommand::Invalid(err.to_string()),
            None => ChatCommand::Invalid("usage: /context <global|document|custom>".to_string()),
        },
        "/doc" => {
            if rest.is_empty() {
                ChatCommand::Invalid("usage: /doc <name>".to_string())
            } else {
                ChatCommand::Doc(rest.join(" "))
            }
        }
        "/docs" => {
            if rest.is_empty() {
                ChatCommand::Invalid("usage: /docs <name>".to_string())
            } else {
                ChatCommand::Docs(rest.join(" "))
            }
        }
        "/files" => ChatCommand::Files,
        "/upload" => {
            if rest.is_empty() {
                ChatCommand::Invalid("usage: /upload <path> [path ...]".to_string())
            } else {
                ChatCommand::Upload(rest.iter().map(PathBuf::from).collect())
            }
        }
        "/whoami" => ChatCommand::Whoami,
        "/logout" => ChatCommand::Logout,
        "/help" => ChatCommand::Help,
        "/quit" | "/exit" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("unknown command: {command} (try /help)")),
    };
    Some(parsed)
}

/// Help text listing the available commands.
pub fn help_text() -> &'static str {
    "commands:
  /new                      start a fresh conversation
  /chats                    list past conversations
  /resume <index>           resume a past conversation
  /context <mode>           set context mode (global, document, custom)
  /doc <name>               pick the document for document mode
  /docs <name>              toggle a document in the custom selection
  /files                    list uploaded documents
  /upload <path> [path ..]  upload files as document context
  /whoami                   show the logged-in account
  /logout                   log out and forget the saved identity
  /help                     show this help
  /quit                     exit"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command("  what about /new mid-line"), None);
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse_command("/new"), Some(ChatCommand::New));
        assert_eq!(parse_command("/chats"), Some(ChatCommand::Chats));
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /help  "), Some(ChatCommand::Help));
    }

    #[test]
    fn resume_takes_an_index() {
        assert_eq!(parse_command("/resume 3"), Some(ChatCommand::Resume(3)));
        assert!(matches!(
            parse_command("/resume"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/resume three"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn context_takes_a_mode() {
        assert_eq!(
            parse_command("/context document"),
            Some(ChatCommand::Context(ContextMode::Document))
        );
        assert!(matches!(
            parse_command("/context everything"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn doc_names_may_contain_spaces() {
        assert_eq!(
            parse_command("/doc annual report.pdf"),
            Some(ChatCommand::Doc("annual report.pdf".to_string()))
        );
    }

    #[test]
    fn upload_collects_paths() {
        assert_eq!(
            parse_command("/upload a.pdf b.txt"),
            Some(ChatCommand::Upload(vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("b.txt")
            ]))
        );
    }

    #[test]
    fn unknown_command_is_invalid() {
        assert!(matches!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid(_))
        ));
    }
}
