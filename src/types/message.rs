use serde::{Deserialize, Serialize};

/// Role type for a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// A single message in a conversation.
///
/// Role and content are immutable once created; conversations only ever
/// append. Assistant messages may carry a pre-rendered HTML answer, which
/// is settable only through [`Message::assistant_html`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message.
    pub role: Role,

    /// The raw text content of the message.
    pub content: String,

    #[serde(
        rename = "answer_html",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    html: Option<String>,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            html: None,
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            html: None,
        }
    }

    /// Create an assistant message carrying a pre-rendered HTML answer.
    ///
    /// This is the explicit opt-in for the trusted-HTML path: the HTML is
    /// rendered verbatim with no sanitization, which is acceptable only
    /// because it comes from the single backend this client talks to. If
    /// the backend trust model changes, this constructor is the boundary
    /// to revisit.
    pub fn assistant_html(content: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            html: Some(html.into()),
        }
    }

    /// Returns the pre-rendered HTML answer, if this message opted in to
    /// the trusted-HTML path.
    pub fn trusted_html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Returns true if this is a user message.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
