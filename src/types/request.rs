use serde::{Deserialize, Serialize};

use crate::types::context::{ContextMode, ContextSelection};
use crate::types::message::{Message, Role};

/// Body of a chat request.
///
/// The selection fields follow the context-mode invariant: `selected_doc`
/// is present only in document mode, `selected_docs` only in custom mode,
/// and neither in global mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// The user's question.
    pub question: String,

    /// The document scope the service should answer from.
    pub context_mode: ContextMode,

    /// The single document to consult, in document mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_doc: Option<String>,

    /// The explicit document subset to consult, in custom mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_docs: Option<Vec<String>>,
}

impl ChatRequest {
    /// Build a request for a question under the given selection state.
    pub fn new(question: impl Into<String>, selection: &ContextSelection) -> Self {
        let (selected_doc, selected_docs) = selection.request_fields();
        Self {
            question: question.into(),
            context_mode: selection.mode,
            selected_doc,
            selected_docs,
        }
    }
}

/// A successful chat response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    /// The answer text.
    pub answer: String,

    /// Pre-rendered HTML for the answer, when the service provides it.
    #[serde(default)]
    pub answer_html: Option<String>,
}

impl From<ChatReply> for Message {
    fn from(reply: ChatReply) -> Self {
        match reply.answer_html {
            Some(html) => Message::assistant_html(reply.answer, html),
            None => Message::assistant(reply.answer),
        }
    }
}

/// Parameters for registering a new account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterParams {
    /// Email address to register.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Date of birth.
    pub dob: String,

    /// Password, validated locally before the request is sent.
    pub password: String,
}

/// A user/assistant exchange as returned by the current-conversation
/// history endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryPair {
    /// The user's message.
    pub user: String,

    /// The assistant's reply.
    pub assistant: String,
}

impl HistoryPair {
    /// Flattens pairs into ordered messages, user before assistant.
    pub fn flatten(pairs: Vec<HistoryPair>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(pairs.len() * 2);
        for pair in pairs {
            messages.push(Message::user(pair.user));
            messages.push(Message::assistant(pair.assistant));
        }
        messages
    }
}

/// A role-tagged entry as returned by the archived-conversation endpoint.
///
/// The service stores extra fields (timestamps) per entry; only the role
/// and content matter to the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    /// Who said it.
    pub role: Role,

    /// What was said.
    pub content: String,
}

impl From<HistoryEntry> for Message {
    fn from(entry: HistoryEntry) -> Self {
        match entry.role {
            Role::User => Message::user(entry.content),
            Role::Assistant => Message::assistant(entry.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    fn selection(mode: ContextMode) -> ContextSelection {
        let mut selection = ContextSelection::new();
        selection.set_documents(vec!["a.pdf".to_string(), "b.pdf".to_string()]);
        selection.set_mode(mode);
        selection
    }

    #[test]
    fn global_request_omits_selection_fields() {
        let request = ChatRequest::new("what is clause 4?", &selection(ContextMode::Global));
        let json = to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "question": "what is clause 4?",
                "context_mode": "global"
            })
        );
    }

    #[test]
    fn document_request_carries_selected_doc() {
        let mut sel = selection(ContextMode::Document);
        sel.select_document("b.pdf").unwrap();
        let request = ChatRequest::new("q", &sel);
        let json = to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "question": "q",
                "context_mode": "document",
                "selected_doc": "b.pdf"
            })
        );
    }

    #[test]
    fn custom_request_carries_selected_docs() {
        let mut sel = selection(ContextMode::Custom);
        sel.toggle_document("a.pdf").unwrap();
        let request = ChatRequest::new("q", &sel);
        let json = to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "question": "q",
                "context_mode": "custom",
                "selected_docs": ["a.pdf"]
            })
        );
    }

    #[test]
    fn reply_with_html_becomes_trusted_message() {
        let reply = ChatReply {
            answer: "hi".to_string(),
            answer_html: Some("<p>hi</p>".to_string()),
        };
        let message: Message = reply.into();
        assert_eq!(message.trusted_html(), Some("<p>hi</p>"));
    }

    #[test]
    fn pairs_flatten_user_then_assistant() {
        let pairs = vec![
            HistoryPair {
                user: "q1".to_string(),
                assistant: "a1".to_string(),
            },
            HistoryPair {
                user: "q2".to_string(),
                assistant: "a2".to_string(),
            },
        ];
        let messages = HistoryPair::flatten(pairs);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::user("q1"));
        assert_eq!(messages[1], Message::assistant("a1"));
        assert_eq!(messages[2], Message::user("q2"));
        assert_eq!(messages[3], Message::assistant("a2"));
    }

    #[test]
    fn history_entry_ignores_extra_fields() {
        let json = json!({
            "role": "user",
            "content": "hello",
            "timestamp": "Wed, 27 Aug 2025 12:00:00 GMT"
        });
        let entry: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(Message::from(entry), Message::user("hello"));
    }
}
