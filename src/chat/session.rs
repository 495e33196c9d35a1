//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the message
//! list for the mounted conversation and the document-selection state
//! that scopes outgoing questions.

use std::path::PathBuf;
use std::sync::Arc;

use crate::client::Backend;
use crate::error::{Error, Result};
use crate::observability;
use crate::types::{ChatRequest, ContextMode, ContextSelection, Message};

/// A chat session over one mounted conversation.
///
/// The session is a two-state machine: idle (waiting for input) and
/// awaiting-reply (a question is in flight). Submissions while a reply is
/// pending are rejected locally; the user's message is appended
/// optimistically on submit and never rolled back.
pub struct ChatSession<B: Backend> {
    backend: Arc<B>,
    messages: Vec<Message>,
    context: ContextSelection,
    awaiting_reply: bool,
}

impl<B: Backend> ChatSession<B> {
    /// Creates a session with no conversation mounted yet.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            messages: Vec::new(),
            context: ContextSelection::new(),
            awaiting_reply: false,
        }
    }

    /// The greeting that opens an empty conversation.
    pub fn greeting(name: &str) -> Message {
        Message::assistant(format!("Hello {name}, how can I help you today?"))
    }

    /// Returns the messages of the mounted conversation, in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the document-selection state.
    pub fn context(&self) -> &ContextSelection {
        &self.context
    }

    /// Returns true while a question is in flight.
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Switches the context mode.
    pub fn set_context_mode(&mut self, mode: ContextMode) {
        self.context.set_mode(mode);
    }

    /// Sets the single document selection.
    pub fn select_document(&mut self, name: &str) -> Result<()> {
        self.context.select_document(name)
    }

    /// Toggles a document in the custom selection. Returns true if the
    /// document is selected after the call.
    pub fn toggle_document(&mut self, name: &str) -> Result<bool> {
        self.context.toggle_document(name)
    }

    /// Clears all conversation-scoped state back to defaults.
    ///
    /// Called whenever the mounted conversation changes; partial merges
    /// are not supported.
    pub fn reset_conversation_state(&mut self) {
        self.context.reset();
        self.awaiting_reply = false;
    }

    /// Mounts a fresh, empty conversation.
    pub async fn mount_new(&mut self, name: &str) -> Result<()> {
        self.messages = vec![Self::greeting(name)];
        self.reset_conversation_state();
        self.refresh_documents().await
    }

    /// Mounts a conversation from stored history, replacing everything.
    ///
    /// Empty history falls back to the greeting.
    pub async fn mount_history(&mut self, history: Vec<Message>, name: &str) -> Result<()> {
        self.messages = if history.is_empty() {
            vec![Self::greeting(name)]
        } else {
            history
        };
        self.reset_conversation_state();
        self.refresh_documents().await
    }

    /// Refreshes the document list from the service.
    pub async fn refresh_documents(&mut self) -> Result<()> {
        let documents = self.backend.fetch_documents().await?;
        self.context.set_documents(documents);
        Ok(())
    }

    /// Submits a question and appends the reply.
    ///
    /// The user message is appended before the request goes out and stays
    /// appended even when the request fails; a failure is recorded as an
    /// assistant message carrying the error text. Returns the appended
    /// assistant message.
    ///
    /// # Errors
    ///
    /// Returns a validation error, without touching the network or the
    /// message list, when the trimmed input is empty or a reply is still
    /// pending.
    pub async fn submit(&mut self, input: &str) -> Result<&Message> {
        let question = input.trim();
        if question.is_empty() {
            return Err(Error::validation(
                "message must not be empty",
                Some("question".to_string()),
            ));
        }
        if self.awaiting_reply {
            return Err(Error::validation(
                "a reply is still pending; wait for it before sending again",
                Some("question".to_string()),
            ));
        }

        self.messages.push(Message::user(question));
        let request = ChatRequest::new(question, &self.context);

        self.awaiting_reply = true;
        observability::CHAT_TURNS.click();
        let outcome = self.backend.send_chat(request).await;
        self.awaiting_reply = false;

        match outcome {
            Ok(reply) => self.messages.push(reply.into()),
            Err(err) => {
                observability::CHAT_TURN_ERRORS.click();
                self.messages.push(Message::assistant(err.to_string()));
            }
        }
        Ok(self.messages.last().expect("reply was just appended"))
    }

    /// Uploads documents and refreshes the document list on success.
    pub async fn upload(&mut self, paths: &[PathBuf]) -> Result<Vec<String>> {
        let uploaded = self.backend.upload_documents(paths).await?;
        if !uploaded.is_empty() {
            self.refresh_documents().await?;
        }
        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::types::{ChatReply, ConversationSummary, Identity, RegisterParams, Role};

    /// Backend double that replays scripted chat replies and counts calls.
    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<Vec<Result<ChatReply>>>,
        documents: Mutex<Vec<String>>,
        chat_calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn with_replies(replies: Vec<Result<ChatReply>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                ..Self::default()
            }
        }

        fn chat_calls(&self) -> usize {
            self.chat_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Backend for ScriptedBackend {
        async fn login(&self, email: &str, _password: &str) -> Result<Identity> {
            Ok(Identity::new(email, "Test"))
        }

        async fn register(&self, params: RegisterParams) -> Result<Identity> {
            Ok(Identity::new(params.email, params.name))
        }

        async fn logout(&self) -> Result<()> {
            Ok(())
        }

        async fn send_chat(&self, _request: ChatRequest) -> Result<ChatReply> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            self.replies.lock().unwrap().remove(0)
        }

        async fn upload_documents(&self, paths: &[PathBuf]) -> Result<Vec<String>> {
            let names: Vec<String> = paths
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            self.documents.lock().unwrap().extend(names.clone());
            Ok(names)
        }

        async fn fetch_history(&self) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }

        async fn start_new_chat(&self) -> Result<()> {
            Ok(())
        }

        async fn fetch_conversation_list(&self) -> Result<Vec<ConversationSummary>> {
            Ok(Vec::new())
        }

        async fn fetch_conversation(&self, _idx: usize) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }

        async fn fetch_documents(&self) -> Result<Vec<String>> {
            Ok(self.documents.lock().unwrap().clone())
        }
    }

    fn reply(answer: &str) -> Result<ChatReply> {
        Ok(ChatReply {
            answer: answer.to_string(),
            answer_html: None,
        })
    }

    #[tokio::test]
    async fn mount_new_starts_with_greeting() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = ChatSession::new(backend);
        session.mount_new("Ada").await.unwrap();
        assert_eq!(session.message_count(), 1);
        assert_eq!(
            session.messages()[0].content,
            "Hello Ada, how can I help you today?"
        );
        assert_eq!(session.context().mode, ContextMode::Global);
    }

    #[tokio::test]
    async fn submit_appends_user_then_assistant() {
        let backend = Arc::new(ScriptedBackend::with_replies(vec![reply("the answer")]));
        let mut session = ChatSession::new(backend.clone());
        session.mount_new("Ada").await.unwrap();

        session.submit("what is clause 4?").await.unwrap();
        assert_eq!(session.message_count(), 3);
        assert_eq!(session.messages()[1].role, Role::User);
        assert_eq!(session.messages()[1].content, "what is clause 4?");
        assert_eq!(session.messages()[2].role, Role::Assistant);
        assert_eq!(session.messages()[2].content, "the answer");
        assert!(!session.is_awaiting_reply());
        assert_eq!(backend.chat_calls(), 1);
    }

    #[tokio::test]
    async fn failed_submit_keeps_user_message_and_appends_error() {
        let backend = Arc::new(ScriptedBackend::with_replies(vec![Err(
            Error::internal_server("backend exploded"),
        )]));
        let mut session = ChatSession::new(backend);
        session.mount_new("Ada").await.unwrap();

        let appended = session.submit("q").await.unwrap();
        assert!(appended.content.contains("backend exploded"));
        assert_eq!(session.message_count(), 3);
        assert_eq!(session.messages()[1].role, Role::User);
        assert!(!session.is_awaiting_reply());
    }

    #[tokio::test]
    async fn empty_input_is_rejected_without_a_call() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = ChatSession::new(backend.clone());
        session.mount_new("Ada").await.unwrap();

        assert!(session.submit("   ").await.unwrap_err().is_validation());
        assert_eq!(session.message_count(), 1);
        assert_eq!(backend.chat_calls(), 0);
    }

    #[tokio::test]
    async fn submit_while_awaiting_reply_is_rejected_without_a_call() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = ChatSession::new(backend.clone());
        session.mount_new("Ada").await.unwrap();

        session.awaiting_reply = true;
        let err = session.submit("too soon").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.message_count(), 1);
        assert_eq!(backend.chat_calls(), 0);
    }

    #[tokio::test]
    async fn mount_history_replaces_wholesale() {
        let backend = Arc::new(ScriptedBackend::with_replies(vec![reply("a1")]));
        let mut session = ChatSession::new(backend);
        session.mount_new("Ada").await.unwrap();
        session.submit("q1").await.unwrap();

        let stored = vec![Message::user("old q"), Message::assistant("old a")];
        session.mount_history(stored.clone(), "Ada").await.unwrap();
        assert_eq!(session.messages(), stored.as_slice());
    }

    #[tokio::test]
    async fn mount_resets_context_selection() {
        let backend = Arc::new(ScriptedBackend::default());
        backend
            .documents
            .lock()
            .unwrap()
            .push("notes.pdf".to_string());
        let mut session = ChatSession::new(backend);
        session.mount_new("Ada").await.unwrap();
        session.set_context_mode(ContextMode::Custom);
        session.toggle_document("notes.pdf").unwrap();

        session.mount_new("Ada").await.unwrap();
        assert_eq!(session.context().mode, ContextMode::Global);
        assert!(session.context().selected_docs.is_empty());
        // Document list comes back freshly fetched.
        assert_eq!(session.context().documents, vec!["notes.pdf".to_string()]);
    }

    #[tokio::test]
    async fn upload_refreshes_document_list() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = ChatSession::new(backend);
        session.mount_new("Ada").await.unwrap();
        assert!(session.context().documents.is_empty());

        let uploaded = session.upload(&[PathBuf::from("/tmp/notes.pdf")]).await.unwrap();
        assert_eq!(uploaded, vec!["notes.pdf".to_string()]);
        assert_eq!(session.context().documents, vec!["notes.pdf".to_string()]);
        assert_eq!(
            session.context().selected_doc.as_deref(),
            Some("notes.pdf")
        );
    }
}
