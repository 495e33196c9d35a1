//! Authenticated shell wrapping a chat session.
//!
//! The shell owns the login state, the saved identity on disk, and the
//! cached list of past conversations; the mounted conversation itself
//! lives in the inner [`ChatSession`].

use std::sync::Arc;

use crate::chat::session::ChatSession;
use crate::client::Backend;
use crate::error::{Error, Result};
use crate::store::IdentityStore;
use crate::types::{ConversationSummary, Identity, Message, RegisterParams};

/// Login state plus a mounted chat session.
pub struct SessionShell<B: Backend> {
    backend: Arc<B>,
    store: IdentityStore,
    identity: Option<Identity>,
    session: ChatSession<B>,
    /// Past conversations, fetched lazily and invalidated only when a new
    /// conversation is started.
    conversation_list: Option<Vec<ConversationSummary>>,
}

impl<B: Backend> SessionShell<B> {
    /// Creates a logged-out shell.
    pub fn new(backend: Arc<B>, store: IdentityStore) -> Self {
        let session = ChatSession::new(backend.clone());
        Self {
            backend,
            store,
            identity: None,
            session,
            conversation_list: None,
        }
    }

    /// The logged-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns true once login or registration has succeeded.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The mounted chat session.
    pub fn session(&self) -> &ChatSession<B> {
        &self.session
    }

    /// The mounted chat session, mutably.
    pub fn session_mut(&mut self) -> &mut ChatSession<B> {
        &mut self.session
    }

    /// Loads the identity saved by a previous run, without logging in.
    ///
    /// Authentication is a session cookie held by the backend, so a saved
    /// identity only prefills the login prompt.
    pub fn saved_identity(&self) -> Result<Option<Identity>> {
        self.store.load()
    }

    fn display_name(&self) -> &str {
        self.identity.as_ref().map(|i| i.name.as_str()).unwrap_or("there")
    }

    fn require_auth(&self) -> Result<()> {
        if self.identity.is_some() {
            Ok(())
        } else {
            Err(Error::authentication("not logged in"))
        }
    }

    /// Mounts the server-side current conversation, falling back to a
    /// fresh greeting when it is empty.
    async fn mount_current(&mut self) -> Result<()> {
        let history = self.backend.fetch_history().await?;
        let name = self.display_name().to_string();
        self.session.mount_history(history, &name).await
    }

    /// Logs in and mounts the current conversation.
    ///
    /// The identity is saved to disk on success so the next run can
    /// prefill the prompt.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let identity = self.backend.login(email, password).await?;
        self.store.save(&identity)?;
        self.identity = Some(identity);
        self.conversation_list = None;
        self.mount_current().await
    }

    /// Registers a new account and mounts a fresh conversation.
    pub async fn register(&mut self, params: RegisterParams) -> Result<()> {
        let identity = self.backend.register(params).await?;
        self.store.save(&identity)?;
        self.identity = Some(identity);
        self.conversation_list = None;
        self.mount_current().await
    }

    /// Archives the current conversation and mounts a fresh one.
    pub async fn new_chat(&mut self) -> Result<()> {
        self.require_auth()?;
        self.backend.start_new_chat().await?;
        self.conversation_list = None;
        let name = self.display_name().to_string();
        self.session.mount_new(&name).await
    }

    /// Lists past conversations, newest first as the service reports them.
    ///
    /// The list is cached; only starting a new conversation invalidates
    /// it.
    pub async fn conversation_list(&mut self) -> Result<&[ConversationSummary]> {
        self.require_auth()?;
        if self.conversation_list.is_none() {
            self.conversation_list = Some(self.backend.fetch_conversation_list().await?);
        }
        Ok(self.conversation_list.as_deref().expect("list was just fetched"))
    }

    /// Resumes a past conversation by its list index, replacing the
    /// mounted conversation wholesale.
    pub async fn resume(&mut self, idx: usize) -> Result<()> {
        self.require_auth()?;
        let history: Vec<Message> = self.backend.fetch_conversation(idx).await?;
        let name = self.display_name().to_string();
        self.session.mount_history(history, &name).await
    }

    /// Logs out, clears the saved identity, and resets all local state.
    ///
    /// The server call is best-effort: local state is cleared even when
    /// the service is unreachable.
    pub async fn logout(&mut self) -> Result<()> {
        let server_result = self.backend.logout().await;
        self.store.clear()?;
        self.identity = None;
        self.conversation_list = None;
        self.session = ChatSession::new(self.backend.clone());
        server_result
    }
}
