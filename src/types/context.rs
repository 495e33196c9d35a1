use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The scope of documents the service should consult when answering.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// All uploaded documents.
    #[default]
    Global,

    /// One specific document.
    Document,

    /// An explicit subset of documents.
    Custom,
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextMode::Global => "global",
            ContextMode::Document => "document",
            ContextMode::Custom => "custom",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ContextMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "global" => Ok(ContextMode::Global),
            "document" | "single" => Ok(ContextMode::Document),
            "custom" | "multi" => Ok(ContextMode::Custom),
            other => Err(Error::validation(
                format!("unknown context mode: {other} (use global, document, or custom)"),
                Some("context_mode".to_string()),
            )),
        }
    }
}

/// Local, ephemeral document-selection state for the mounted conversation.
///
/// Invariant on outgoing requests: `selected_doc` is relevant only in
/// `Document` mode, `selected_docs` only in `Custom` mode, and neither in
/// `Global` mode. Switching modes retains the last-picked values in local
/// state but [`ContextSelection::request_fields`] excludes whatever the
/// current mode makes irrelevant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSelection {
    /// The active context mode.
    pub mode: ContextMode,

    /// The single selection used in `Document` mode.
    pub selected_doc: Option<String>,

    /// The multi-selection used in `Custom` mode.
    pub selected_docs: Vec<String>,

    /// Document names known to the service, refreshed on mount and after
    /// a successful upload.
    pub documents: Vec<String>,
}

impl ContextSelection {
    /// Create an empty selection in global mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything back to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Switch the context mode, keeping existing selections in state.
    pub fn set_mode(&mut self, mode: ContextMode) {
        self.mode = mode;
    }

    /// Replace the known document list.
    ///
    /// If nothing is selected yet, the first document becomes the default
    /// single selection. Selections naming documents the service no longer
    /// reports are dropped.
    pub fn set_documents(&mut self, documents: Vec<String>) {
        self.documents = documents;
        if let Some(selected) = &self.selected_doc
            && !self.documents.contains(selected)
        {
            self.selected_doc = None;
        }
        self.selected_docs
            .retain(|doc| self.documents.contains(doc));
        if self.selected_doc.is_none() {
            self.selected_doc = self.documents.first().cloned();
        }
    }

    /// Set the single selection used in `Document` mode.
    pub fn select_document(&mut self, name: &str) -> Result<()> {
        if !self.documents.iter().any(|doc| doc == name) {
            return Err(Error::validation(
                format!("unknown document: {name}"),
                Some("selected_doc".to_string()),
            ));
        }
        self.selected_doc = Some(name.to_string());
        Ok(())
    }

    /// Toggle a document in and out of the `Custom` mode selection.
    ///
    /// Returns true if the document is selected after the call.
    pub fn toggle_document(&mut self, name: &str) -> Result<bool> {
        if !self.documents.iter().any(|doc| doc == name) {
            return Err(Error::validation(
                format!("unknown document: {name}"),
                Some("selected_docs".to_string()),
            ));
        }
        if let Some(pos) = self.selected_docs.iter().position(|doc| doc == name) {
            self.selected_docs.remove(pos);
            Ok(false)
        } else {
            self.selected_docs.push(name.to_string());
            Ok(true)
        }
    }

    /// Returns the selection fields an outgoing chat request should carry.
    ///
    /// Only the fields relevant to the current mode are present; global
    /// mode carries neither.
    pub fn request_fields(&self) -> (Option<String>, Option<Vec<String>>) {
        match self.mode {
            ContextMode::Global => (None, None),
            ContextMode::Document => (self.selected_doc.clone(), None),
            ContextMode::Custom => (None, Some(self.selected_docs.clone())),
        }
    }
}
