//! # Command Layer
//!
//! The document-level business logic of markdraft. Each command lives in its
//! own submodule as plain functions over the [`DocumentStore`] and the
//! [`Session`]; [`MarkdraftApi`](crate::api::MarkdraftApi) wires them
//! together with history and autosave.
//!
//! ## What Commands Do NOT Do
//!
//! - **Any I/O beyond the store**: no stdout, no dialogs, no clipboard.
//! - **User interaction**: a command that needs more input (e.g. a title for
//!   an unsaved document) says so in its return value and lets the shell ask.
//! - **Version history**: recording snapshots is the facade's job.
//!
//! ## Structured Returns
//!
//! Commands return [`CmdResult`], not strings:
//! - `affected_documents`: documents created, renamed, overwritten or deleted
//! - `listed_documents`: summaries for the saved-documents panel
//! - `messages`: notifications with a level (info, success, warning)
//!
//! ## Testing Strategy
//!
//! Command tests use [`InMemoryStore`](crate::store::memory::InMemoryStore)
//! and cover every branch, error paths included.
//!
//! ## Command Modules
//!
//! - [`save`]: save-as and quick save
//! - [`rename`]: retitle a stored document
//! - [`delete`]: single and bulk deletion
//! - [`list`]: filtered, sorted document summaries
//! - [`style`]: inspector edits to the session stylesheet
//! - [`helpers`]: display helpers shared by the commands
//!
//! [`DocumentStore`]: crate::store::DocumentStore
//! [`Session`]: crate::session::Session

use crate::model::StoredDocument;
use serde::Serialize;

pub mod delete;
pub mod helpers;
pub mod list;
pub mod rename;
pub mod save;
pub mod style;

pub use list::DocumentSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_documents: Vec<StoredDocument>,
    pub listed_documents: Vec<DocumentSummary>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_affected_documents(mut self, documents: Vec<StoredDocument>) -> Self {
        self.affected_documents = documents;
        self
    }

    pub fn with_listed_documents(mut self, documents: Vec<DocumentSummary>) -> Self {
        self.listed_documents = documents;
        self
    }
}
