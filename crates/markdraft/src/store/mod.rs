//! # Storage Layer
//!
//! The document collection lives behind two pieces:
//!
//! - [`backend::Persistence`]: raw key-value style I/O. The whole collection is
//!   read and replaced at once, plus a flat string settings map.
//! - [`DocumentStore`]: the rules on top (ids, title uniqueness, quick-save,
//!   rename, idempotent delete), generic over the backend.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: a directory holding `documents.json` and
//!   `settings.json`, written atomically (temp file + rename).
//! - [`mem_backend::MemBackend`]: in-memory, used by tests and by hosts that
//!   bring their own storage (e.g. a browser shell syncing to local storage).
//!
//! ## Settings Keys
//!
//! Besides documents, the core keeps a few settings:
//! - [`API_KEY_SETTING`]: the user-supplied generation key
//! - [`DRAFT_SETTING`]: the autosaved working draft

pub mod backend;
pub mod doc_store;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;

pub use backend::Persistence;
pub use doc_store::DocumentStore;

pub const API_KEY_SETTING: &str = "markdraft-api-key";
pub const DRAFT_SETTING: &str = "markdraft-draft";
