//! # Session State
//!
//! The in-memory editing context for one document at a time.
//!
//! A session is either **unbound** (new, never saved) or **bound** to a stored
//! document id. Orthogonal to that, it is dirty or clean:
//!
//! ```text
//!            save / save_as / quick_save
//!   Unbound ───────────────────────────────▶ Bound(id)
//!      ▲                                      │   │
//!      │ new_session / bound doc deleted      │   │ load(other)
//!      └──────────────────────────────────────┘   ▼
//!                                             Bound(other id)
//! ```
//!
//! The dirty flag is never set directly. It is recomputed by comparing the
//! session against the bound document (or, when unbound, against the seed
//! the session started from) through [`Session::recompute_dirty`].

use crate::model::StoredDocument;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Session {
    content: String,
    style: String,
    title: String,
    bound_id: Option<String>,
    /// Content an unbound session started from; edits away from it are dirty.
    seed: String,
    dirty: bool,
}

impl Session {
    /// Start an unbound session showing `seed` (e.g. a welcome document).
    pub fn with_seed(seed: impl Into<String>, title: impl Into<String>) -> Self {
        let seed = seed.into();
        Self {
            content: seed.clone(),
            title: title.into(),
            seed,
            ..Self::default()
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn bound_id(&self) -> Option<&str> {
        self.bound_id.as_deref()
    }

    /// The quick-save branch condition: overwrite in place, or ask for a title.
    pub fn is_bound(&self) -> bool {
        self.bound_id.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear everything: empty content and style, unbound, clean.
    pub fn new_session(&mut self) {
        *self = Self::default();
        debug!("session reset to a blank document");
    }

    /// Open a stored document, replacing content and style wholesale.
    pub fn load(&mut self, doc: &StoredDocument) {
        self.content = doc.content.clone();
        self.style = doc.style_text().to_string();
        self.title = doc.title.clone();
        self.bound_id = Some(doc.id.clone());
        self.seed.clear();
        self.dirty = false;
        debug!(id = %doc.id, "session loaded document");
    }

    pub fn edit(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.style = style.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Attach the session to a freshly saved document.
    pub fn bind(&mut self, id: impl Into<String>, title: impl Into<String>) {
        self.bound_id = Some(id.into());
        self.title = title.into();
        self.seed.clear();
    }

    /// Detach from a document that no longer exists; the content stays.
    pub fn unbind(&mut self) {
        self.bound_id = None;
        self.seed.clear();
    }

    /// Recompute `dirty` against `bound`, the stored document for
    /// [`bound_id`](Self::bound_id) as the caller resolved it.
    ///
    /// A bound session whose document no longer resolves is always dirty.
    pub fn recompute_dirty(&mut self, bound: Option<&StoredDocument>) {
        self.dirty = match (&self.bound_id, bound) {
            (Some(_), Some(doc)) => doc.content != self.content || doc.style_text() != self.style,
            (Some(_), None) => true,
            (None, _) => self.content.trim() != self.seed.trim() || !self.style.trim().is_empty(),
        };
    }
}
