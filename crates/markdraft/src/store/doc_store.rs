use super::backend::Persistence;
use crate::error::{MarkdraftError, Result};
use crate::model::{document_id, titles_match, StoredDocument};
use chrono::Utc;
use tracing::{debug, info};

/// The saved-document collection.
///
/// Documents are cached in memory in insertion order. Every mutation builds
/// the next collection, writes it through the backend as a whole, and only
/// then replaces the cache: a failed write leaves the store untouched.
pub struct DocumentStore<B: Persistence> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    pub(crate) documents: Vec<StoredDocument>,
    /// Last millisecond stamp handed out, so ids stay unique within a burst.
    pub(crate) last_stamp: i64,
}

impl<B: Persistence> DocumentStore<B> {
    /// Load the stored collection from `backend`.
    pub fn open(backend: B) -> Result<Self> {
        let documents = backend.get_all()?;
        debug!(count = documents.len(), "loaded document collection");
        Ok(Self {
            backend,
            documents,
            last_stamp: 0,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All documents in insertion order. Sorting and filtering is the
    /// caller's business (see `commands::list`).
    pub fn list(&self) -> &[StoredDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StoredDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&StoredDocument> {
        self.documents
            .iter()
            .find(|doc| titles_match(&doc.title, title))
    }

    /// Whether any document other than `except` already uses `title`.
    pub fn title_taken(&self, title: &str, except: Option<&str>) -> bool {
        self.documents
            .iter()
            .any(|doc| Some(doc.id.as_str()) != except && titles_match(&doc.title, title))
    }

    /// Store a new document. Uniqueness is the caller's concern here; use
    /// [`save_as`](Self::save_as) to have it checked.
    pub fn save(&mut self, title: &str, content: &str, style: Option<&str>) -> Result<String> {
        let title = require_title(title)?;
        let stamp = self.next_stamp();
        let id = document_id(title, stamp);

        let mut next = self.documents.clone();
        next.push(StoredDocument::new(
            id.clone(),
            title.to_string(),
            content.to_string(),
            normalize_style(style),
            Utc::now(),
        ));
        self.commit(next)?;

        info!(%id, title, "document saved");
        Ok(id)
    }

    /// Store a new document, refusing titles already in use.
    pub fn save_as(&mut self, title: &str, content: &str, style: Option<&str>) -> Result<String> {
        let trimmed = require_title(title)?;
        if self.title_taken(trimmed, None) {
            return Err(MarkdraftError::DuplicateTitle(trimmed.to_string()));
        }
        self.save(trimmed, content, style)
    }

    /// Overwrite the bound document in place, or store a new one when
    /// `bound_id` is absent or no longer resolves.
    pub fn quick_save(
        &mut self,
        bound_id: Option<&str>,
        title: &str,
        content: &str,
        style: Option<&str>,
    ) -> Result<String> {
        let position = bound_id.and_then(|id| self.documents.iter().position(|doc| doc.id == id));

        let Some(position) = position else {
            debug!(?bound_id, "quick save has no bound document, saving new");
            return self.save(title, content, style);
        };

        let mut next = self.documents.clone();
        let doc = &mut next[position];
        doc.content = content.to_string();
        doc.style = normalize_style(style);
        doc.timestamp = Utc::now();
        let id = doc.id.clone();
        self.commit(next)?;

        info!(%id, "document overwritten");
        Ok(id)
    }

    /// Rename a document. Returns `false` if `id` is unknown.
    pub fn rename(&mut self, id: &str, new_title: &str) -> Result<bool> {
        let new_title = require_title(new_title)?;
        let Some(position) = self.documents.iter().position(|doc| doc.id == id) else {
            return Ok(false);
        };
        if self.title_taken(new_title, Some(id)) {
            return Err(MarkdraftError::DuplicateTitle(new_title.to_string()));
        }

        let mut next = self.documents.clone();
        next[position].title = new_title.to_string();
        next[position].timestamp = Utc::now();
        self.commit(next)?;

        info!(id, title = new_title, "document renamed");
        Ok(true)
    }

    /// Delete a document. Returns `false` if `id` is unknown.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        Ok(self.delete_many(&[id])? == 1)
    }

    /// Delete every document whose id is in `ids`; unknown ids are skipped.
    /// Returns how many documents were removed.
    pub fn delete_many<I: AsRef<str>>(&mut self, ids: &[I]) -> Result<usize> {
        let next: Vec<StoredDocument> = self
            .documents
            .iter()
            .filter(|doc| !ids.iter().any(|id| id.as_ref() == doc.id))
            .cloned()
            .collect();

        let removed = self.documents.len() - next.len();
        if removed > 0 {
            self.commit(next)?;
            info!(removed, "documents deleted");
        }
        Ok(removed)
    }

    fn commit(&mut self, next: Vec<StoredDocument>) -> Result<()> {
        self.backend.replace_all(&next)?;
        self.documents = next;
        Ok(())
    }

    fn next_stamp(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_stamp = if now > self.last_stamp {
            now
        } else {
            self.last_stamp + 1
        };
        self.last_stamp
    }
}

fn require_title(title: &str) -> Result<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(MarkdraftError::EmptyTitle);
    }
    Ok(trimmed)
}

fn normalize_style(style: Option<&str>) -> Option<String> {
    style
        .filter(|css| !css.trim().is_empty())
        .map(str::to_string)
}
