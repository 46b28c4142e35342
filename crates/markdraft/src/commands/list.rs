use crate::commands::helpers::format_age;
use crate::commands::CmdResult;
use crate::model::StoredDocument;
use crate::store::{DocumentStore, Persistence};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Title,
    #[default]
    Date,
    Size,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    /// Case-insensitive substring match on title or content.
    pub search: Option<String>,
    pub sort: SortKey,
    pub descending: bool,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        // Newest first.
        Self {
            search: None,
            sort: SortKey::Date,
            descending: true,
        }
    }
}

/// One row of the saved-documents panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub size: usize,
    pub age: String,
}

impl DocumentSummary {
    fn of(doc: &StoredDocument, now: DateTime<Utc>) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            timestamp: doc.timestamp,
            size: doc.size(),
            age: format_age(doc.timestamp, now),
        }
    }
}

pub fn run<B: Persistence>(store: &DocumentStore<B>, filter: &DocumentFilter) -> CmdResult {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);

    let mut docs: Vec<&StoredDocument> = store
        .list()
        .iter()
        .filter(|doc| match &needle {
            Some(term) => {
                doc.title.to_lowercase().contains(term) || doc.content.to_lowercase().contains(term)
            }
            None => true,
        })
        .collect();

    // Stable sort: ties keep insertion order.
    match filter.sort {
        SortKey::Title => docs.sort_by_key(|doc| doc.title.to_lowercase()),
        SortKey::Date => docs.sort_by_key(|doc| doc.timestamp),
        SortKey::Size => docs.sort_by_key(|doc| doc.size()),
    }
    if filter.descending {
        docs.reverse();
    }

    let now = Utc::now();
    let listed = docs
        .into_iter()
        .map(|doc| DocumentSummary::of(doc, now))
        .collect();
    CmdResult::default().with_listed_documents(listed)
}
