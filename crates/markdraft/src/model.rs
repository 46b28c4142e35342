use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when a document is exported or listed without one.
pub const UNTITLED: &str = "Untitled Document";

/// A saved document.
///
/// Field names on the wire match the browser storage format the editor has
/// always used (`customCSS`, `date`), so existing collections load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(
        rename = "customCSS",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub style: Option<String>,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl StoredDocument {
    pub fn new(
        id: String,
        title: String,
        content: String,
        style: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            content,
            style,
            timestamp,
        }
    }

    /// The stylesheet text, with an absent style read as empty.
    pub fn style_text(&self) -> &str {
        self.style.as_deref().unwrap_or("")
    }

    /// Size in bytes of the content plus stylesheet, used for listing order.
    pub fn size(&self) -> usize {
        self.content.len() + self.style_text().len()
    }
}

/// One snapshot in the session's version sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Free-text tag, e.g. the prompt behind an AI rewrite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl VersionEntry {
    pub fn new(content: String, annotation: Option<String>) -> Self {
        Self {
            content,
            timestamp: Utc::now(),
            annotation,
        }
    }
}

/// Lowercases a title and collapses every whitespace run into a single `-`.
pub fn slugify(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Builds a document id from its title and a millisecond stamp.
pub fn document_id(title: &str, stamp_ms: i64) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("doc-{}", stamp_ms)
    } else {
        format!("{}-{}", slug, stamp_ms)
    }
}

/// Case-insensitive title comparison, ignoring surrounding whitespace.
pub fn titles_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_whitespace() {
        assert_eq!(slugify("  My   Big\tNotes "), "my-big-notes");
    }

    #[test]
    fn id_falls_back_for_blank_titles() {
        assert_eq!(document_id("   ", 42), "doc-42");
        assert_eq!(document_id("Daily Log", 42), "daily-log-42");
    }

    #[test]
    fn titles_compare_case_insensitively() {
        assert!(titles_match("Existing Title", " existing title"));
        assert!(!titles_match("Existing", "Existing Title"));
    }

    #[test]
    fn document_uses_storage_field_names() {
        let doc = StoredDocument::new(
            "a-1".into(),
            "A".into(),
            "# A".into(),
            Some("p { color: red; }".into()),
            Utc::now(),
        );
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("customCSS").is_some());
        assert!(json.get("date").is_some());
        assert!(json.get("style").is_none());
    }

    #[test]
    fn document_without_style_loads() {
        let json = r##"{"id":"x-1","title":"X","content":"hi","date":"2024-05-01T10:00:00Z"}"##;
        let doc: StoredDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.style, None);
        assert_eq!(doc.style_text(), "");
    }
}
