//! Target selectors for elements picked in the preview.
//!
//! The host inspects the DOM and fills an [`ElementDescriptor`]; this module
//! turns it into the selector every style operation (apply, clear, generate)
//! uses, so all three always address the same rule block.

use std::fmt::Write;

/// Root every generated selector is scoped under.
pub const PREVIEW_SCOPE: &str = "#markdown-preview-content .markdown-body";

/// Class-name prefix the inspector uses for its own highlight classes.
const INSPECTOR_CLASS_PREFIX: &str = "css-inspector";

const TEXT_EXCERPT_CHARS: usize = 100;

/// What the host knows about a picked preview element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDescriptor {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// 1-based position among siblings with the same tag.
    pub position: usize,
    /// Number of siblings sharing the tag, the element included.
    pub same_tag_siblings: usize,
    pub text: String,
}

impl ElementDescriptor {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            position: 1,
            same_tag_siblings: 1,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_position(mut self, position: usize, same_tag_siblings: usize) -> Self {
        self.position = position;
        self.same_tag_siblings = same_tag_siblings;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    fn tag_name(&self) -> String {
        self.tag.trim().to_lowercase()
    }

    /// Author classes, without the inspector's highlight classes.
    fn user_classes(&self) -> Vec<&str> {
        self.classes
            .iter()
            .map(|class| class.trim())
            .filter(|class| !class.is_empty() && !class.starts_with(INSPECTOR_CLASS_PREFIX))
            .collect()
    }

    fn element_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// The canonical selector for `element`.
///
/// An id wins over classes, classes over the bare tag; `:nth-of-type` is
/// appended whenever the element shares its tag with siblings.
pub fn selector_for(element: &ElementDescriptor) -> String {
    let tag = element.tag_name();
    let classes = element.user_classes();

    let mut selector = match element.element_id() {
        Some(id) => format!("{} #{}", PREVIEW_SCOPE, id),
        None if !classes.is_empty() => {
            format!("{} {}.{}", PREVIEW_SCOPE, tag, classes.join("."))
        }
        None => format!("{} {}", PREVIEW_SCOPE, tag),
    };

    if element.same_tag_siblings > 1 {
        let _ = write!(selector, ":nth-of-type({})", element.position.max(1));
    }
    selector
}

/// Plain-text description of `element` handed to the style generator.
pub fn describe(element: &ElementDescriptor, selector: &str) -> String {
    let tag = element.tag_name();
    let id = element
        .element_id()
        .map(|id| format!("#{}", id))
        .unwrap_or_default();
    let classes = element.user_classes();
    let classes = if classes.is_empty() {
        "none".to_string()
    } else {
        classes.join(", ")
    };

    let text = element.text.trim();
    let excerpt: String = text.chars().take(TEXT_EXCERPT_CHARS).collect();
    let ellipsis = if text.chars().count() > TEXT_EXCERPT_CHARS {
        "..."
    } else {
        ""
    };

    format!(
        "Target element: {tag}{id}\n\
         Exact CSS selector: {selector}\n\
         Classes: {classes}\n\
         Text content: \"{excerpt}{ellipsis}\"\n\
         Scope: only this element, not every {tag} element"
    )
}
