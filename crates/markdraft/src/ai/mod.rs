//! # AI Generation Boundary
//!
//! Text rewrites and style generation are delegated to a [`Generator`]. The
//! call is the only suspension point in the crate, so the edit flow is split
//! in two halves around it:
//!
//! 1. [`EditRequest::capture`] snapshots the selection (offsets + text) and
//!    the prompt before the call.
//! 2. After the call resolves, [`EditRequest::merge`] is applied to the
//!    *live* content. If the live text still holds the captured selection at
//!    the captured offsets the result is spliced in; otherwise it is appended
//!    and the caller is told so it can notify the user.
//!
//! Nothing here touches the session or history. A failed call is a
//! [`MarkdraftError::Generation`] and leaves all state as it was.
//!
//! [`MarkdraftError::Generation`]: crate::error::MarkdraftError::Generation

use crate::error::{MarkdraftError, Result};
use crate::stylesheet::selector::{describe, selector_for, ElementDescriptor};
use crate::stylesheet::{normalize_properties, RuleBlock};
use async_trait::async_trait;
use std::ops::Range;
use tracing::{debug, warn};

pub mod gemini;

pub use gemini::GeminiClient;

/// Produces markdown text and CSS declarations from natural-language prompts.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Rewrite or generate markdown. `context` is the selected text, or the
    /// whole document when nothing is selected.
    async fn generate_text(&self, prompt: &str, context: &str) -> Result<String>;

    /// CSS declarations (no selector, no braces) for the described element.
    async fn generate_style_properties(
        &self,
        prompt: &str,
        element_description: &str,
    ) -> Result<String>;
}

/// Drop a leading fence line (```` ```markdown ````, ```` ```css ````, ...)
/// and a trailing fence from model output.
pub fn strip_code_fences(text: &str) -> String {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => "",
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim().to_string()
}

/// Prompt for a markdown rewrite of `context`.
pub fn text_prompt(prompt: &str, context: &str) -> String {
    format!(
        "You are a writing assistant working on a markdown document.\n\
         Instruction: {prompt}\n\n\
         Apply the instruction to the following markdown and reply with the \
         resulting markdown only, without explanations or code fences.\n\n\
         {context}"
    )
}

/// Prompt for CSS declarations targeting one previewed element.
pub fn style_prompt(prompt: &str, element_description: &str) -> String {
    format!(
        "You are a CSS assistant styling a rendered markdown preview.\n\
         {element_description}\n\n\
         Request: {prompt}\n\n\
         Reply with CSS declarations only, one per line, each ending in \
         `!important;`. Do not include a selector, braces, comments or code \
         fences."
    )
}

/// Immutable snapshot of an AI edit, taken before the generator is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    snapshot: String,
    range: Range<usize>,
    selection: String,
    context: String,
    prompt: String,
}

/// Outcome of merging generated text into the live content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merge {
    /// The selection was still in place and has been replaced.
    Spliced(String),
    /// The content moved on during the call; the text was appended instead.
    Appended(String),
}

impl Merge {
    pub fn content(&self) -> &str {
        match self {
            Merge::Spliced(content) | Merge::Appended(content) => content,
        }
    }

    pub fn into_content(self) -> String {
        match self {
            Merge::Spliced(content) | Merge::Appended(content) => content,
        }
    }
}

impl EditRequest {
    /// Snapshot `content[range]` and `prompt`.
    ///
    /// An empty range means "no selection": the whole document becomes the
    /// generation context and the result is inserted at `range.start`.
    pub fn capture(content: &str, range: Range<usize>, prompt: impl Into<String>) -> Result<Self> {
        let invalid = || MarkdraftError::InvalidSelection {
            start: range.start,
            end: range.end,
            len: content.len(),
        };
        if range.start > range.end || range.end > content.len() {
            return Err(invalid());
        }
        if !content.is_char_boundary(range.start) || !content.is_char_boundary(range.end) {
            return Err(invalid());
        }

        let selection = content[range.clone()].to_string();
        let context = if selection.is_empty() {
            content.to_string()
        } else {
            selection.clone()
        };
        Ok(Self {
            snapshot: content.to_string(),
            range,
            selection,
            context,
            prompt: prompt.into(),
        })
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn selected_text(&self) -> &str {
        &self.selection
    }

    /// Text handed to the generator.
    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Merge `generated` into `live`, the content as it is *now*.
    ///
    /// The result is spliced at the captured range only while `live` is
    /// identical to the snapshot; any other edit, even one outside the
    /// selection, shifts the offsets and the result is appended.
    pub fn merge(&self, live: &str, generated: &str) -> Merge {
        if live == self.snapshot {
            let mut merged = String::with_capacity(live.len() + generated.len());
            merged.push_str(&live[..self.range.start]);
            merged.push_str(generated);
            merged.push_str(&live[self.range.end..]);
            return Merge::Spliced(merged);
        }

        warn!(
            start = self.range.start,
            end = self.range.end,
            "selection changed during generation, appending result"
        );
        if live.trim().is_empty() {
            Merge::Appended(generated.to_string())
        } else {
            Merge::Appended(format!("{}\n\n{}", live.trim_end(), generated))
        }
    }
}

/// Run the text generator for `request`. Returns the fence-stripped result.
pub async fn generate_edit<G: Generator + ?Sized>(
    generator: &G,
    request: &EditRequest,
) -> Result<String> {
    debug!(
        prompt_len = request.prompt().len(),
        context_len = request.context().len(),
        "requesting text generation"
    );
    let raw = generator
        .generate_text(request.prompt(), request.context())
        .await?;

    let text = strip_code_fences(&raw);
    if text.is_empty() {
        return Err(MarkdraftError::Generation("empty response".to_string()));
    }
    Ok(text)
}

/// Generate a rule block for `element`, tagged with the prompt that made it.
pub async fn generate_rule<G: Generator + ?Sized>(
    generator: &G,
    prompt: &str,
    element: &ElementDescriptor,
) -> Result<RuleBlock> {
    let selector = selector_for(element);
    let description = describe(element, &selector);
    debug!(%selector, "requesting style generation");

    let raw = generator
        .generate_style_properties(prompt, &description)
        .await?;
    let properties = normalize_properties(&strip_code_fences(&raw));
    if properties.is_empty() {
        return Err(MarkdraftError::Generation(
            "response contained no declarations".to_string(),
        ));
    }

    Ok(RuleBlock::new(selector, properties).with_comment(format!("AI Generated: {}", prompt.trim())))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Generator returning canned replies and recording what it was asked.
    #[derive(Default)]
    pub struct FakeGenerator {
        pub reply: Option<String>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeGenerator {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self::default()
        }

        fn answer(&self, prompt: &str, context: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), context.to_string()));
            self.reply
                .clone()
                .ok_or_else(|| MarkdraftError::Generation("service unavailable".to_string()))
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate_text(&self, prompt: &str, context: &str) -> Result<String> {
            self.answer(prompt, context)
        }

        async fn generate_style_properties(
            &self,
            prompt: &str,
            element_description: &str,
        ) -> Result<String> {
            self.answer(prompt, element_description)
        }
    }
}
