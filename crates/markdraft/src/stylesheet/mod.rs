//! # Style Rule Patching
//!
//! Each document carries one customization stylesheet as plain text. The
//! element inspector edits it one rule block at a time:
//!
//! ```text
//! /* optional comment */
//! <selector> {
//!   <properties>
//! }
//! ```
//!
//! [`upsert_rule`] replaces the block headed by a selector (comment included)
//! or appends a new one, [`remove_rule`] drops it, and [`extract_properties`]
//! reads its declarations back. A selector heads at most one block: upserting
//! also drops any later duplicates.
//!
//! Selectors must be single-line and brace-free (the output contract of
//! [`selector::selector_for`]); anything else is [`MalformedSelector`]. Regex
//! metacharacters inside a selector are always matched literally.
//!
//! Matching is regex based (see [`matcher`]) and only understands one level
//! of nested braces inside a body.
//!
//! [`MalformedSelector`]: crate::error::MarkdraftError::MalformedSelector

use crate::error::{MarkdraftError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

pub mod matcher;
pub mod selector;

pub use matcher::{RegexRuleMatcher, RuleMatch, RuleMatcher};

static BLOCK_TEXT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?s)\A\s*(?:/\*(?P<comment>.*?)\*/\s*)?(?P<selector>[^{}]+?)\s*\{(?P<body>[^{}]*(?:\{[^{}]*\}[^{}]*)*)\}\s*\z",
    )
    .ok()
});

/// One rule block: optional comment, selector, and properties text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBlock {
    pub comment: Option<String>,
    pub selector: String,
    pub properties: String,
}

impl RuleBlock {
    pub fn new(selector: impl Into<String>, properties: impl Into<String>) -> Self {
        Self {
            comment: None,
            selector: selector.into(),
            properties: properties.into(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl fmt::Display for RuleBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(comment) = self.comment.as_deref().map(str::trim) {
            // A stray terminator would close the comment early.
            writeln!(f, "/* {} */", comment.replace("*/", "* /"))?;
        }
        let properties = self.properties.trim_matches(|c: char| c == '\n' || c == '\r').trim_end();
        if properties.is_empty() {
            write!(f, "{} {{\n}}", self.selector.trim())
        } else {
            write!(f, "{} {{\n{}\n}}", self.selector.trim(), properties)
        }
    }
}

/// Check a selector against the output contract: non-empty, one line, no
/// braces. Returns it trimmed.
pub fn validate_selector(selector: &str) -> Result<&str> {
    let trimmed = selector.trim();
    if trimmed.is_empty() || trimmed.contains(['{', '}', '\n', '\r']) {
        return Err(MarkdraftError::MalformedSelector(selector.to_string()));
    }
    Ok(trimmed)
}

/// Applies rule patches through a swappable [`RuleMatcher`].
#[derive(Debug, Clone, Default)]
pub struct RulePatcher<M = RegexRuleMatcher> {
    matcher: M,
}

impl<M: RuleMatcher> RulePatcher<M> {
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }

    pub fn upsert_rule(&self, sheet: &str, selector: &str, properties: &str) -> Result<String> {
        self.upsert_block(sheet, &RuleBlock::new(selector, properties))
    }

    pub fn upsert_block(&self, sheet: &str, block: &RuleBlock) -> Result<String> {
        let selector = validate_selector(&block.selector)?;
        let rendered = block.to_string();

        let matches = self.matcher.find_all(sheet, selector)?;
        let Some((first, duplicates)) = matches.split_first() else {
            if sheet.trim().is_empty() {
                return Ok(rendered);
            }
            return Ok(format!("{}\n\n{}", sheet.trim_end(), rendered));
        };

        if duplicates.is_empty() {
            return Ok(splice(sheet, first.block.clone(), &rendered));
        }

        let ranges: Vec<Range<usize>> = duplicates.iter().map(|m| m.block.clone()).collect();
        let deduped = cut(sheet, &ranges);
        match self.matcher.find_first(&deduped, selector)? {
            Some(found) => Ok(splice(&deduped, found.block, &rendered)),
            None => Ok(format!("{}\n\n{}", deduped.trim_end(), rendered)),
        }
    }

    pub fn remove_rule(&self, sheet: &str, selector: &str) -> Result<String> {
        let selector = validate_selector(selector)?;
        let matches = self.matcher.find_all(sheet, selector)?;
        if matches.is_empty() {
            return Ok(sheet.to_string());
        }
        let ranges: Vec<Range<usize>> = matches.into_iter().map(|m| m.block).collect();
        Ok(cut(sheet, &ranges))
    }

    pub fn extract_properties(&self, sheet: &str, selector: &str) -> Result<String> {
        let selector = validate_selector(selector)?;
        let Some(found) = self.matcher.find_first(sheet, selector)? else {
            return Ok(String::new());
        };

        let properties = sheet[found.body]
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("/*") && !line.ends_with("*/"))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(properties)
    }
}

/// Insert-or-replace the block for `selector`, wrapping `properties` verbatim.
pub fn upsert_rule(sheet: &str, selector: &str, properties: &str) -> Result<String> {
    RulePatcher::<RegexRuleMatcher>::default().upsert_rule(sheet, selector, properties)
}

/// Insert-or-replace `block`, keeping its comment.
pub fn upsert_block(sheet: &str, block: &RuleBlock) -> Result<String> {
    RulePatcher::<RegexRuleMatcher>::default().upsert_block(sheet, block)
}

/// Remove the block for `selector` and its leading comment. A sheet without
/// such a block comes back unchanged.
pub fn remove_rule(sheet: &str, selector: &str) -> Result<String> {
    RulePatcher::<RegexRuleMatcher>::default().remove_rule(sheet, selector)
}

/// Declarations of the block for `selector`, one per line, or "" if none.
pub fn extract_properties(sheet: &str, selector: &str) -> Result<String> {
    RulePatcher::<RegexRuleMatcher>::default().extract_properties(sheet, selector)
}

/// Reformat declarations one per line with a two-space indent. Semicolons
/// inside quotes or parentheses (e.g. data URLs) do not split.
pub fn normalize_properties(text: &str) -> String {
    let mut lines = Vec::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if line.starts_with("/*") {
            lines.push(format!("  {}", line));
            continue;
        }
        for declaration in split_declarations(line) {
            lines.push(format!("  {};", declaration));
        }
    }
    lines.join("\n")
}

/// Read a hand-edited block (as produced by [`editor_template`]) back into a
/// [`RuleBlock`]. The body is kept as typed.
pub fn parse_block(text: &str) -> Option<RuleBlock> {
    let caps = BLOCK_TEXT.as_ref()?.captures(text)?;
    let selector = validate_selector(caps.name("selector")?.as_str()).ok()?;
    let body = caps.name("body")?.as_str();

    Some(RuleBlock {
        comment: caps
            .name("comment")
            .map(|c| c.as_str().trim().to_string())
            .filter(|c| !c.is_empty()),
        selector: selector.to_string(),
        properties: body
            .trim_start_matches(|c: char| c == '\n' || c == '\r')
            .trim_end()
            .to_string(),
    })
}

/// Starting text for the inspector's editor: the existing declarations for
/// `selector` if any, otherwise a commented skeleton.
pub fn editor_template(selector: &str, existing: &str) -> String {
    if existing.trim().is_empty() {
        let properties = [
            "  /* Add declarations for this element, e.g. */",
            "  /* color: #333 !important; */",
            "  /* padding: 1rem !important; */",
        ]
        .join("\n");
        return RuleBlock::new(selector, properties)
            .with_comment("Custom styles for selected element")
            .to_string();
    }

    let properties = existing
        .lines()
        .map(|line| format!("  {}", line.trim()))
        .collect::<Vec<_>>()
        .join("\n");
    RuleBlock::new(selector, properties)
        .with_comment("Existing styles for this element - edit to update")
        .to_string()
}

fn splice(sheet: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(sheet.len() + replacement.len());
    out.push_str(&sheet[..range.start]);
    out.push_str(replacement);
    out.push_str(&sheet[range.end..]);
    out
}

/// Remove `ranges` (sorted, disjoint) and rejoin the remaining pieces with a
/// single blank line between them.
fn cut(sheet: &str, ranges: &[Range<usize>]) -> String {
    let mut pieces = Vec::with_capacity(ranges.len() + 1);
    let mut cursor = 0;
    for range in ranges {
        pieces.push(&sheet[cursor..range.start]);
        cursor = range.end;
    }
    pieces.push(&sheet[cursor..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn split_declarations(line: &str) -> Vec<String> {
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match (c, quote) {
            (q, Some(open)) if q == open => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            ('(', None) => depth += 1,
            (')', None) => depth = depth.saturating_sub(1),
            (';', None) if depth == 0 => {
                declarations.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    declarations.push(current);

    declarations
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_existing_block() {
        let sheet = "sel1 { color: red; }";
        let updated = upsert_rule(sheet, "sel1", "color: blue;").unwrap();

        assert_eq!(updated.matches("sel1").count(), 1);
        assert!(updated.contains("blue"));
        assert!(!updated.contains("red"));
    }

    #[test]
    fn upsert_twice_keeps_single_block() {
        let sheet = "h1 { margin: 0; }";
        let once = upsert_rule(sheet, "p", "  color: red;").unwrap();
        let twice = upsert_rule(&once, "p", "  color: green;").unwrap();

        assert_eq!(twice, "h1 { margin: 0; }\n\np {\n  color: green;\n}");
    }

    #[test]
    fn upsert_appends_to_empty_sheet() {
        assert_eq!(
            upsert_rule("", "h1", "  color: red;").unwrap(),
            "h1 {\n  color: red;\n}"
        );
    }

    #[test]
    fn upsert_replaces_comment_too() {
        let sheet = "/* old note */\nh1 {\n  color: red;\n}\n\np { margin: 0; }";
        let block = RuleBlock::new("h1", "  color: blue;").with_comment("AI Generated: calmer");
        let updated = upsert_block(sheet, &block).unwrap();

        assert_eq!(
            updated,
            "/* AI Generated: calmer */\nh1 {\n  color: blue;\n}\n\np { margin: 0; }"
        );
    }

    #[test]
    fn upsert_drops_later_duplicates() {
        let sheet = "h1 { a: 1; }\n\np { b: 2; }\n\nh1 { a: 3; }";
        let updated = upsert_rule(sheet, "h1", "  a: 9;").unwrap();
        assert_eq!(updated, "h1 {\n  a: 9;\n}\n\np { b: 2; }");
    }

    #[test]
    fn upsert_keeps_properties_verbatim() {
        let updated = upsert_rule("", "h1", "color:red;   margin:0").unwrap();
        assert_eq!(updated, "h1 {\ncolor:red;   margin:0\n}");
    }

    #[test]
    fn upsert_with_metacharacter_selector() {
        let selector = "#markdown-preview-content .markdown-body p:nth-of-type(2)";
        let sheet = format!(
            "{} {{ color: red; }}\n\n#markdown-preview-content .markdown-body p {{ color: gray; }}",
            selector
        );
        let updated = upsert_rule(&sheet, selector, "  color: blue;").unwrap();

        assert_eq!(updated.matches("nth-of-type(2)").count(), 1);
        assert!(updated.contains("color: gray;"));
        assert!(!updated.contains("color: red;"));
    }

    #[test]
    fn remove_missing_selector_is_byte_identical() {
        let sheet = "  h1 { color: red; }\n\n\n";
        assert_eq!(remove_rule(sheet, "h2").unwrap(), sheet);
    }

    #[test]
    fn remove_takes_comment_and_collapses_gap() {
        let sheet = "h1 { a: 1; }\n\n/* note */\np {\n  b: 2;\n}\n\n\nh2 { c: 3; }\n";
        assert_eq!(
            remove_rule(sheet, "p").unwrap(),
            "h1 { a: 1; }\n\nh2 { c: 3; }"
        );
    }

    #[test]
    fn remove_last_block_leaves_empty_sheet() {
        assert_eq!(remove_rule("/* x */\nh1 { a: 1; }\n", "h1").unwrap(), "");
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        for bad in ["", "  ", "h1 {", "a}b", "h1,\nh2"] {
            assert!(matches!(
                upsert_rule("", bad, "color: red;"),
                Err(MarkdraftError::MalformedSelector(_))
            ));
        }
    }

    #[test]
    fn extract_reads_declarations() {
        let sheet = "/* c */\nh1 {\n  /* hint */\n  color: red;\n\n  margin: 0;\n}";
        assert_eq!(extract_properties(sheet, "h1").unwrap(), "color: red;\nmargin: 0;");
        assert_eq!(extract_properties(sheet, "h2").unwrap(), "");
        assert_eq!(
            extract_properties("sel1 { color: red; }", "sel1").unwrap(),
            "color: red;"
        );
    }

    #[test]
    fn normalize_splits_declarations() {
        let text = "color: red; margin: 0\nbackground: url(\"data:image/png;base64,AAA\");";
        assert_eq!(
            normalize_properties(text),
            "  color: red;\n  margin: 0;\n  background: url(\"data:image/png;base64,AAA\");"
        );
    }

    #[test]
    fn parse_block_reads_hand_edit() {
        let text = "/* Existing styles */\nh1.title {\n  color: red;\n    margin: 0;\n}\n";
        let block = parse_block(text).unwrap();

        assert_eq!(block.comment.as_deref(), Some("Existing styles"));
        assert_eq!(block.selector, "h1.title");
        assert_eq!(block.properties, "  color: red;\n    margin: 0;");
    }

    #[test]
    fn parse_block_without_comment() {
        let block = parse_block("p { color: red; }").unwrap();
        assert_eq!(block.comment, None);
        assert_eq!(block.selector, "p");
        assert!(parse_block("not a block").is_none());
    }

    #[test]
    fn template_roundtrips_through_parse() {
        let existing = "color: red;\nmargin: 0;";
        let template = editor_template("h1", existing);
        let block = parse_block(&template).unwrap();

        assert_eq!(block.selector, "h1");
        assert_eq!(block.properties, "  color: red;\n  margin: 0;");

        let blank = editor_template("h1", "");
        assert!(blank.starts_with("/* Custom styles for selected element */\nh1 {"));
    }

    #[test]
    fn swapped_matcher_is_used() {
        struct NeverMatches;
        impl RuleMatcher for NeverMatches {
            fn find_all(&self, _sheet: &str, _selector: &str) -> Result<Vec<RuleMatch>> {
                Ok(Vec::new())
            }
        }

        let patcher = RulePatcher::new(NeverMatches);
        let updated = patcher.upsert_rule("h1 { a: 1; }", "h1", "  a: 2;").unwrap();
        assert_eq!(updated, "h1 { a: 1; }\n\nh1 {\n  a: 2;\n}");
    }
}
