use crate::error::{MarkdraftError, Result};
use regex::Regex;
use std::ops::Range;

/// A C-style comment, `*` allowed inside.
const COMMENT: &str = r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/";

/// A rule body tolerating one level of nested braces.
const BODY: &str = r"[^{}]*(?:\{[^{}]*\}[^{}]*)*";

/// Where a rule block sits inside a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Leading comment (if any), header and braces.
    pub block: Range<usize>,
    /// Text between the braces.
    pub body: Range<usize>,
}

/// Finds the rule blocks headed by a given selector.
///
/// The patch functions only ever talk to this trait, so the regex matcher can
/// be replaced by a tokenizer-based one without touching them.
pub trait RuleMatcher {
    /// Every block headed exactly by `selector`, in order.
    fn find_all(&self, sheet: &str, selector: &str) -> Result<Vec<RuleMatch>>;

    fn find_first(&self, sheet: &str, selector: &str) -> Result<Option<RuleMatch>> {
        Ok(self.find_all(sheet, selector)?.into_iter().next())
    }
}

/// Best-effort regex block matcher.
///
/// A header must open a line or follow a closing brace, so `p` does not match
/// inside `sup {` or `#doc p {`. Bodies may nest one brace level; deeper
/// nesting is not recognized.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexRuleMatcher;

impl RegexRuleMatcher {
    fn pattern(selector: &str) -> Result<Regex> {
        let pattern = [
            r"(?m)(?:^|\})[ \t]*(?P<block>(?:",
            COMMENT,
            r"\s*)?",
            &regex::escape(selector),
            r"\s*\{(?P<body>",
            BODY,
            r")\})",
        ]
        .concat();
        Regex::new(&pattern).map_err(|_| MarkdraftError::MalformedSelector(selector.to_string()))
    }
}

impl RuleMatcher for RegexRuleMatcher {
    fn find_all(&self, sheet: &str, selector: &str) -> Result<Vec<RuleMatch>> {
        let re = Self::pattern(selector)?;
        let mut matches = Vec::new();
        let mut start = 0;

        // Restart on each closing brace so back-to-back blocks on one line
        // can use it as their leading anchor.
        while start < sheet.len() {
            let Some(caps) = re.captures_at(sheet, start) else {
                break;
            };
            let (Some(block), Some(body)) = (caps.name("block"), caps.name("body")) else {
                break;
            };
            matches.push(RuleMatch {
                block: block.range(),
                body: body.range(),
            });
            start = block.end() - 1;
        }

        Ok(matches)
    }
}
