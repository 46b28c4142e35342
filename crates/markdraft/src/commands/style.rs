//! Inspector edits to the active stylesheet.
//!
//! Every function patches [`Session::style`] through the rule patch engine
//! and reports what happened. Persisting is left to the save commands; the
//! session simply turns dirty.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{MarkdraftError, Result};
use crate::session::Session;
use crate::stylesheet::{
    editor_template, extract_properties, parse_block, remove_rule, upsert_block, upsert_rule,
    validate_selector, RuleBlock,
};

/// Insert or replace the block for `selector`.
pub fn apply_rule(session: &mut Session, selector: &str, properties: &str) -> Result<CmdResult> {
    let updated = upsert_rule(session.style(), selector, properties)?;
    session.set_style(updated);
    Ok(CmdResult::default().with_message(CmdMessage::success("Styles applied")))
}

/// Insert or replace a complete block, comment included.
pub fn apply_block(session: &mut Session, block: &RuleBlock) -> Result<CmdResult> {
    let updated = upsert_block(session.style(), block)?;
    session.set_style(updated);
    Ok(CmdResult::default().with_message(CmdMessage::success("Styles applied")))
}

/// Apply the text of the inspector's editor for `selector`.
///
/// The editor holds a whole block (see [`style_template`]); if it no longer
/// parses, its content is used as the property list. The block's own header
/// is ignored: the edit always lands on `selector`.
pub fn apply_edit(session: &mut Session, selector: &str, edited: &str) -> Result<CmdResult> {
    let selector = validate_selector(selector)?;
    let block = match parse_block(edited) {
        Some(parsed) => RuleBlock {
            selector: selector.to_string(),
            ..parsed
        },
        None if !edited.contains(['{', '}']) => RuleBlock::new(selector, edited.trim_end()),
        None => return Err(MarkdraftError::MalformedRule(selector.to_string())),
    };
    apply_block(session, &block)
}

/// Remove the block for `selector`.
pub fn clear_rule(session: &mut Session, selector: &str) -> Result<CmdResult> {
    let updated = remove_rule(session.style(), selector)?;
    if updated == session.style() {
        return Ok(CmdResult::default().with_message(CmdMessage::info(
            "No custom styles for this element",
        )));
    }
    session.set_style(updated);
    Ok(CmdResult::default().with_message(CmdMessage::success("Element styles cleared")))
}

/// Drop the whole stylesheet.
pub fn clear_all(session: &mut Session) -> CmdResult {
    if session.style().trim().is_empty() {
        return CmdResult::default().with_message(CmdMessage::info("No custom styles to clear"));
    }
    session.set_style(String::new());
    CmdResult::default().with_message(CmdMessage::success("All custom styles cleared"))
}

/// Starting text for the inspector's editor for `selector`.
pub fn style_template(session: &Session, selector: &str) -> Result<String> {
    let selector = validate_selector(selector)?;
    let existing = extract_properties(session.style(), selector)?;
    Ok(editor_template(selector, &existing))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEL: &str = "#markdown-preview-content .markdown-body h1";

    #[test]
    fn apply_then_clear() {
        let mut session = Session::default();
        apply_rule(&mut session, SEL, "  color: red;").unwrap();
        assert_eq!(session.style(), format!("{} {{\n  color: red;\n}}", SEL));

        let result = clear_rule(&mut session, SEL).unwrap();
        assert_eq!(session.style(), "");
        assert_eq!(result.messages[0].content, "Element styles cleared");
    }

    #[test]
    fn clearing_missing_rule_reports_info() {
        let mut session = Session::default();
        session.set_style("p { margin: 0; }");

        let result = clear_rule(&mut session, SEL).unwrap();
        assert_eq!(session.style(), "p { margin: 0; }");
        assert_eq!(result.messages[0].level, crate::commands::MessageLevel::Info);
    }

    #[test]
    fn edit_roundtrip_through_template() {
        let mut session = Session::default();
        apply_rule(&mut session, SEL, "  color: red;").unwrap();

        let template = style_template(&session, SEL).unwrap();
        let edited = template.replace("red", "blue");
        apply_edit(&mut session, SEL, &edited).unwrap();

        assert_eq!(extract_properties(session.style(), SEL).unwrap(), "color: blue;");
        assert_eq!(session.style().matches(SEL).count(), 1);
    }

    #[test]
    fn edit_with_bare_properties() {
        let mut session = Session::default();
        apply_edit(&mut session, SEL, "  margin: 0;\n").unwrap();
        assert_eq!(session.style(), format!("{} {{\n  margin: 0;\n}}", SEL));
    }

    #[test]
    fn broken_edit_is_rejected() {
        let mut session = Session::default();
        let err = apply_edit(&mut session, SEL, "h1 { color: red;").unwrap_err();
        assert!(matches!(err, MarkdraftError::MalformedRule(ref selector) if selector == SEL));
        assert_eq!(session.style(), "");
    }

    #[test]
    fn clear_all_empties_style() {
        let mut session = Session::default();
        session.set_style("h1 { color: red; }");
        clear_all(&mut session);
        assert_eq!(session.style(), "");
        assert_eq!(
            clear_all(&mut session).messages[0].content,
            "No custom styles to clear"
        );
    }
}
