//! Export of the active document.
//!
//! Three targets, all built from the session's markdown and stylesheet:
//! - a `.md` file (filename derived from the title, content verbatim),
//! - a standalone HTML document embedding the custom stylesheet,
//! - a print document (HTML with print media rules that opens the print
//!   dialog on load), which is how the editor produces PDFs.
//!
//! Rendered markup is wrapped in the same `#markdown-preview-content
//! .markdown-body` containers as the live preview, so selector-scoped rules
//! from the inspector apply unchanged.

use crate::model::slugify;
use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const NO_CUSTOM_STYLES: &str = "/* No custom styles applied */";

const KATEX_CSS: &str = r#"<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex@0.16.0/dist/katex.min.css" crossorigin="anonymous">"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    fn class(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Typography settings copied into exported documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub font_size: u32,
    pub line_height: f32,
    pub font_family: String,
    pub theme: Theme,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            font_size: 16,
            line_height: 1.5,
            font_family: "inter".to_string(),
            theme: Theme::Light,
        }
    }
}

/// `"My Notes"` becomes `my-notes.md`; a blank title gives `untitled.md`.
pub fn markdown_filename(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "untitled.md".to_string()
    } else {
        format!("{}.md", slug)
    }
}

/// Rewrite `\[ \]` and `\( \)` math delimiters to `$$` and `$`.
pub fn replace_latex_delimiters(text: &str) -> String {
    text.replace("\\[", "$$")
        .replace("\\]", "$$")
        .replace("\\(", "$")
        .replace("\\)", "$")
}

pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let source = replace_latex_delimiters(markdown);
    let parser = Parser::new_ext(&source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// A standalone HTML page for download.
pub fn html_document(title: &str, markdown: &str, style: &str, options: &ExportOptions) -> String {
    let mut styles = root_variables(options);
    styles.push_str(&base_styles(options.theme));
    push_custom_styles(&mut styles, style);

    page(
        &escape_html(title),
        &styles,
        options.theme.class(),
        &render_html(markdown),
        "",
    )
}

/// An HTML page that opens the print dialog once loaded.
pub fn print_document(title: &str, markdown: &str, style: &str, options: &ExportOptions) -> String {
    let mut styles = root_variables(options);
    styles.push_str(PRINT_STYLES);
    push_custom_styles(&mut styles, style);

    let script = "<script>\n  window.onload = function () {\n    setTimeout(function () { window.print(); }, 500);\n  };\n</script>\n";
    page(
        &format!("{} - PDF Export", escape_html(title)),
        &styles,
        options.theme.class(),
        &render_html(markdown),
        script,
    )
}

/// Word and character counts for the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub words: usize,
    pub characters: usize,
}

impl DocumentStats {
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
        }
    }
}

fn root_variables(options: &ExportOptions) -> String {
    format!(
        ":root {{\n  --font-size: {}px;\n  --line-height: {};\n  --font-family: \"{}\";\n}}\n",
        options.font_size,
        options.line_height,
        options.font_family.replace('"', "")
    )
}

fn base_styles(theme: Theme) -> String {
    let (text, background, border, header, code) = match theme {
        Theme::Light => ("#333", "#fff", "#ddd", "#f1f1f1", "#f6f8fa"),
        Theme::Dark => ("#e0e0e0", "#1e1e1e", "#4a4a4a", "#2d2d2d", "#2d2d2d"),
    };
    format!(
        "body {{\n  font-family: var(--font-family), sans-serif;\n  font-size: var(--font-size);\n  line-height: var(--line-height);\n  color: {text};\n  background-color: {background};\n  max-width: 900px;\n  margin: 0 auto;\n  padding: 2rem;\n}}\n\
         pre, code {{\n  background-color: {code};\n  border-radius: 4px;\n}}\n\
         pre {{\n  padding: 1em;\n  overflow-x: auto;\n}}\n\
         table {{\n  border-collapse: collapse;\n  margin: 1em 0;\n}}\n\
         th, td {{\n  border: 1px solid {border};\n  padding: 8px;\n}}\n\
         th {{\n  background-color: {header};\n  text-align: left;\n}}\n"
    )
}

const PRINT_STYLES: &str = "@media print {\n  body {\n    margin: 0;\n    padding: 20px;\n  }\n  h1, h2, h3, h4, h5, h6 {\n    page-break-after: avoid;\n  }\n  pre, blockquote, img, table {\n    page-break-inside: avoid;\n  }\n}\n";

fn push_custom_styles(styles: &mut String, custom: &str) {
    styles.push_str("/* Custom User Styles */\n");
    if custom.trim().is_empty() {
        styles.push_str(NO_CUSTOM_STYLES);
    } else {
        styles.push_str(custom.trim_end());
    }
    styles.push('\n');
}

fn page(title: &str, styles: &str, body_class: &str, content: &str, script: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n{KATEX_CSS}\n<style>\n{styles}</style>\n</head>\n\
         <body class=\"{body_class}\">\n<div id=\"markdown-preview-content\">\n\
         <div class=\"markdown-body\">\n{content}</div>\n</div>\n{script}</body>\n</html>\n"
    );
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
