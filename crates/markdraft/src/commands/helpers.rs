use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthChar;

/// Display width prompts are cut to inside notifications.
pub const PROMPT_DISPLAY_WIDTH: usize = 30;

/// Cut `s` to at most `max_width` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

/// Prompt text as shown in a notification: one line, width-limited.
pub fn prompt_excerpt(prompt: &str) -> String {
    let single_line = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_to_width(&single_line, PROMPT_DISPLAY_WIDTH)
}

/// "3 minutes ago"-style age of `timestamp` relative to `now`.
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    timeago::Formatter::new().convert(duration.to_std().unwrap_or_default())
}
