//! # Configuration
//!
//! Markdraft configuration is a [`confique`] struct loaded in layers:
//!
//! 1. **Environment variables**: `MARKDRAFT_API_KEY`, `MARKDRAFT_MODEL`.
//! 2. **Config file**: `markdraft.toml` in the directory passed to [`MarkdraftConfig::load`].
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `autosave_debounce_ms` | `500` | Quiet period before a draft is written |
//! | `default_title` | `New Document` | Title shown for a fresh, unsaved session |
//! | `api_key` | none | Generation API key; the stored setting wins over it |
//! | `model` | `gemini-2.0-flash` | Generation model name |
//! | `endpoint` | `https://generativelanguage.googleapis.com/v1beta` | Generation API base URL |
//! | `temperature` | `0.7` | Sampling temperature |
//! | `welcome_template` | built-in | Markdown a fresh session starts with |

use crate::error::{MarkdraftError, Result};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE: &str = "markdraft.toml";

/// Content of a fresh session when no `welcome_template` is configured.
pub const WELCOME_TEMPLATE: &str = r#"# Welcome to Markdraft

Write **markdown** on the left and watch it render on the right.

## Lists

- Item one
- Item two
  - Nested item

1. First
2. Second

## Code

Inline `code` and fenced blocks:

```rust
fn main() {
    println!("Hello, world!");
}
```

## Tables

| Column A | Column B |
|----------|----------|
| one      | two      |

## Math

Inline $E = mc^2$ and display:

$$
\sum_{k=1}^{n} k = \frac{n(n+1)}{2}
$$

> Pick any element in the preview to restyle it.
"#;

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MarkdraftConfig {
    /// Milliseconds of inactivity before the working draft is saved.
    #[config(default = 500)]
    pub autosave_debounce_ms: u64,

    #[config(default = "New Document")]
    pub default_title: String,

    #[config(env = "MARKDRAFT_API_KEY")]
    pub api_key: Option<String>,

    #[config(default = "gemini-2.0-flash", env = "MARKDRAFT_MODEL")]
    pub model: String,

    #[config(default = "https://generativelanguage.googleapis.com/v1beta")]
    pub endpoint: String,

    #[config(default = 0.7)]
    pub temperature: f32,

    /// Replaces [`WELCOME_TEMPLATE`] when set.
    pub welcome_template: Option<String>,
}

impl Default for MarkdraftConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 500,
            default_title: "New Document".to_string(),
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.7,
            welcome_template: None,
        }
    }
}

impl MarkdraftConfig {
    /// Load from the environment and `dir/markdraft.toml` (optional).
    pub fn load(dir: &Path) -> Result<Self> {
        Self::builder()
            .env()
            .file(dir.join(CONFIG_FILE))
            .load()
            .map_err(|err| MarkdraftError::Config(err.to_string()))
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn welcome_template(&self) -> &str {
        self.welcome_template
            .as_deref()
            .filter(|template| !template.trim().is_empty())
            .unwrap_or(WELCOME_TEMPLATE)
    }

    /// The configured API key, if non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = MarkdraftConfig::default();
        assert_eq!(config.autosave_delay(), Duration::from_millis(500));
        assert_eq!(config.default_title, "New Document");
        assert_eq!(config.welcome_template(), WELCOME_TEMPLATE);
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_blank_overrides_fall_back() {
        let config = MarkdraftConfig {
            api_key: Some("  ".to_string()),
            welcome_template: Some("\n".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_key(), None);
        assert_eq!(config.welcome_template(), WELCOME_TEMPLATE);
    }

    #[test]
    fn test_load_reads_toml_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "autosave_debounce_ms = 1200\ndefault_title = \"Scratch\"\nwelcome_template = \"# Hi\"\n",
        )
        .unwrap();

        let config = MarkdraftConfig::load(dir.path()).unwrap();
        assert_eq!(config.autosave_debounce_ms, 1200);
        assert_eq!(config.default_title, "Scratch");
        assert_eq!(config.welcome_template(), "# Hi");
        assert_eq!(config.endpoint, MarkdraftConfig::default().endpoint);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "autosave_debounce_ms = \"soon\"").unwrap();

        assert!(matches!(
            MarkdraftConfig::load(dir.path()),
            Err(MarkdraftError::Config(_))
        ));
    }
}
