use super::backend::Persistence;
use crate::error::{MarkdraftError, Result};
use crate::model::StoredDocument;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const DOCUMENTS_FILE: &str = "documents.json";
const SETTINGS_FILE: &str = "settings.json";

/// Directory-backed storage.
///
/// ```text
/// <root>/
/// ├── documents.json   # the whole document collection (JSON array)
/// └── settings.json    # flat string settings (JSON object)
/// ```
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage rooted in the platform data directory
    /// (e.g. `~/.local/share/markdraft` on Linux).
    pub fn in_data_dir() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "markdraft").ok_or_else(|| {
            MarkdraftError::Store("Could not determine a data directory".to_string())
        })?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(MarkdraftError::Io)?;
        }
        Ok(())
    }

    /// Write to a temp file, then rename over the target.
    fn write_atomic(&self, file_name: &str, content: &str) -> Result<()> {
        self.ensure_dir()?;
        let tmp_file = self.root.join(format!(".{}-{}.tmp", file_name, Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(MarkdraftError::Io)?;
        fs::rename(&tmp_file, self.root.join(file_name)).map_err(MarkdraftError::Io)?;
        Ok(())
    }

    fn load_settings(&self) -> Result<BTreeMap<String, String>> {
        let path = self.root.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path).map_err(MarkdraftError::Io)?;
        let settings = serde_json::from_str(&content).map_err(MarkdraftError::Serialization)?;
        Ok(settings)
    }

    fn save_settings(&self, settings: &BTreeMap<String, String>) -> Result<()> {
        let content =
            serde_json::to_string_pretty(settings).map_err(MarkdraftError::Serialization)?;
        self.write_atomic(SETTINGS_FILE, &content)
    }
}

impl Persistence for FsBackend {
    fn get_all(&self) -> Result<Vec<StoredDocument>> {
        let path = self.root.join(DOCUMENTS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(MarkdraftError::Io)?;
        let documents = serde_json::from_str(&content).map_err(MarkdraftError::Serialization)?;
        Ok(documents)
    }

    fn replace_all(&self, documents: &[StoredDocument]) -> Result<()> {
        let content =
            serde_json::to_string_pretty(documents).map_err(MarkdraftError::Serialization)?;
        self.write_atomic(DOCUMENTS_FILE, &content)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_settings()?.remove(key))
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let mut settings = self.load_settings()?;
        settings.insert(key.to_string(), value.to_string());
        self.save_settings(&settings)
    }

    fn remove_setting(&self, key: &str) -> Result<()> {
        let mut settings = self.load_settings()?;
        if settings.remove(key).is_some() {
            self.save_settings(&settings)?;
        }
        Ok(())
    }
}
