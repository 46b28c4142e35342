use super::backend::Persistence;
use crate::error::{MarkdraftError, Result};
use crate::model::StoredDocument;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory storage backend.
///
/// Uses `RefCell` for interior mutability since the session core is
/// single-threaded. This keeps the `Persistence` trait on `&self` for all
/// methods, matching a browser key-value store.
#[derive(Default)]
pub struct MemBackend {
    documents: RefCell<Vec<StoredDocument>>,
    settings: RefCell<HashMap<String, String>>,
    simulate_write_error: Cell<bool>,
    writes: Cell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with an existing collection.
    pub fn with_documents(documents: Vec<StoredDocument>) -> Self {
        let backend = Self::default();
        *backend.documents.borrow_mut() = documents;
        backend
    }

    /// Enable write error simulation (e.g. a storage quota being exceeded).
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful `replace_all` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(MarkdraftError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl Persistence for MemBackend {
    fn get_all(&self) -> Result<Vec<StoredDocument>> {
        Ok(self.documents.borrow().clone())
    }

    fn replace_all(&self, documents: &[StoredDocument]) -> Result<()> {
        self.check_writable()?;
        *self.documents.borrow_mut() = documents.to_vec();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.settings.borrow().get(key).cloned())
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.settings
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_setting(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.settings.borrow_mut().remove(key);
        Ok(())
    }
}

// Shared references delegate, so a test can keep a handle on the backend
// while the store owns it.
impl<P: Persistence + ?Sized> Persistence for &P {
    fn get_all(&self) -> Result<Vec<StoredDocument>> {
        (**self).get_all()
    }

    fn replace_all(&self, documents: &[StoredDocument]) -> Result<()> {
        (**self).replace_all(documents)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        (**self).get_setting(key)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_setting(key, value)
    }

    fn remove_setting(&self, key: &str) -> Result<()> {
        (**self).remove_setting(key)
    }
}
