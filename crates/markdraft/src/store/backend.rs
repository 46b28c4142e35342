use crate::error::Result;
use crate::model::StoredDocument;

/// Abstract interface for raw storage I/O.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`DocumentStore`](super::DocumentStore) handles the "what" (titles,
/// ids, rename and delete rules). The document collection is always read and
/// written as a whole.
pub trait Persistence {
    // --- Document collection ---

    /// Load every stored document, in insertion order.
    fn get_all(&self) -> Result<Vec<StoredDocument>>;

    /// Replace the whole stored collection.
    /// MUST be atomic so a failed write never leaves a partial collection.
    fn replace_all(&self, documents: &[StoredDocument]) -> Result<()>;

    // --- Settings ---

    /// Read a setting. Returns Ok(None) when the key was never written.
    fn get_setting(&self, key: &str) -> Result<Option<String>>;

    fn set_setting(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a setting. Removing a missing key is not an error.
    fn remove_setting(&self, key: &str) -> Result<()>;
}
