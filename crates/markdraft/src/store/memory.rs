use super::doc_store::DocumentStore;
use super::mem_backend::MemBackend;

pub type InMemoryStore = DocumentStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        // An empty MemBackend cannot fail to load.
        DocumentStore {
            backend: MemBackend::new(),
            documents: Vec::new(),
            last_stamp: 0,
        }
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_documents(mut self, count: usize) -> Self {
            for i in 0..count {
                let title = format!("Test Document {}", i + 1);
                let content = format!("# Content for document {}", i + 1);
                self.store.save(&title, &content, None).unwrap();
            }
            self
        }

        pub fn with_document(mut self, title: &str, content: &str) -> Self {
            self.store.save(title, content, None).unwrap();
            self
        }

        pub fn with_styled_document(mut self, title: &str, content: &str, style: &str) -> Self {
            self.store.save(title, content, Some(style)).unwrap();
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;

    #[test]
    fn fixture_builds_documents() {
        let fixture = StoreFixture::new()
            .with_documents(2)
            .with_styled_document("Styled", "body", "h1 { color: red; }");

        let docs = fixture.store.list();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].title, "Test Document 1");
        assert_eq!(docs[2].style.as_deref(), Some("h1 { color: red; }"));
    }
}
