use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkdraftError {
    #[error("A document titled \"{0}\" already exists")]
    DuplicateTitle(String),

    #[error("Document title cannot be empty")]
    EmptyTitle,

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Malformed selector: {0:?}")]
    MalformedSelector(String),

    #[error("Cannot read the edited rule for {0}")]
    MalformedRule(String),

    #[error("Invalid selection {start}..{end} for content of length {len}")]
    InvalidSelection { start: usize, end: usize, len: usize },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MarkdraftError>;
