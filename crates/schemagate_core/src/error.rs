use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Schema fetch failed: {0}")]
    FetchFailed(String),

    #[error("Sample fetch failed: {0}")]
    SampleFailed(String),

    #[error("Selection save failed: {0}")]
    PersistFailed(String),

    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("Invalid selection payload: {0}")]
    InvalidSelection(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
