use thiserror::Error;

/// Failure modes of a chunking call. A call that fails emits no chunks.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed document; the caller has to fix the input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The strategy needs section markers the document does not carry.
    #[error("Missing structure: {0}")]
    MissingStructure(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An injected embedder or scorer returned an error.
    #[error("Collaborator failed: {0}")]
    Collaborator(String),
}

pub type Result<T> = std::result::Result<T, Error>;
