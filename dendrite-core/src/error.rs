//! Error types for the Dendrite engine.

/// Result type alias for Dendrite operations.
pub type Result<T> = std::result::Result<T, DendriteError>;

/// Main error type for the Dendrite engine.
#[derive(Debug, thiserror::Error)]
pub enum DendriteError {
    /// Storage layer errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Storage write or injection failures
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// Missing source groups, unreadable settings and similar bad input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Indexer command failed unrecoverably
    #[error("Fatal parser error in {path}: {message}")]
    ParserFatal { path: String, message: String },

    /// Scheduling errors
    #[error("Scheduling error: {0}")]
    Scheduling(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped anyhow errors for compatibility
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DendriteError {
    /// Create a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new storage-write error
    pub fn storage_write(msg: impl Into<String>) -> Self {
        Self::StorageWrite(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new fatal parser error
    pub fn parser_fatal(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParserFatal {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new scheduling error
    pub fn scheduling(msg: impl Into<String>) -> Self {
        Self::Scheduling(msg.into())
    }

    /// Check if this is a fatal parser error
    pub fn is_parser_fatal(&self) -> bool {
        matches!(self, Self::ParserFatal { .. })
    }

    /// Check if this is a storage error
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::StorageWrite(_))
    }
}
