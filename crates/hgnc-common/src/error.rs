//! Error types shared by the HGNC crates

use thiserror::Error;

/// Result type alias for common HGNC operations
pub type Result<T> = std::result::Result<T, HgncError>;

/// Error type for failures that are not specific to import or query
#[derive(Error, Debug)]
pub enum HgncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HgncError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
