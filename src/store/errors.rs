//! # Store Errors
//!
//! Error codes:
//! - DOCGRAPH_STORE_WRONG_TYPE
//! - DOCGRAPH_STORE_IO_ERROR
//! - DOCGRAPH_STORE_CORRUPTION (fatal)

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Operation against a key holding a different kind of value
    #[error("Wrong type for key '{key}': expected {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Store file corrupted: {0}")]
    Corruption(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::WrongType { .. } => "DOCGRAPH_STORE_WRONG_TYPE",
            StoreError::IoError(_) => "DOCGRAPH_STORE_IO_ERROR",
            StoreError::Corruption(_) => "DOCGRAPH_STORE_CORRUPTION",
            StoreError::Internal(_) => "DOCGRAPH_STORE_INTERNAL",
        }
    }

    /// Corruption means the persisted key space cannot be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Corruption(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::IoError(e.to_string())
    }
}
