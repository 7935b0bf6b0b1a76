//! # Codec Errors
//!
//! Validation failures are raised before any store write is issued. Store
//! failures are wrapped and propagated unchanged; the codec never retries.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Document codec errors
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The document shape cannot be encoded
    #[error("Invalid document at {path}: {reason}")]
    Validation { path: String, reason: String },

    /// The caller's root key does not match the document's identity
    #[error("Root key mismatch: request names '{expected}' but document is '{found}'")]
    KeyMismatch { expected: String, found: String },

    #[error("Document not found: {0}")]
    NotFound(String),

    /// A node reached itself through its own edges
    #[error("Cycle detected at node '{0}'")]
    CycleDetected(String),

    #[error("Nesting depth exceeded at '{key}' (max: {max_depth})")]
    DepthExceeded { key: String, max_depth: usize },

    /// A stored record could not be turned back into a document value
    #[error("Malformed record '{key}': {reason}")]
    Malformed { key: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CodecError {
    pub(crate) fn validation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Validation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Validation { .. } => "DOCGRAPH_VALIDATION_FAILED",
            CodecError::KeyMismatch { .. } => "DOCGRAPH_KEY_MISMATCH",
            CodecError::NotFound(_) => "DOCGRAPH_NOT_FOUND",
            CodecError::CycleDetected(_) => "DOCGRAPH_CYCLE_DETECTED",
            CodecError::DepthExceeded { .. } => "DOCGRAPH_DEPTH_EXCEEDED",
            CodecError::Malformed { .. } => "DOCGRAPH_MALFORMED_RECORD",
            CodecError::Store(e) => e.code(),
        }
    }

    /// True for errors caused by the caller's input rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CodecError::Validation { .. }
                | CodecError::KeyMismatch { .. }
                | CodecError::NotFound(_)
                | CodecError::DepthExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            CodecError::validation("$", "missing objectId").code(),
            "DOCGRAPH_VALIDATION_FAILED"
        );
        assert_eq!(CodecError::NotFound("plan_x".into()).code(), "DOCGRAPH_NOT_FOUND");
        assert_eq!(
            CodecError::Store(StoreError::IoError("disk".into())).code(),
            "DOCGRAPH_STORE_IO_ERROR"
        );
    }

    #[test]
    fn test_display_carries_context() {
        let err = CodecError::validation("$.members[1]", "missing field 'objectType'");
        let text = err.to_string();
        assert!(text.contains("$.members[1]"));
        assert!(text.contains("objectType"));
    }

    #[test]
    fn test_client_errors() {
        assert!(CodecError::validation("$", "x").is_client_error());
        assert!(!CodecError::CycleDetected("a_1".into()).is_client_error());
        assert!(!CodecError::Store(StoreError::Internal("x".into())).is_client_error());
    }
}
