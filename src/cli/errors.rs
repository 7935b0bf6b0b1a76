//! CLI-specific error types

use std::fmt;
use std::io;

use crate::codec::CodecError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// The store could not be opened
    StoreUnavailable,
    /// A codec operation failed; carries the codec's own code
    CommandFailed(&'static str),
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DOCGRAPH_CLI_CONFIG_ERROR",
            Self::IoError => "DOCGRAPH_CLI_IO_ERROR",
            Self::StoreUnavailable => "DOCGRAPH_CLI_STORE_UNAVAILABLE",
            Self::CommandFailed(code) => *code,
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn store_unavailable(err: StoreError) -> Self {
        Self::new(CliErrorCode::StoreUnavailable, err.to_string())
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<CodecError> for CliError {
    fn from(e: CodecError) -> Self {
        Self::new(CliErrorCode::CommandFailed(e.code()), e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_keeps_code() {
        let err: CliError = CodecError::NotFound("plan_1".into()).into();
        assert_eq!(err.code_str(), "DOCGRAPH_NOT_FOUND");
        assert!(err.message().contains("plan_1"));
    }

    #[test]
    fn test_display() {
        let err = CliError::config_error("max_depth must be > 0");
        assert_eq!(
            err.to_string(),
            "DOCGRAPH_CLI_CONFIG_ERROR: max_depth must be > 0"
        );
    }
}
