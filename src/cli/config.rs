//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "/var/lib/docgraph",
//!   "max_depth": 64,
//!   "fingerprint_mode": "identity",
//!   "array_key_naming": "edge_key",
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::codec::{ArrayKeyNaming, CodecOptions, FingerprintMode, DEFAULT_MAX_DEPTH};
use crate::observability::Severity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the store snapshot
    pub data_dir: String,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub fingerprint_mode: FingerprintMode,

    #[serde(default)]
    pub array_key_naming: ArrayKeyNaming,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        if self.max_depth == 0 {
            return Err(CliError::config_error("max_depth must be > 0"));
        }
        self.log_severity()?;
        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn log_severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(CliError::config_error)
    }

    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions::default()
            .with_max_depth(self.max_depth)
            .with_fingerprint_mode(self.fingerprint_mode)
            .with_array_key_naming(self.array_key_naming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::from_json(r#"{"data_dir": "/tmp/dg"}"#).unwrap();
        assert_eq!(config.codec_options(), CodecOptions::default());
        assert_eq!(config.log_severity().unwrap(), Severity::Info);
    }

    #[test]
    fn test_explicit_choices() {
        let config = Config::from_json(
            r#"{
                "data_dir": "/tmp/dg",
                "max_depth": 8,
                "fingerprint_mode": "content",
                "array_key_naming": "attribute",
                "log_level": "warn"
            }"#,
        )
        .unwrap();
        let options = config.codec_options();
        assert_eq!(options.max_depth, 8);
        assert_eq!(options.fingerprint_mode, FingerprintMode::Content);
        assert_eq!(options.array_key_naming, ArrayKeyNaming::Attribute);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_json(r#"{"data_dir": "x", "max_depth": 0}"#).is_err());
        assert!(Config::from_json(r#"{"data_dir": "x", "log_level": "loud"}"#).is_err());
        assert!(Config::from_json(r#"{"data_dir": "x", "fingerprint_mode": "md5"}"#).is_err());
        assert!(Config::from_json(r#"{"max_depth": 3}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docgraph.json");
        fs::write(&path, r#"{"data_dir": "data"}"#).unwrap();
        assert_eq!(Config::load(&path).unwrap().data_dir, "data");

        let err = Config::load(&temp.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code_str(), "DOCGRAPH_CLI_CONFIG_ERROR");
    }
}
