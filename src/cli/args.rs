//! CLI argument definitions using clap
//!
//! - docgraph --config <path> save
//! - docgraph --config <path> get <key>
//! - docgraph --config <path> raw-write <key> <value>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docgraph - nested documents over a hash/set key-value store
#[derive(Parser, Debug)]
#[command(name = "docgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./docgraph.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save a document read from stdin
    Save {
        /// Root key; defaults to the document's objectType_objectId
        #[arg(long)]
        key: Option<String>,
    },

    /// Re-encode a document read from stdin
    Update {
        /// Root key; defaults to the document's objectType_objectId
        #[arg(long)]
        key: Option<String>,
    },

    /// Reconstruct a document
    Get {
        key: String,

        /// Fail instead of returning an empty document when absent
        #[arg(long)]
        strict: bool,
    },

    /// Delete a document and everything it reaches
    Delete { key: String },

    /// Print the stored version token
    Fingerprint { key: String },

    /// Check whether a key exists
    Exists { key: String },

    /// Read a plain string value
    RawRead { key: String },

    /// Write a plain string value
    RawWrite { key: String, value: String },

    /// Delete a single key without following edges
    RawDelete { key: String },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from(["docgraph", "--config", "c.json", "get", "plan_1"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("c.json"));
        assert!(matches!(cli.command, Command::Get { ref key, strict: false } if key == "plan_1"));
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["docgraph", "raw-write", "k", "v"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./docgraph.json"));
        assert!(matches!(cli.command, Command::RawWrite { .. }));
    }

    #[test]
    fn test_save_key_override() {
        let cli = Cli::try_parse_from(["docgraph", "save", "--key", "plan_x"]).unwrap();
        assert!(matches!(cli.command, Command::Save { key: Some(ref k) } if k == "plan_x"));
    }
}
