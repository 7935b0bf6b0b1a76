//! CLI module for docgraph
//!
//! One-shot commands against the file-backed store named by the config:
//! - save / update: document JSON on stdin
//! - get / delete / fingerprint / exists: by root key
//! - raw-read / raw-write / raw-delete: plain string keys

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, write_error, write_response};
