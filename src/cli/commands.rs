//! CLI command implementations
//!
//! Every command opens the file-backed store named by the config, runs one
//! service call and writes one JSON response. Codec failures are reported
//! as an error response and a non-zero exit.

use std::path::Path;

use serde_json::{json, Value};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_document, write_error, write_response};
use crate::codec::{CodecResult, NodeKey};
use crate::observability::Logger;
use crate::service::DocumentService;
use crate::store::{FileStore, KvStore};

pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(&cli.config, cli.command)
}

/// Run one command against the store configured at `config_path`
pub fn run_command(config_path: &Path, cmd: Command) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.log_severity()?);

    let store = FileStore::open(config.data_path()).map_err(CliError::store_unavailable)?;
    let path = store.path().display().to_string();
    Logger::trace("STORE_OPENED", &[("path", path.as_str())]);

    let service = DocumentService::new(store, config.codec_options());

    let document = match &cmd {
        Command::Save { .. } | Command::Update { .. } => Some(read_document()?),
        _ => None,
    };

    match execute(&service, cmd, document) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code(), &e.to_string())?;
            Err(e.into())
        }
    }
}

/// Dispatch a parsed command. `document` carries stdin for save/update.
pub fn execute<S: KvStore>(
    service: &DocumentService<S>,
    cmd: Command,
    document: Option<Value>,
) -> CodecResult<Value> {
    let document = document.unwrap_or(Value::Null);

    match cmd {
        Command::Save { key } => {
            let key = root_key(key, &document);
            let outcome = service.save_with_report(&key, &document)?;
            Ok(json!({
                "key": outcome.key,
                "fingerprint": outcome.fingerprint,
                "nodes": outcome.report.nodes,
                "edges": outcome.report.edges_written,
            }))
        }
        Command::Update { key } => {
            let key = root_key(key, &document);
            let fingerprint = service.update(&key, &document)?;
            Ok(json!({ "key": key, "fingerprint": fingerprint }))
        }
        Command::Get { key, strict } => {
            let doc = if strict {
                service.get_existing(&key)?
            } else {
                service.get(&key)?
            };
            Ok(Value::Object(doc))
        }
        Command::Delete { key } => {
            let report = service.delete(&key)?;
            Ok(json!({ "key": key, "nodes": report.nodes, "keys_removed": report.keys_removed }))
        }
        Command::Fingerprint { key } => Ok(json!({
            "key": key,
            "fingerprint": service.fingerprint(&key)?,
        })),
        Command::Exists { key } => Ok(json!({ "key": key, "exists": service.exists(&key)? })),
        Command::RawRead { key } => Ok(json!({ "key": key, "value": service.read_raw(&key)? })),
        Command::RawWrite { key, value } => {
            service.write_raw(&key, &value)?;
            Ok(json!({ "key": key }))
        }
        Command::RawDelete { key } => {
            Ok(json!({ "key": key, "deleted": service.delete_raw(&key)? }))
        }
    }
}

/// Explicit key, else the document's own identity. An empty key lets
/// validation report what the document is missing.
fn root_key(explicit: Option<String>, document: &Value) -> String {
    explicit
        .or_else(|| NodeKey::of_document(document).map(|k| k.to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecOptions;
    use crate::store::MemoryStore;

    fn service() -> DocumentService<MemoryStore> {
        DocumentService::new(MemoryStore::new(), CodecOptions::default())
    }

    #[test]
    fn test_save_then_get() {
        let svc = service();
        let doc = json!({"objectType": "plan", "objectId": "1", "copay": 20});

        let saved = execute(&svc, Command::Save { key: None }, Some(doc)).unwrap();
        assert_eq!(saved["key"], "plan_1");
        assert_eq!(saved["nodes"], 1);

        let got = execute(
            &svc,
            Command::Get { key: "plan_1".into(), strict: true },
            None,
        )
        .unwrap();
        assert_eq!(got, json!({"copay": 20}));
    }

    #[test]
    fn test_save_without_identity_fails_validation() {
        let svc = service();
        let err =
            execute(&svc, Command::Save { key: None }, Some(json!({"copay": 1}))).unwrap_err();
        assert_eq!(err.code(), "DOCGRAPH_VALIDATION_FAILED");
    }

    #[test]
    fn test_strict_get_missing() {
        let svc = service();
        let err =
            execute(&svc, Command::Get { key: "x_1".into(), strict: true }, None).unwrap_err();
        assert_eq!(err.code(), "DOCGRAPH_NOT_FOUND");
    }

    #[test]
    fn test_raw_commands() {
        let svc = service();
        execute(
            &svc,
            Command::RawWrite { key: "k".into(), value: "v".into() },
            None,
        )
        .unwrap();
        let read = execute(&svc, Command::RawRead { key: "k".into() }, None).unwrap();
        assert_eq!(read["value"], "v");
        let deleted = execute(&svc, Command::RawDelete { key: "k".into() }, None).unwrap();
        assert_eq!(deleted["deleted"], true);
        let exists = execute(&svc, Command::Exists { key: "k".into() }, None).unwrap();
        assert_eq!(exists["exists"], false);
    }
}
