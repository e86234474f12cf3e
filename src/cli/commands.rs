//! CLI command implementations
//!
//! Every command opens the store, runs one operation and prints one JSON
//! response line. Opening the store is the fail-fast point: if the backing
//! file cannot be created, read or parsed, the command aborts.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::auth::hash_password;
use crate::config::StoreConfig;
use crate::observability::{log_event, Event, Logger};
use crate::store::{record_from_value, ConstraintKind, DocumentStore};

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{parse_json_arg, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    run_cli(Cli::parse_args())
}

/// Run a parsed command line
pub fn run_cli(cli: Cli) -> CliResult<()> {
    let config = resolve_config(cli.config.as_deref(), cli.data_dir)?;
    Logger::set_min_severity(config.min_severity()?);
    if let Some(path) = &cli.config {
        log_event(
            Event::ConfigLoaded,
            &[("path", path.display().to_string().as_str())],
        );
    }

    let mut store = DocumentStore::from_config(&config)?;

    match execute(&mut store, cli.command) {
        Ok(data) => write_response(data),
        Err(e) if !e.is_fatal() => write_error(e.code_str(), e.message()),
        Err(e) => Err(e),
    }
}

/// Build the effective configuration: file (if any), then flag overrides
pub fn resolve_config(
    config_path: Option<&Path>,
    data_dir: Option<PathBuf>,
) -> CliResult<StoreConfig> {
    let mut config = match config_path {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };

    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }

    config.validate()?;
    Ok(config)
}

/// Execute one command against an open store and return the response data
pub fn execute(store: &mut DocumentStore, command: Command) -> CliResult<Value> {
    match command {
        Command::Init => Ok(json!({
            "path": store.path().display().to_string(),
            "categories": store.categories().count(),
        })),

        Command::Put { key, value } => {
            let value = parse_json_arg("value", &value)?;
            let previous = store.put(&key, value)?;
            Ok(json!({ "key": key, "replaced": previous.is_some() }))
        }

        Command::Get { key } => Ok(store.get(&key)?.clone()),

        Command::Delete { key } => {
            let removed = store.delete(&key)?;
            Ok(json!({ "key": key, "deleted": removed }))
        }

        Command::Insert { category, record } => {
            let record = record_from_value(parse_json_arg("record", &record)?)?;
            let id = store.insert(&category, record)?;
            Ok(json!({ "category": category, "id": id }))
        }

        Command::Constrain {
            category,
            field,
            kind,
        } => {
            let kind: ConstraintKind = kind.parse()?;
            let added = store.declare_constraint(&category, kind, &field)?;
            Ok(json!({
                "category": category,
                "constraint": kind.as_str(),
                "field": field,
                "added": added,
            }))
        }

        Command::NextId { category } => {
            let id = store.next_id(&category)?;
            Ok(json!({ "category": category, "id": id }))
        }

        Command::Show { category: Some(category) } => {
            Ok(Value::Object(store.category(&category)?.clone()))
        }

        Command::Show { category: None } => Ok(serde_json::to_value(store.document())?),

        Command::Demo => demo(store),
    }
}

/// Declares `unique` on user.username, then inserts the same user twice.
///
/// The first insert succeeds; the second is rejected. Fatal store errors
/// still abort.
fn demo(store: &mut DocumentStore) -> CliResult<Value> {
    store.declare_constraint("user", ConstraintKind::Unique, "username")?;

    let user = json!({
        "username": "Alice",
        "password": hash_password("password123"),
    });

    let mut attempts = Vec::with_capacity(2);
    for _ in 0..2 {
        let record = record_from_value(user.clone())?;
        match store.insert("user", record) {
            Ok(id) => attempts.push(json!({ "id": id })),
            Err(e) if !e.is_fatal() => attempts.push(json!({
                "error": { "code": e.code(), "message": e.to_string() }
            })),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(json!({ "attempts": attempts }))
}
