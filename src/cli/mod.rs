//! CLI module for jsondb
//!
//! Provides command-line access to a document store:
//! - init: Create or open the backing file
//! - put / get / delete: Direct key access
//! - insert / next-id: Auto-increment ids
//! - constrain: Declare unique fields
//! - show: Dump the document
//! - demo: Unique-constraint walkthrough

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, resolve_config, run, run_cli};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
