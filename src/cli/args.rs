//! CLI argument definitions using clap
//!
//! Commands:
//! - jsondb init
//! - jsondb put <key> <json>
//! - jsondb get <key>
//! - jsondb delete <key>
//! - jsondb insert <category> <json-object>
//! - jsondb constrain <category> <field> [--kind unique]
//! - jsondb next-id <category>
//! - jsondb show [category]
//! - jsondb demo

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// jsondb - A persistent key/value store backed by a single JSON document
#[derive(Parser, Debug)]
#[command(name = "jsondb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the backing file (overrides the configuration)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the backing file if needed and report its location
    Init,

    /// Store a JSON value at category/id, replacing any previous value
    Put {
        /// Record key, `category/id`
        key: String,
        /// JSON value
        value: String,
    },

    /// Print the value stored at category/id
    Get {
        /// Record key, `category/id`
        key: String,
    },

    /// Remove the value stored at category/id
    Delete {
        /// Record key, `category/id`
        key: String,
    },

    /// Insert a JSON object under the next id of a category
    Insert {
        /// Category name
        category: String,
        /// JSON object
        record: String,
    },

    /// Declare a constraint on a category field
    Constrain {
        /// Category name
        category: String,
        /// Field name
        field: String,
        /// Constraint type
        #[arg(long, default_value = "unique")]
        kind: String,
    },

    /// Issue the next auto-increment id of a category
    NextId {
        /// Category name
        category: String,
    },

    /// Print the whole document, or one category
    Show {
        /// Category name
        category: Option<String>,
    },

    /// Declare `unique` on user.username and insert the same user twice
    Demo,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
