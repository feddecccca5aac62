//! CLI command definitions for conf-migrate
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod fix;
pub mod show;

use clap::{Parser, Subcommand};
use fix::FixArgs;
use show::ShowArgs;

/// Inspect and patch application configuration trees
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Remote host (overrides config; local filesystem when unset)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// SSH user (overrides config)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// SSH private key file (overrides config)
    #[arg(short, long, global = true)]
    pub keyfile: Option<String>,

    /// Directory holding the applications (overrides config)
    #[arg(long, global = true)]
    pub apps_root: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the files of an application
    List {
        /// Application name (default: every name in `apps.migrate`)
        app: Option<String>,
    },

    /// Fetch an application and show its files
    Show(ShowArgs),

    /// Parse a local file and print it back in canonical form
    Print {
        /// File to read
        file: String,
    },

    /// Set a key in one stanza of a local .conf file
    Fix(FixArgs),
}
