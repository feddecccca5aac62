//! Show subcommand: fetch an application and render it.

use clap::{Args, ValueEnum};

/// How `show` renders an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ShowFormat {
    /// Registered file paths, one per line
    Paths,
    /// The file tree as JSON
    Tree,
    /// Every fetched file, parsed and printed back (default)
    #[default]
    Print,
}

/// Arguments for the show subcommand
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Application name (default: every name in `apps.migrate`)
    pub app: Option<String>,

    /// Regex selecting which files to fetch (overrides config)
    #[arg(short, long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = ShowFormat::Print)]
    pub format: ShowFormat,
}
