//! Configuration types.

use anyhow::{Context, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default directory holding one subdirectory per application.
pub const DEFAULT_APPS_ROOT: &str = "/opt/apps";

/// How to reach the host serving the applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Remote host. Without one, applications are read from the local
    /// filesystem.
    pub host: Option<String>,
    pub user: Option<String>,
    /// Private key passed to `ssh -i`.
    pub keyfile: Option<String>,
    pub port: Option<u16>,
}

impl ConnectionConfig {
    pub fn is_remote(&self) -> bool {
        self.host.as_deref().is_some_and(|host| !host.is_empty())
    }
}

/// Which applications to migrate and where they live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppsConfig {
    /// Directory holding the applications (default: `/opt/apps`).
    pub root: String,

    /// Application names to migrate; the default targets of `list` and
    /// `show`.
    pub migrate: Vec<String>,

    /// Regex selecting which files to read; all files when unset.
    pub filter: Option<String>,
}

impl Default for AppsConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_APPS_ROOT.to_string(),
            migrate: Vec::new(),
            filter: None,
        }
    }
}

impl AppsConfig {
    /// The applications a command works on: the one named, or else every
    /// configured one.
    pub fn targets(&self, requested: Option<&str>) -> Vec<String> {
        match requested {
            Some(name) => vec![name.to_string()],
            None => self.migrate.clone(),
        }
    }

    /// Compile the file filter, if any.
    pub fn filter_regex(&self) -> Result<Option<Regex>> {
        self.filter
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("invalid apps.filter {:?}", pattern))
            })
            .transpose()
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub apps: AppsConfig,
}

impl Config {
    /// Load configuration from one file, without tier merging.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        // Empty or comment-only files parse as null.
        let config: Option<Config> = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.unwrap_or_default())
    }
}
