//! Configuration loader with tier-based merging.
//!
//! Tiers, lowest to highest priority: embedded defaults, project file,
//! user file, environment variables. File tiers are deep-merged field by
//! field; environment variables then override single fields.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    /// `$CWD/conf-migrate/config.yaml`
    Project = 1,
    /// `~/.conf-migrate/config.yaml`
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for each file tier.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover tier directories from the environment and defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var("CONF_MIGRATE_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".conf-migrate")));

        let project_dir = std::env::var("CONF_MIGRATE_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("conf-migrate")));

        Self {
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn file(&self, tier: ConfigTier) -> Option<PathBuf> {
        let dir = match tier {
            ConfigTier::Project => self.project_dir.as_ref(),
            ConfigTier::User => self.user_dir.as_ref(),
            _ => None,
        }?;
        Some(dir.join(CONFIG_FILE))
    }
}

/// Loads and holds the effective configuration.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Files that contributed, lowest tier first.
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load from all tiers, or from `CONF_MIGRATE_CONFIG_PATH` alone when set.
    pub fn load() -> Result<Self> {
        if let Ok(explicit) = std::env::var("CONF_MIGRATE_CONFIG_PATH") {
            return Self::load_file(Path::new(&explicit));
        }
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load one explicit file, then apply environment overrides.
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Config::load(path)?;
        apply_overrides(&mut config, env_lookup);
        Ok(Self {
            paths: ConfigPaths::with_dirs(None, None),
            config,
            sources: vec![path.to_path_buf()],
        })
    }

    /// Load from the given tier directories, then apply environment
    /// overrides.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut loader = Self::merge_files(paths)?;
        apply_overrides(&mut loader.config, env_lookup);
        Ok(loader)
    }

    /// Merge the file tiers only.
    fn merge_files(paths: ConfigPaths) -> Result<Self> {
        let mut tiers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut sources = Vec::new();

        for tier in [ConfigTier::Project, ConfigTier::User] {
            let Some(file) = paths.file(tier) else {
                continue;
            };
            if !file.exists() {
                continue;
            }
            match read_yaml(&file) {
                Some(value) => {
                    debug!(%tier, path = %file.display(), "loaded config tier");
                    tiers.push(value);
                    sources.push(file);
                }
                None => warn!(%tier, path = %file.display(), "ignoring unreadable config"),
            }
        }

        let config: Config = serde_json::from_value(deep_merge_all(tiers))?;
        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were read, lowest tier first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

fn read_yaml(path: &Path) -> Option<Value> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_yaml::from_str::<Value>(&content).ok()
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Apply the environment tier through `lookup`.
fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(host) = lookup("CONF_MIGRATE_HOST") {
        config.connection.host = Some(host);
    }
    if let Some(user) = lookup("CONF_MIGRATE_USER") {
        config.connection.user = Some(user);
    }
    if let Some(keyfile) = lookup("CONF_MIGRATE_KEYFILE") {
        config.connection.keyfile = Some(keyfile);
    }
    if let Some(root) = lookup("CONF_MIGRATE_APPS_ROOT") {
        config.apps.root = root;
    }
}
