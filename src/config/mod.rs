//! Tool configuration.
//!
//! Consolidates configuration from four tiers with field-by-field YAML
//! merging:
//! 1. **Defaults** - built into the binary
//! 2. **Project** - `$CWD/conf-migrate/config.yaml`
//! 3. **User** - `~/.conf-migrate/config.yaml`
//! 4. **Environment** - single-field overrides
//!
//! ## Environment Variables
//! - `CONF_MIGRATE_CONFIG_PATH` - Explicit config file (replaces tiers 1-3)
//! - `CONF_MIGRATE_HOST` - Remote host
//! - `CONF_MIGRATE_USER` - Remote user
//! - `CONF_MIGRATE_KEYFILE` - SSH private key
//! - `CONF_MIGRATE_APPS_ROOT` - Directory holding the applications
//! - `CONF_MIGRATE_USER_DIR` - User config dir (default: `~/.conf-migrate`)
//! - `CONF_MIGRATE_PROJECT_DIR` - Project config dir (default: `./conf-migrate`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
