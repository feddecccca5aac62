//! Integration tests for tiered configuration loading.

use conf_migrate::config::{Config, ConfigLoader, ConfigPaths};
use std::fs;
use tempfile::TempDir;

/// Helper to create a ConfigLoader with specific temp directories.
fn create_loader_with_dirs(
    project_dir: Option<std::path::PathBuf>,
    user_dir: Option<std::path::PathBuf>,
) -> ConfigLoader {
    let paths = ConfigPaths::with_dirs(project_dir, user_dir);
    ConfigLoader::load_with_paths(paths).expect("Failed to create config loader")
}

fn write_config(dir: &std::path::Path, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("config.yaml"), content).unwrap();
}

#[test]
fn test_missing_tiers_give_defaults() {
    let temp = TempDir::new().unwrap();
    let loader = create_loader_with_dirs(
        Some(temp.path().join("absent-project")),
        Some(temp.path().join("absent-user")),
    );
    assert!(loader.sources().is_empty());
    assert_eq!(loader.config().apps, Config::default().apps);
}

#[test]
fn test_tiers_merge_field_by_field() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    let user = temp.path().join("user");
    write_config(
        &project,
        r#"
apps:
  root: /srv/splunk/etc/apps
  migrate: [search, launcher]
  filter: '\.(conf|meta)$'
"#,
    );
    write_config(
        &user,
        r#"
apps:
  migrate: [search]
"#,
    );

    let loader = create_loader_with_dirs(Some(project), Some(user));
    let apps = &loader.config().apps;
    assert_eq!(apps.root, "/srv/splunk/etc/apps");
    assert_eq!(apps.migrate, vec!["search"]);

    let filter = apps.filter_regex().unwrap().unwrap();
    assert!(filter.is_match("metadata/local.meta"));
    assert!(!filter.is_match("bin/run.sh"));
    assert_eq!(loader.sources().len(), 2);
}

#[test]
fn test_explicit_file_skips_tiers() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "apps:\n  migrate: [alerts]\n");
    let loader = ConfigLoader::load_file(&temp.path().join("config.yaml")).unwrap();
    assert_eq!(loader.config().apps.migrate, vec!["alerts"]);
    assert_eq!(loader.sources(), &[temp.path().join("config.yaml")]);
}

#[test]
fn test_explicit_file_must_exist() {
    let temp = TempDir::new().unwrap();
    assert!(ConfigLoader::load_file(&temp.path().join("nope.yaml")).is_err());
}
