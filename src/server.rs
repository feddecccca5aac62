//! A host serving applications, reached through one provider.

use crate::application::Application;
use crate::error::{MigrateError, MigrateResult};
use crate::paths::PathScope;
use crate::provider::RemoteFileProvider;
use indexmap::IndexMap;
use regex_lite::Regex;
use tracing::info;

/// Applications fetched from one host, keyed by name.
pub struct Server<P> {
    provider: P,
    apps_root: PathScope,
    apps: IndexMap<String, Application>,
}

impl<P: RemoteFileProvider> Server<P> {
    /// `apps_root` is the directory holding one subdirectory per application.
    pub fn new(provider: P, apps_root: &str) -> MigrateResult<Self> {
        Ok(Self {
            provider,
            apps_root: PathScope::new(apps_root)?,
            apps: IndexMap::new(),
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn apps_root(&self) -> &str {
        self.apps_root.root()
    }

    /// List an application's files without reading them.
    pub fn list(&self, name: &str) -> MigrateResult<Application> {
        Application::fetch(&self.app_root(name)?, &self.provider)
    }

    /// List and read an application's files, keeping the result.
    ///
    /// Only files matching `filter` are read; the others stay registered
    /// but unset. Fetching a name again replaces the earlier copy.
    pub fn fetch(&mut self, name: &str, filter: Option<&Regex>) -> MigrateResult<&mut Application> {
        let mut app = self.list(name)?;
        let populated = app.populate(&self.provider, filter)?;
        info!(app = name, files = app.len(), populated, "fetched application");

        self.apps.insert(name.to_string(), app);
        self.apps
            .get_mut(name)
            .ok_or_else(|| MigrateError::invalid_path(name))
    }

    pub fn app(&self, name: &str) -> Option<&Application> {
        self.apps.get(name)
    }

    pub fn app_mut(&mut self, name: &str) -> Option<&mut Application> {
        self.apps.get_mut(name)
    }

    /// Fetched applications, in fetch order.
    pub fn apps(&self) -> impl Iterator<Item = (&str, &Application)> {
        self.apps.iter().map(|(name, app)| (name.as_str(), app))
    }

    fn app_root(&self, name: &str) -> MigrateResult<String> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(MigrateError::invalid_path(name));
        }
        Ok(self.apps_root.absolute(name))
    }
}
