//! Applications: a root directory, the files beneath it, and their tree.
//!
//! An [`Application`] assumes every file lives under one root, in nested
//! subdirectories. File paths are kept root-relative, unique and in
//! registration order; each one is mirrored as a leaf of a [`ConfigNode`]
//! tree that is filled in as contents are fetched or set.

use crate::artifact::Artifact;
use crate::dispatch;
use crate::error::MigrateResult;
use crate::paths::{PathScope, segments};
use crate::provider::RemoteFileProvider;
use crate::tree::{ConfigNode, UNSET};
use crate::validators::is_path;
use indexmap::IndexSet;
use regex_lite::Regex;
use std::ops::Index;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    scope: PathScope,
    paths: IndexSet<String>,
    tree: ConfigNode,
}

impl Application {
    /// An application with no files yet. Fails unless `root` is a path.
    pub fn new(root: &str) -> MigrateResult<Self> {
        Ok(Self {
            scope: PathScope::new(root)?,
            paths: IndexSet::new(),
            tree: ConfigNode::branch(),
        })
    }

    /// An application seeded with `paths`; invalid entries are dropped.
    pub fn with_paths<S: AsRef<str>>(root: &str, paths: &[S]) -> MigrateResult<Self> {
        let mut app = Self::new(root)?;
        app.set_paths(paths);
        Ok(app)
    }

    /// Build an application from a provider's listing of `root`.
    pub fn fetch(root: &str, provider: &dyn RemoteFileProvider) -> MigrateResult<Self> {
        let listing = provider.list(root)?;
        info!(root, files = listing.len(), "fetched file listing");
        Self::with_paths(root, &listing)
    }

    pub fn root(&self) -> &str {
        self.scope.root()
    }

    /// Last segment of the root.
    pub fn name(&self) -> &str {
        self.scope.name()
    }

    /// Registered root-relative paths, in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path)
            .is_some_and(|relative| self.paths.contains(&relative))
    }

    pub fn tree(&self) -> &ConfigNode {
        &self.tree
    }

    /// Replace the path set and rebuild the tree from scratch.
    pub fn set_paths<S: AsRef<str>>(&mut self, paths: &[S]) {
        self.paths.clear();
        self.tree = ConfigNode::branch();
        for path in paths {
            self.append(path.as_ref());
        }
        debug!(root = self.root(), files = self.paths.len(), "rebuilt tree");
    }

    /// Register one path. Returns `false` if it is invalid; registering a
    /// known path again changes nothing.
    pub fn append(&mut self, path: &str) -> bool {
        let Some(relative) = self.resolve(path) else {
            warn!(path, root = self.root(), "dropping invalid path");
            return false;
        };
        if self.paths.contains(&relative) {
            return true;
        }
        if self.conflicts(&relative) {
            warn!(path, root = self.root(), "dropping path that overlaps a registered file");
            return false;
        }
        self.paths.insert(relative.clone());
        self.tree.merge(ConfigNode::expand(&segments(&relative)));
        true
    }

    /// Root-relative form of a path, if it is valid for this application.
    ///
    /// A trailing `/` names a directory, never a file.
    fn resolve(&self, path: &str) -> Option<String> {
        if !is_path(path) || path.ends_with('/') {
            return None;
        }
        self.scope.relativize(path)
    }

    /// `relative` is a directory of registered files, or lies beneath a
    /// registered file.
    fn conflicts(&self, relative: &str) -> bool {
        if self.tree.get_path(relative).is_some_and(ConfigNode::is_branch) {
            return true;
        }
        let parts = segments(relative);
        (1..parts.len()).any(|end| self.paths.contains(&parts[..end].join("/")))
    }

    /// The node stored for `path`, or an `Unset` sentinel.
    pub fn file(&self, path: &str) -> &ConfigNode {
        self.resolve(path)
            .filter(|relative| self.paths.contains(relative))
            .and_then(|relative| self.tree.get_path(&relative))
            .unwrap_or(&UNSET)
    }

    /// Live handle to the node stored for a registered `path`.
    pub fn file_mut(&mut self, path: &str) -> Option<&mut ConfigNode> {
        let relative = self.resolve(path)?;
        if !self.paths.contains(&relative) {
            return None;
        }
        self.tree.get_path_mut(&relative)
    }

    /// Store `content` for `path`, registering the path if needed.
    ///
    /// Returns `false` when the path is invalid.
    pub fn set_file(&mut self, path: &str, content: impl Into<ConfigNode>) -> bool {
        if !self.append(path) {
            return false;
        }
        let Some(relative) = self.resolve(path) else {
            return false;
        };
        self.tree.set_path(&relative, content.into());
        true
    }

    /// Apply `f` to the node at a registered `path`.
    pub fn mutate(&mut self, path: &str, f: impl FnOnce(&mut ConfigNode)) -> bool {
        match self.file_mut(path) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }

    /// `(path, node)` pairs for registered paths matching `filter`.
    pub fn each<'a>(
        &'a self,
        filter: Option<&'a Regex>,
    ) -> impl Iterator<Item = (&'a str, &'a ConfigNode)> + 'a {
        self.paths
            .iter()
            .filter(move |path| filter.is_none_or(|re| re.is_match(path)))
            .map(move |path| (path.as_str(), self.tree.get_path(path).unwrap_or(&UNSET)))
    }

    /// Fetch every registered path matching `filter` and store it as an
    /// artifact. Returns how many files were populated.
    pub fn populate(
        &mut self,
        provider: &dyn RemoteFileProvider,
        filter: Option<&Regex>,
    ) -> MigrateResult<usize> {
        let selected: Vec<String> = self
            .paths
            .iter()
            .filter(|path| filter.is_none_or(|re| re.is_match(path)))
            .cloned()
            .collect();

        for relative in &selected {
            let absolute = self.scope.absolute(relative);
            let content = provider.get(&absolute)?;
            debug!(path = %relative, bytes = content.len(), "populating file");
            let artifact = Artifact::for_file(relative, content);
            self.tree.set_path(relative, artifact.into());
        }

        info!(root = self.root(), populated = selected.len(), "populated application");
        Ok(selected.len())
    }

    /// Render one file through the dispatcher, hinted by its name.
    pub fn print(&self, path: &str) -> Option<String> {
        render(path, self.file(path))
    }

    /// Render every file that has content, in registration order.
    pub fn print_all(&self) -> Vec<(String, String)> {
        self.each(None)
            .filter_map(|(path, node)| render(path, node).map(|out| (path.to_string(), out)))
            .collect()
    }
}

fn render(path: &str, node: &ConfigNode) -> Option<String> {
    match node {
        ConfigNode::Artifact(artifact) => Some(artifact.print()),
        ConfigNode::Content(content) => {
            let data = dispatch::parse(content, Some(path))?;
            Some(dispatch::print(&data, Some(path)))
        }
        _ => None,
    }
}

impl Index<&str> for Application {
    type Output = ConfigNode;

    /// Top-level tree lookup; missing keys yield an `Unset` sentinel.
    fn index(&self, key: &str) -> &ConfigNode {
        &self.tree[key]
    }
}
