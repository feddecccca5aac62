//! Application-relative path handling.
//!
//! Pure string manipulation, no filesystem I/O:
//! - Normalizes `.` and `..` segments and repeated slashes
//! - Maps absolute paths under an application root to root-relative form
//! - Refuses paths that escape above the root
//! - Joins root-relative paths back onto the root for remote access

use crate::error::{MigrateError, MigrateResult};
use crate::validators::is_path;

/// An application root plus the rules for addressing files beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathScope {
    /// Normalized root, no trailing slash (except for `/` itself).
    root: String,
}

impl PathScope {
    /// Create a scope. Fails with `InvalidPath` unless `root` is a path.
    pub fn new(root: &str) -> MigrateResult<Self> {
        if !is_path(root) {
            return Err(MigrateError::invalid_path(root));
        }
        Ok(Self {
            root: normalize(root),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Last segment of the root.
    pub fn name(&self) -> &str {
        file_name(&self.root)
    }

    /// Root-relative, normalized form of `path`.
    ///
    /// Absolute paths must lie under the root. Returns `None` for the root
    /// itself, for paths outside it, and for relative paths that climb above
    /// it with `..`.
    pub fn relativize(&self, path: &str) -> Option<String> {
        let normalized = normalize(path);

        let relative = if normalized.starts_with('/') {
            let rest = if self.root == "/" {
                normalized.strip_prefix('/')?
            } else {
                // "/apps/x" must not match "/apps/xy"
                normalized.strip_prefix(&self.root)?.strip_prefix('/')?
            };
            rest.to_string()
        } else if self.root.starts_with('/') {
            normalized
        } else {
            // Relative root: strip it when the path repeats it.
            match normalized
                .strip_prefix(&self.root)
                .and_then(|rest| rest.strip_prefix('/'))
            {
                Some(rest) => rest.to_string(),
                None => normalized,
            }
        };

        if relative.is_empty() || relative == ".." || relative.starts_with("../") {
            return None;
        }
        Some(relative)
    }

    /// Join a root-relative path onto the root.
    pub fn absolute(&self, relative: &str) -> String {
        let relative = relative.trim_start_matches('/');
        if self.root.ends_with('/') {
            format!("{}{}", self.root, relative)
        } else {
            format!("{}/{}", self.root, relative)
        }
    }
}

/// Resolve `.`, `..` and repeated slashes without touching the filesystem.
///
/// A leading `/` is kept; `..` that cannot climb further is kept on
/// relative paths and dropped at the root of absolute ones.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            name => parts.push(name),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Non-empty segments of a path.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// Last non-empty segment (`""` for `/`).
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}
