//! Where file listings and contents come from.
//!
//! [`RemoteFileProvider`] is the seam the rest of the crate depends on.
//! Two implementations ship here:
//! - [`Porter`] ferries `find` and `cat` over any [`CommandExec`] channel,
//!   typically [`SshExec`] for a remote host
//! - [`LocalFileProvider`] walks the local filesystem directly
//!
//! All calls block; neither side imposes a timeout of its own.

use crate::error::{MigrateError, MigrateResult};
use crate::validators::{is_absolute_path, is_file};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace};

/// Lists and reads files under an absolute root.
pub trait RemoteFileProvider {
    /// Every regular file under `root`. Fails with `InvalidPath` unless
    /// `root` is absolute.
    fn list(&self, root: &str) -> MigrateResult<Vec<String>>;

    /// Contents of one file. Fails with `InvalidPath` unless `path` is
    /// absolute.
    fn get(&self, path: &str) -> MigrateResult<String>;
}

/// Runs a shell command and returns its standard output.
pub trait CommandExec {
    fn exec(&self, cmd: &str) -> MigrateResult<String>;
}

impl<F> CommandExec for F
where
    F: Fn(&str) -> MigrateResult<String>,
{
    fn exec(&self, cmd: &str) -> MigrateResult<String> {
        self(cmd)
    }
}

/// Provider that wraps `find` / `cat` in commands for an exec channel.
#[derive(Debug, Clone)]
pub struct Porter<E> {
    exec: E,
}

impl<E: CommandExec> Porter<E> {
    pub fn new(exec: E) -> Self {
        Self { exec }
    }

    pub fn exec(&self) -> &E {
        &self.exec
    }
}

impl<E: CommandExec> RemoteFileProvider for Porter<E> {
    fn list(&self, root: &str) -> MigrateResult<Vec<String>> {
        if !is_absolute_path(root) {
            return Err(MigrateError::not_absolute(root));
        }
        let cmd = format!("find {} -type f -iname \"*\"", shell_quote(root));
        let output = self.exec.exec(&cmd)?;
        let paths: Vec<String> = output
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(|line| line.strip_prefix("./").unwrap_or(line).to_string())
            .collect();
        debug!(root, files = paths.len(), "listed files");
        Ok(paths)
    }

    fn get(&self, path: &str) -> MigrateResult<String> {
        if !is_absolute_path(path) {
            return Err(MigrateError::not_absolute(path));
        }
        self.exec.exec(&format!("cat {}", shell_quote(path)))
    }
}

/// Single-quote `arg` when it holds anything a shell would interpret.
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+,:@%=".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Runs commands on a remote host through the system `ssh` client.
#[derive(Debug, Clone)]
pub struct SshExec {
    host: String,
    user: Option<String>,
    keyfile: Option<String>,
    port: Option<u16>,
}

impl SshExec {
    /// Validate the connection settings.
    ///
    /// Fails with `InvalidConnection` when no host is given and with
    /// `MissingKeyfile` when a key file is named but not readable.
    pub fn new(
        host: Option<&str>,
        user: Option<&str>,
        keyfile: Option<&str>,
        port: Option<u16>,
    ) -> MigrateResult<Self> {
        let host = host
            .filter(|host| !host.trim().is_empty())
            .ok_or_else(|| MigrateError::invalid_connection("no host configured"))?;
        if let Some(keyfile) = keyfile {
            if !is_file(keyfile) {
                return Err(MigrateError::missing_keyfile(keyfile));
            }
        }
        Ok(Self {
            host: host.to_string(),
            user: user.map(str::to_string),
            keyfile: keyfile.map(str::to_string),
            port,
        })
    }

    fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }

    /// The `ssh` argument vector for `cmd`.
    pub fn args(&self, cmd: &str) -> Vec<String> {
        let mut args = vec!["-o".to_string(), "BatchMode=yes".to_string()];
        if let Some(keyfile) = &self.keyfile {
            args.push("-i".to_string());
            args.push(keyfile.clone());
        }
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push(self.destination());
        args.push(cmd.to_string());
        args
    }
}

impl CommandExec for SshExec {
    fn exec(&self, cmd: &str) -> MigrateResult<String> {
        trace!(host = %self.host, cmd, "ssh exec");
        let output = Command::new("ssh")
            .args(self.args(cmd))
            .output()
            .map_err(|e| MigrateError::command_failed(cmd, e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MigrateError::command_failed(cmd, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Provider over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileProvider;

impl LocalFileProvider {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> MigrateResult<()> {
        let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());
        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                Self::walk(&path, out)?;
            } else if file_type.is_file() {
                out.push(path);
            }
        }
        Ok(())
    }
}

impl RemoteFileProvider for LocalFileProvider {
    fn list(&self, root: &str) -> MigrateResult<Vec<String>> {
        if !is_absolute_path(root) {
            return Err(MigrateError::not_absolute(root));
        }
        let mut files = Vec::new();
        Self::walk(Path::new(root), &mut files).map_err(|e| e.with_path(root))?;
        debug!(root, files = files.len(), "listed local files");
        Ok(files
            .into_iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect())
    }

    fn get(&self, path: &str) -> MigrateResult<String> {
        if !is_absolute_path(path) {
            return Err(MigrateError::not_absolute(path));
        }
        fs::read_to_string(path).map_err(|e| MigrateError::io(e).with_path(path))
    }
}
