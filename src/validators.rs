//! Predicates that classify raw text.
//!
//! These are cheap structural checks used to pick a parser, printer or
//! artifact kind. They never attempt a full parse.
//!
//! Order matters between them: [`is_conf`] is checked before [`is_ini`] so a
//! multi-stanza blob is never mistaken for a single stanza, and [`is_list`]
//! only holds when nothing more specific does.

use regex_lite::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `[name]` header line.
pub(crate) static STANZA_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*)\]\s*$").expect("valid header regex"));

static CONF_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\n]*\S[^\n]*\n[ \t\r]*\n").expect("valid conf regex"));

static XML_DOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A\s*<.+?>.*</.+?>\s*\z").expect("valid xml regex"));

static RELATIVE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[^/\n]+/").expect("valid path regex"));

/// A usable string: no NUL bytes.
pub fn is_string(value: &str) -> bool {
    !value.contains('\0')
}

/// An existing, readable, non-directory file on the local filesystem.
pub fn is_file(path: &str) -> bool {
    if path.is_empty() || !is_string(path) || path.contains('\n') {
        return false;
    }
    let path = Path::new(path);
    path.is_file() && std::fs::File::open(path).is_ok()
}

pub fn is_absolute_path(path: &str) -> bool {
    is_string(path) && path.starts_with('/')
}

/// At least one leading segment followed by a slash (`bin/foo`, `foobar/`).
pub fn is_relative_path(path: &str) -> bool {
    is_string(path) && RELATIVE_PATH.is_match(path)
}

pub fn is_path(path: &str) -> bool {
    is_absolute_path(path) || is_relative_path(path)
}

/// File name ends in `.conf`; any directory part is ignored.
pub fn is_confname(path: &str) -> bool {
    path.ends_with(".conf")
}

/// A single `[name]` stanza with at least one line after the header.
///
/// Text that also reads as a conf file (contains a blank-line break) is not
/// a stanza. Header-only text is rejected.
pub fn is_ini(text: &str) -> bool {
    if !is_string(text) || is_conf(text) {
        return false;
    }
    let mut lines = text.trim_start().lines();
    match lines.next() {
        Some(header) if STANZA_HEADER.is_match(header) => {
            lines.any(|line| !line.trim().is_empty())
        }
        _ => false,
    }
}

/// A YAML document opened with a `---` marker.
pub fn is_yaml(text: &str) -> bool {
    let text = text.trim_start();
    is_string(text)
        && text
            .strip_prefix("---")
            .and_then(|rest| rest.chars().next())
            .is_some_and(char::is_whitespace)
}

pub fn is_xml(text: &str) -> bool {
    is_string(text) && XML_DOC.is_match(text)
}

/// Some non-empty line is followed by a blank line.
pub fn is_conf(text: &str) -> bool {
    is_string(text) && CONF_BREAK.is_match(text)
}

/// Multi-line text with no recognizable structure.
pub fn is_list(text: &str) -> bool {
    text.contains('\n') && !is_ini(text) && !is_yaml(text) && !is_xml(text) && !is_conf(text)
}

/// Every entry is a relative path.
pub fn is_path_array<S: AsRef<str>>(paths: &[S]) -> bool {
    paths.iter().all(|path| is_relative_path(path.as_ref()))
}
