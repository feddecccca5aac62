//! INI-style stanza grammar.
//!
//! A stanza is one `[name]` header followed by `key = value` lines. Values
//! continue onto following lines while a line ends in a backslash:
//!
//! ```text
//! [svc]
//! cmd = start \
//! continued
//! port = 8080
//! ```
//!
//! The stored value is the logical text with the continuation backslashes
//! removed (`"start \ncontinued"`); [`Stanza::render`] puts them back.

use crate::validators::{STANZA_HEADER, is_ini};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const SEPARATOR: &str = " = ";
const CONTINUATION: char = '\\';

/// One parsed `[name]` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stanza {
    pub name: String,
    /// Sorted by key, which is also the print order.
    pub fields: BTreeMap<String, String>,
    /// Comment lines directly above the header, printed back verbatim.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Stanza {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            comments: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parse a single stanza. Returns `None` unless the text is a stanza.
    pub fn parse(text: &str) -> Option<Self> {
        if !is_ini(text) {
            return None;
        }

        let mut lines = text.trim_start().lines();
        let header = lines.next()?;
        let name = STANZA_HEADER.captures(header)?.get(1)?.as_str().to_string();

        let mut fields: BTreeMap<String, String> = BTreeMap::new();
        let mut continuation: Option<String> = None;

        for line in lines {
            if let Some(key) = continuation.take() {
                let (segment, continues) = split_continuation(line);
                if let Some(value) = fields.get_mut(&key) {
                    value.push('\n');
                    value.push_str(segment);
                }
                if continues {
                    continuation = Some(key);
                }
                continue;
            }

            if let Some((key, value)) = line.split_once(SEPARATOR) {
                let key = key.trim().to_string();
                let (value, continues) = split_continuation(value.trim());
                fields.insert(key.clone(), value.to_string());
                if continues {
                    continuation = Some(key);
                }
            }
        }

        Some(Self {
            name,
            fields,
            comments: Vec::new(),
        })
    }

    /// Like [`parse`](Self::parse), but first sets aside `#` / `;` comment
    /// lines above the header. They are kept and rendered back.
    pub fn parse_commented(text: &str) -> Option<Self> {
        let text = text.trim_start();
        let mut comments = Vec::new();
        let mut rest = text;
        while let Some(line) = rest.lines().next().filter(|line| is_comment(line)) {
            comments.push(line.trim_end().to_string());
            rest = rest[line.len()..].trim_start_matches(['\r', '\n']);
        }
        let mut stanza = Self::parse(rest)?;
        stanza.comments = comments;
        Some(stanza)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Replace a field value iff the key exists.
    pub fn fix(&mut self, key: &str, value: impl Into<String>) -> bool {
        self.fix_with(key, |_| value.into())
    }

    /// Replace a field with `transform(current)` iff the key exists.
    pub fn fix_with(&mut self, key: &str, transform: impl FnOnce(&str) -> String) -> bool {
        match self.fields.get_mut(key) {
            Some(value) => {
                *value = transform(value);
                true
            }
            None => false,
        }
    }

    /// `[name]\nkey = value\n...`, keys in lexicographic order, preceded by
    /// any comment lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for comment in &self.comments {
            out.push_str(comment);
            out.push('\n');
        }
        out.push_str(&render(&self.name, &self.fields));
        out
    }
}

impl fmt::Display for Stanza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render a header and a field map as one stanza.
pub fn render(name: &str, fields: &BTreeMap<String, String>) -> String {
    let mut out = format!("[{}]\n", name);
    for (key, value) in fields {
        out.push_str(key);
        out.push_str(SEPARATOR);
        out.push_str(&value.replace('\n', "\\\n"));
        out.push('\n');
    }
    out
}

fn is_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('#') || line.starts_with(';')
}

/// Strip one trailing continuation backslash, reporting whether it was there.
fn split_continuation(segment: &str) -> (&str, bool) {
    match segment.strip_suffix(CONTINUATION) {
        Some(rest) => (rest, true),
        None => (segment, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_fields() {
        let stanza =
            Stanza::parse("[artifact name]\nowner = admin\nsearch = index=foobar\n").unwrap();
        assert_eq!(stanza.name, "artifact name");
        assert_eq!(stanza.get("owner"), Some("admin"));
        assert_eq!(stanza.get("search"), Some("index=foobar"));
        assert_eq!(stanza.fields.len(), 2);
    }

    #[test]
    fn test_parse_continuation() {
        let stanza = Stanza::parse("[svc]\ncmd = start\\\ncontinued\nport = 8080\n").unwrap();
        assert_eq!(stanza.name, "svc");
        assert_eq!(stanza.get("cmd"), Some("start\ncontinued"));
        assert_eq!(stanza.get("port"), Some("8080"));
    }

    #[test]
    fn test_parse_chained_continuation() {
        let stanza = Stanza::parse("[s]\nsearch = a | \\\nb | \\\nc\nnext = 1").unwrap();
        assert_eq!(stanza.get("search"), Some("a | \nb | \nc"));
        assert_eq!(stanza.get("next"), Some("1"));
    }

    #[test]
    fn test_escaped_n_is_not_a_continuation() {
        let stanza =
            Stanza::parse("[artifact name]\nsearch = index=foobar some | \\nsearch terms").unwrap();
        assert_eq!(stanza.get("search"), Some("index=foobar some | \\nsearch terms"));
    }

    #[test]
    fn test_skips_unstructured_lines() {
        let stanza = Stanza::parse("[a]\n# comment\nk=1\nkey = v = w\n").unwrap();
        assert_eq!(stanza.fields.len(), 1);
        assert_eq!(stanza.get("key"), Some("v = w"));
    }

    #[test]
    fn test_empty_name() {
        let stanza = Stanza::parse("[]\naccess = read : [ * ]\n").unwrap();
        assert_eq!(stanza.name, "");
        assert_eq!(stanza.get("access"), Some("read : [ * ]"));
    }

    #[test]
    fn test_parse_commented() {
        let text = "# owner: ops\n; reviewed\n[b]\nk = 2\n";
        assert!(Stanza::parse(text).is_none());

        let stanza = Stanza::parse_commented(text).unwrap();
        assert_eq!(stanza.name, "b");
        assert_eq!(stanza.comments, vec!["# owner: ops", "; reviewed"]);
        assert_eq!(stanza.render(), text);

        let plain = Stanza::parse_commented("[a]\nk = 1\n").unwrap();
        assert!(plain.comments.is_empty());
        assert!(Stanza::parse_commented("# only a comment").is_none());
        assert!(Stanza::parse_commented("# comment\n[header only]").is_none());
    }

    #[test]
    fn test_rejects_non_stanza() {
        assert!(Stanza::parse("not an ini string").is_none());
        assert!(Stanza::parse("[header only]\n").is_none());
        assert!(Stanza::parse("").is_none());
    }

    #[test]
    fn test_render_sorted() {
        let stanza = Stanza::new("test ini stanza")
            .with_field("zeta", "maybe")
            .with_field("enabled", "true")
            .with_field("queue", "false");
        assert_eq!(
            stanza.render(),
            "[test ini stanza]\nenabled = true\nqueue = false\nzeta = maybe\n"
        );
    }

    #[test]
    fn test_render_round_trip() {
        let source = "[svc]\nport = 8080\ncmd = start \\\ncontinued\nalpha = 1\n";
        let stanza = Stanza::parse(source).unwrap();
        let printed = stanza.render();
        assert_eq!(printed, "[svc]\nalpha = 1\ncmd = start \\\ncontinued\nport = 8080\n");
        assert_eq!(Stanza::parse(&printed).unwrap(), stanza);
    }

    #[test]
    fn test_fix() {
        let mut stanza = Stanza::parse("[a]\nkey = val\n").unwrap();
        assert!(stanza.fix("key", "new val"));
        assert_eq!(stanza.get("key"), Some("new val"));

        let before = stanza.clone();
        assert!(!stanza.fix("missing", "x"));
        assert_eq!(stanza, before);
    }

    #[test]
    fn test_fix_with() {
        let mut stanza = Stanza::parse("[a]\nkey = val\n").unwrap();
        assert!(stanza.fix_with("key", |v| v.replacen("va", "Va", 1) + "ue"));
        assert_eq!(stanza.get("key"), Some("Value"));
    }
}
