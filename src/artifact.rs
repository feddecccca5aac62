//! Parsed-data containers for configuration content.
//!
//! An [`Artifact`] keeps the source text it was built from and the [`Data`]
//! parsed out of it. The artifact kind is chosen once, at construction, from
//! the kind registry:
//!
//! | Kind | Chosen when | Data |
//! |---|---|---|
//! | `Conf` | multi-stanza text, or a `*.conf` / `*.meta` file | child artifacts |
//! | `Ini` | one `[name]` stanza | [`Stanza`] |
//! | `Xml` | an XML document, or a `*.xml` file | element tree |
//! | `Text` | a conf section that is not a stanza (e.g. a comment block) | the text itself |
//! | `Generic` | anything else | whatever the dispatcher finds |
//!
//! Parsing never fails. Content that the kind's parser cannot read is kept
//! as [`Data::Text`], and [`Artifact::fix`] simply reports `false`.

use crate::dispatch::parsers::{ConfParser, is_conf_name, is_xml_name};
use crate::dispatch::{self, Data, Parser, Printer, yaml_scalar};
use crate::registry::{Registry, SharedRegistry};
use crate::stanza::Stanza;
use crate::validators::{is_conf, is_ini, is_xml};
use crate::xml::XmlDocument;
use regex_lite::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Which parsing strategy an artifact uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Generic,
    Conf,
    Ini,
    Xml,
    /// Opaque text, never re-dispatched.
    Text,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Generic => "generic",
            ArtifactKind::Conf => "conf",
            ArtifactKind::Ini => "ini",
            ArtifactKind::Xml => "xml",
            ArtifactKind::Text => "text",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static KINDS: LazyLock<SharedRegistry<str, ArtifactKind>> = LazyLock::new(|| {
    let mut registry = Registry::new();
    registry.register("conf", is_conf, ArtifactKind::Conf);
    registry.register("ini", is_ini, ArtifactKind::Ini);
    registry.register("xml", is_xml, ArtifactKind::Xml);
    SharedRegistry::new(registry)
});

static KIND_HINTS: LazyLock<SharedRegistry<str, ArtifactKind>> = LazyLock::new(|| {
    let mut registry = Registry::new();
    registry.register("conf", is_conf_name, ArtifactKind::Conf);
    registry.register("xml", is_xml_name, ArtifactKind::Xml);
    SharedRegistry::new(registry)
});

/// Artifact kinds classified by content. No match means `Generic`.
pub fn kinds() -> &'static SharedRegistry<str, ArtifactKind> {
    &KINDS
}

/// Artifact kinds classified by file name, consulted before content.
pub fn kind_hints() -> &'static SharedRegistry<str, ArtifactKind> {
    &KIND_HINTS
}

/// Source text plus the data parsed from it.
#[derive(Clone)]
pub struct Artifact {
    content: String,
    data: Data,
    kind: ArtifactKind,
    /// File name used as a dispatch hint.
    path: Option<String>,
    printer: Option<Arc<dyn Printer>>,
}

impl Artifact {
    /// Build an artifact, choosing its kind from the content.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let kind = kinds().find(&content).unwrap_or(ArtifactKind::Generic);
        Self::build(kind, content, None)
    }

    /// Build an artifact for a file, letting the file name pick the kind.
    pub fn for_file(path: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        let kind = kind_hints()
            .find(path)
            .or_else(|| kinds().find(&content))
            .unwrap_or(ArtifactKind::Generic);
        Self::build(kind, content, Some(path.to_string()))
    }

    /// Build an artifact that parses through the dispatcher only.
    pub fn generic(content: impl Into<String>) -> Self {
        Self::build(ArtifactKind::Generic, content.into(), None)
    }

    pub fn of_kind(kind: ArtifactKind, content: impl Into<String>) -> Self {
        Self::build(kind, content.into(), None)
    }

    fn build(kind: ArtifactKind, content: String, path: Option<String>) -> Self {
        debug!(kind = %kind, path = ?path, "creating artifact");
        let mut artifact = Self {
            content,
            data: Data::Text(String::new()),
            kind,
            path,
            printer: None,
        };
        artifact.parse();
        artifact
    }

    /// Re-parse the source with this artifact's default parser.
    pub fn parse(&mut self) -> &Data {
        let parsed = match self.kind {
            ArtifactKind::Conf => ConfParser.parse(&self.content),
            ArtifactKind::Ini => Stanza::parse_commented(&self.content).map(Data::Stanza),
            ArtifactKind::Xml => XmlDocument::parse(&self.content).map(Data::Xml),
            ArtifactKind::Text => Some(Data::Text(self.content.clone())),
            ArtifactKind::Generic => dispatch::parse(&self.content, self.path.as_deref()),
        };
        self.adopt(parsed)
    }

    /// Re-parse the source with an injected parser.
    pub fn parse_with(&mut self, parser: &dyn Parser) -> &Data {
        let parsed = parser.parse(&self.content);
        self.adopt(parsed)
    }

    /// One section of a conf file: a stanza (comments above the header
    /// included) or opaque text.
    fn section(content: String) -> Artifact {
        let kind = if Stanza::parse_commented(&content).is_some() {
            ArtifactKind::Ini
        } else {
            ArtifactKind::Text
        };
        Self::build(kind, content, None)
    }

    fn adopt(&mut self, parsed: Option<Data>) -> &Data {
        self.data = match parsed {
            Some(Data::Sections(sections)) => {
                Data::Conf(sections.into_iter().map(Artifact::section).collect())
            }
            Some(data) => data,
            None => Data::Text(self.content.clone()),
        };
        &self.data
    }

    /// Render the current data.
    ///
    /// Uses the injected printer when one is set and it handles the data;
    /// otherwise the dispatcher, hinted by the file name.
    pub fn print(&self) -> String {
        if let Some(out) = self.printer.as_ref().and_then(|p| p.print(&self.data)) {
            return out;
        }
        dispatch::print(&self.data, self.path.as_deref())
    }

    /// Render with a one-off printer, falling back like [`print`](Self::print).
    pub fn print_with(&self, printer: &dyn Printer) -> String {
        printer.print(&self.data).unwrap_or_else(|| self.print())
    }

    pub fn set_printer(&mut self, printer: Arc<dyn Printer>) {
        self.printer = Some(printer);
    }

    pub fn printer(&self) -> Option<&Arc<dyn Printer>> {
        self.printer.as_ref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Stanza name of an ini artifact.
    pub fn name(&self) -> Option<&str> {
        self.data.as_stanza().map(|stanza| stanza.name.as_str())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.data.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        match &self.data {
            Data::Stanza(stanza) => stanza.has(key),
            Data::Xml(doc) => doc.has(key),
            Data::Conf(children) => children.iter().any(|child| child.has(key)),
            Data::Yaml(serde_yaml::Value::Mapping(map)) => map.contains_key(key),
            _ => false,
        }
    }

    /// Replace the value under `key`. Returns `false`, changing nothing,
    /// when the key is absent.
    pub fn fix(&mut self, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.fix_dyn(key, &mut |_| value.clone())
    }

    /// Replace the value under `key` with `transform(current)`.
    pub fn fix_with(&mut self, key: &str, mut transform: impl FnMut(&str) -> String) -> bool {
        self.fix_dyn(key, &mut transform)
    }

    fn fix_dyn(&mut self, key: &str, transform: &mut dyn FnMut(&str) -> String) -> bool {
        let fixed = match &mut self.data {
            Data::Stanza(stanza) => stanza.fix_with(key, |current| transform(current)),
            Data::Xml(doc) => {
                let hits = doc.for_each_mut(key, |element| {
                    let current = element.text();
                    element.set_text(transform(&current));
                });
                hits > 0
            }
            Data::Conf(children) => {
                let mut fixed = false;
                for child in children.iter_mut() {
                    fixed |= child.fix_dyn(key, transform);
                }
                fixed
            }
            Data::Yaml(serde_yaml::Value::Mapping(map)) => match map.get_mut(key) {
                Some(value) => {
                    let current = yaml_scalar(value);
                    *value = serde_yaml::Value::String(transform(&current));
                    true
                }
                None => false,
            },
            _ => false,
        };
        debug!(key, fixed, kind = %self.kind, "fix");
        fixed
    }

    /// Child stanzas of a conf artifact, in file order.
    pub fn stanzas(&self) -> &[Artifact] {
        match &self.data {
            Data::Conf(children) => children,
            _ => &[],
        }
    }

    pub fn stanzas_mut(&mut self) -> &mut [Artifact] {
        match &mut self.data {
            Data::Conf(children) => children,
            _ => &mut [],
        }
    }

    /// First child stanza with exactly this name.
    pub fn find(&self, name: &str) -> Option<&Artifact> {
        self.stanzas()
            .iter()
            .find(|child| child.name() == Some(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Artifact> {
        self.stanzas_mut()
            .iter_mut()
            .find(|child| child.name() == Some(name))
    }

    /// First child stanza whose name matches `pattern`.
    pub fn find_matching(&self, pattern: &Regex) -> Option<&Artifact> {
        self.stanzas()
            .iter()
            .find(|child| child.name().is_some_and(|name| pattern.is_match(name)))
    }

    /// Append a stanza to a conf artifact. Returns `false` for other kinds.
    pub fn append(&mut self, stanza: impl Into<Artifact>) -> bool {
        match &mut self.data {
            Data::Conf(children) => {
                children.push(stanza.into());
                true
            }
            _ => false,
        }
    }
}

impl From<String> for Artifact {
    fn from(content: String) -> Self {
        Artifact::new(content)
    }
}

impl From<&str> for Artifact {
    fn from(content: &str) -> Self {
        Artifact::new(content)
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("data", &self.data)
            .field("printer", &self.printer.as_ref().map(|p| p.name()))
            .finish()
    }
}

/// Equal when built from the same source and holding the same data.
impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.content == other.content
            && self.path == other.path
            && self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INI: &str = "[artifact name]\nkey = val\n";

    struct Split;

    impl Parser for Split {
        fn name(&self) -> &'static str {
            "split"
        }

        fn parse(&self, content: &str) -> Option<Data> {
            Some(Data::List(
                content.split_whitespace().map(str::to_string).collect(),
            ))
        }
    }

    struct Pirate;

    impl Printer for Pirate {
        fn name(&self) -> &'static str {
            "pirate"
        }

        fn print(&self, _data: &Data) -> Option<String> {
            Some("Damn yer pirate, feed the ale.".to_string())
        }
    }

    #[test]
    fn test_generic_keeps_source() {
        let art = Artifact::new("a string of text");
        assert_eq!(art.kind(), ArtifactKind::Generic);
        assert_eq!(art.content(), "a string of text");
        assert_eq!(art.data(), &Data::Text("a string of text".to_string()));
        assert_eq!(art.print(), "a string of text");
    }

    #[test]
    fn test_inject_parser() {
        let mut art = Artifact::new("a string of text");
        art.parse_with(&Split);
        assert_eq!(
            art.data(),
            &Data::List(vec!["a".into(), "string".into(), "of".into(), "text".into()])
        );
    }

    #[test]
    fn test_inject_printer() {
        let mut art = Artifact::new(INI);
        assert_eq!(art.print_with(&Pirate), "Damn yer pirate, feed the ale.");
        assert_eq!(art.print(), INI);

        art.set_printer(Arc::new(Pirate));
        assert_eq!(art.print(), "Damn yer pirate, feed the ale.");
        assert_eq!(art.printer().map(|p| p.name()), Some("pirate"));
    }

    #[test]
    fn test_ini_kind() {
        let art = Artifact::new(INI);
        assert_eq!(art.kind(), ArtifactKind::Ini);
        assert_eq!(art.name(), Some("artifact name"));
        assert_eq!(art.get("key").as_deref(), Some("val"));
        assert!(art.has("key"));
        assert!(!art.has("foo"));
    }

    #[test]
    fn test_empty_has_nothing() {
        let art = Artifact::of_kind(ArtifactKind::Ini, "");
        assert!(!art.has("it"));
        assert_eq!(art.data(), &Data::Text(String::new()));
    }

    #[test]
    fn test_fix_present_key() {
        let mut art = Artifact::new(INI);
        assert!(art.fix("key", "new val"));
        assert_eq!(art.get("key").as_deref(), Some("new val"));
        assert_eq!(art.print(), "[artifact name]\nkey = new val\n");
        // Source text is untouched.
        assert_eq!(art.content(), INI);
    }

    #[test]
    fn test_fix_absent_key_is_noop() {
        let mut art = Artifact::new(INI);
        let before = art.clone();
        assert!(!art.fix("missing", "x"));
        assert_eq!(art, before);
    }

    #[test]
    fn test_fix_with() {
        let mut art = Artifact::new(INI);
        assert!(art.fix_with("key", |v| format!("V{}ue", &v[1..])));
        assert_eq!(art.get("key").as_deref(), Some("Value"));
    }

    #[test]
    fn test_conf_children_in_order() {
        let art = Artifact::new("[a]\nk=1\n\n[b]\nk=2\n");
        assert_eq!(art.kind(), ArtifactKind::Conf);
        let names: Vec<_> = art.stanzas().iter().filter_map(Artifact::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(art.stanzas().iter().all(|c| c.kind() == ArtifactKind::Ini));
    }

    #[test]
    fn test_single_stanza_conf_file_is_a_sequence() {
        let art = Artifact::for_file("local/inputs.conf", INI);
        assert_eq!(art.kind(), ArtifactKind::Conf);
        assert_eq!(art.stanzas().len(), 1);
        assert_eq!(art.find("artifact name").map(|a| a.kind()), Some(ArtifactKind::Ini));
    }

    #[test]
    fn test_conf_find() {
        let art = Artifact::new("[Test Cee]\na = 1\n\n[test stb]\nb = 2\n");
        assert!(art.find("Test Cee").is_some());
        assert!(art.find("test").is_none());

        let stb = Regex::new("stb$").unwrap();
        assert_eq!(art.find_matching(&stb).and_then(Artifact::name), Some("test stb"));
        let none = Regex::new("^nomatch$").unwrap();
        assert!(art.find_matching(&none).is_none());
    }

    #[test]
    fn test_conf_append() {
        let mut art = Artifact::new("[a]\nk = 1\n\n[b]\nk = 2\n");
        assert!(art.append("[louis the fourteenth]\nalpha = yes\nbeta = yes\n"));
        let added = art.find("louis the fourteenth").unwrap();
        assert_eq!(added.get("alpha").as_deref(), Some("yes"));

        let existing = Artifact::new("[c]\nk = 3\n");
        assert!(art.append(existing));
        assert_eq!(art.stanzas().len(), 4);

        let mut ini = Artifact::new(INI);
        assert!(!ini.append("[x]\ny = z\n"));
    }

    #[test]
    fn test_conf_fix_reaches_every_stanza() {
        let mut art = Artifact::new("[a]\nk = 1\n\n[b]\nk = 2\n\n[c]\nother = 3\n");
        assert!(art.fix("k", "9"));
        assert_eq!(art.find("a").and_then(|a| a.get("k")).as_deref(), Some("9"));
        assert_eq!(art.find("b").and_then(|a| a.get("k")).as_deref(), Some("9"));
        assert_eq!(art.find("c").and_then(|a| a.get("other")).as_deref(), Some("3"));
    }

    #[test]
    fn test_conf_find_mut() {
        let mut art = Artifact::new("[a]\nk = 1\n\n[b]\nk = 2\n");
        let b = art.find_mut("b").unwrap();
        assert!(b.fix("k", "20"));
        assert_eq!(art.print(), "[a]\nk = 1\n\n[b]\nk = 20\n");
    }

    #[test]
    fn test_xml_fix_all_matching() {
        let mut art = Artifact::new("<view><query>index=mpos</query><row><query>index=mpos x</query></row></view>");
        assert_eq!(art.kind(), ArtifactKind::Xml);
        assert!(art.has("query"));
        assert!(art.fix_with("query", |q| q.replace("index=mpos", "index=mpos*")));
        match art.data() {
            Data::Xml(doc) => {
                for query in doc.descendants("query") {
                    assert!(query.text().starts_with("index=mpos*"));
                }
            }
            other => panic!("expected xml, got {:?}", other),
        }
        assert!(!art.fix("notanode", "does not matter"));
    }

    #[test]
    fn test_yaml_top_level_fix() {
        let mut art = Artifact::for_file("app.yml", "---\nname: web\nport: 80\n");
        assert_eq!(art.kind(), ArtifactKind::Generic);
        assert!(art.fix("port", "8080"));
        assert_eq!(art.get("port").as_deref(), Some("8080"));
        assert!(!art.fix("missing", "x"));
    }

    #[test]
    fn test_kind_registry_extension() {
        let id = kinds().register("codeword", |c: &str| c == "codeword", ArtifactKind::Xml);
        assert_eq!(Artifact::new("codeword").kind(), ArtifactKind::Xml);
        kinds().deregister(id);
        assert_eq!(Artifact::new("codeword").kind(), ArtifactKind::Generic);
    }
}
