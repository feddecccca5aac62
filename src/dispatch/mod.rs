//! Format dispatch: choosing a parser or printer for a piece of content.
//!
//! Parsers are picked by classifying the content (or, when given, a file
//! name hint); printers by classifying the parsed data (or the hint). All
//! four families live in [`SharedRegistry`] instances so new formats can be
//! registered at runtime without touching this module.
//!
//! ## Fallbacks
//! - `parse` never fails on non-empty input: content no parser claims, or
//!   that the chosen parser declines, comes back as [`Data::Text`].
//! - `print` always produces a string: a hinted printer is tried first, then
//!   a data-classified one, then the `Display` rendering.

pub mod parsers;
pub mod printers;

use crate::artifact::Artifact;
use crate::registry::SharedRegistry;
use crate::stanza::Stanza;
use crate::xml::XmlDocument;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;

pub use parsers::{ConfParser, FileParser, ListParser, StanzaParser, XmlParser, YamlParser};
pub use printers::{ConfPrinter, DefaultPrinter, IniPrinter, XmlPrinter, YamlPrinter};

/// Parsed payload of a piece of content.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Opaque text: the identity fallback.
    Text(String),
    /// Whitespace-separated tokens.
    List(Vec<String>),
    Stanza(Stanza),
    Yaml(serde_yaml::Value),
    Xml(XmlDocument),
    /// Raw stanza substrings of a conf file, in file order.
    Sections(Vec<String>),
    /// Child artifacts of a conf file, in file order.
    Conf(Vec<Artifact>),
}

impl Data {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Data::Text(_) => "text",
            Data::List(_) => "list",
            Data::Stanza(_) => "stanza",
            Data::Yaml(_) => "yaml",
            Data::Xml(_) => "xml",
            Data::Sections(_) => "sections",
            Data::Conf(_) => "conf",
        }
    }

    /// Look up a named value inside the data.
    ///
    /// Stanzas answer with a field, YAML mappings with a top-level key, XML
    /// with the text of the first element carrying that tag, and conf data
    /// with the first child stanza that has the key.
    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            Data::Stanza(stanza) => stanza.get(key).map(str::to_string),
            Data::Yaml(serde_yaml::Value::Mapping(map)) => map.get(key).map(yaml_scalar),
            Data::Xml(doc) => doc.descendants(key).first().map(|element| element.text()),
            Data::Conf(children) => children.iter().find_map(|child| child.get(key)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Data::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_stanza(&self) -> Option<&Stanza> {
        match self {
            Data::Stanza(stanza) => Some(stanza),
            _ => None,
        }
    }
}

/// Render a YAML node the way it would read in a config value.
pub(crate) fn yaml_scalar(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Text(text) => f.write_str(text),
            Data::List(items) => f.write_str(&items.join("\n")),
            Data::Stanza(stanza) => f.write_str(&stanza.render()),
            Data::Yaml(value) => write!(
                f,
                "---\n{}",
                serde_yaml::to_string(value).unwrap_or_default()
            ),
            Data::Xml(doc) => f.write_str(&doc.to_xml_string()),
            Data::Sections(sections) => f.write_str(&sections.join("\n\n")),
            Data::Conf(_) => f.write_str(&ConfPrinter.print(self).unwrap_or_default()),
        }
    }
}

/// Turns text into [`Data`].
pub trait Parser: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` means the parser declines this content.
    fn parse(&self, content: &str) -> Option<Data>;
}

/// Turns [`Data`] back into text.
pub trait Printer: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` means the printer does not handle this data shape.
    fn print(&self, data: &Data) -> Option<String>;
}

/// The four registries that drive dispatch.
#[derive(Debug, Default)]
pub struct Formats {
    /// Parsers classified by content.
    pub parsers: SharedRegistry<str, Arc<dyn Parser>>,
    /// Parsers classified by file name.
    pub parser_hints: SharedRegistry<str, Arc<dyn Parser>>,
    /// Printers classified by data shape.
    pub printers: SharedRegistry<Data, Arc<dyn Printer>>,
    /// Printers classified by file name.
    pub printer_hints: SharedRegistry<str, Arc<dyn Printer>>,
}

impl Formats {
    /// Registries with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fresh instance holding the builtin formats.
    pub fn builtin() -> Self {
        Self {
            parsers: SharedRegistry::new(parsers::builtin()),
            parser_hints: SharedRegistry::new(parsers::builtin_hints()),
            printers: SharedRegistry::new(printers::builtin()),
            printer_hints: SharedRegistry::new(printers::builtin_hints()),
        }
    }

    /// The parser that would handle `content`, with its registered name.
    pub fn parser_for(
        &self,
        content: &str,
        hint: Option<&str>,
    ) -> Option<(String, Arc<dyn Parser>)> {
        hint.and_then(|hint| self.parser_hints.find_named(hint))
            .or_else(|| self.parsers.find_named(content))
    }

    /// Parse `content`, consulting `hint` (a file name) first.
    ///
    /// Returns `None` only for empty content.
    pub fn parse(&self, content: &str, hint: Option<&str>) -> Option<Data> {
        if content.is_empty() {
            return None;
        }

        let Some((name, parser)) = self.parser_for(content, hint) else {
            debug!(hint = ?hint, "no parser matched, keeping text");
            return Some(Data::Text(content.to_string()));
        };

        match parser.parse(content) {
            Some(data) => {
                debug!(parser = %name, hint = ?hint, data = data.label(), "parsed content");
                Some(data)
            }
            None => {
                debug!(parser = %name, hint = ?hint, "parser declined, keeping text");
                Some(Data::Text(content.to_string()))
            }
        }
    }

    /// Render `data`, consulting `hint` (a file name) first.
    pub fn print(&self, data: &Data, hint: Option<&str>) -> String {
        if let Some((name, printer)) = hint.and_then(|hint| self.printer_hints.find_named(hint))
        {
            if let Some(out) = printer.print(data) {
                debug!(printer = %name, hint = ?hint, "printed by hint");
                return out;
            }
        }

        if let Some((name, printer)) = self.printers.find_named(data) {
            if let Some(out) = printer.print(data) {
                debug!(printer = %name, data = data.label(), "printed by data shape");
                return out;
            }
        }

        DefaultPrinter.print(data).unwrap_or_default()
    }
}

static FORMATS: LazyLock<Formats> = LazyLock::new(Formats::builtin);

/// Process-wide format registries.
pub fn formats() -> &'static Formats {
    &FORMATS
}

/// Parse through the process-wide registries.
pub fn parse(content: &str, hint: Option<&str>) -> Option<Data> {
    formats().parse(content, hint)
}

/// Print through the process-wide registries.
pub fn print(data: &Data, hint: Option<&str>) -> String {
    formats().print(data, hint)
}
