//! Builtin parsers.
//!
//! Content registration order is significant: stanza, yaml, xml, file,
//! conf, list. A multi-stanza conf blob never matches the stanza predicate
//! (see [`is_ini`]), so the order only decides between formats that could
//! genuinely overlap.

use super::{Data, Parser};
use crate::registry::Registry;
use crate::stanza::Stanza;
use crate::validators::{is_conf, is_file, is_ini, is_list, is_xml, is_yaml};
use crate::xml::XmlDocument;
use regex_lite::Regex;
use std::sync::{Arc, LazyLock};

/// Blank line, possibly holding stray whitespace.
static SECTION_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").expect("valid section regex"));

pub struct StanzaParser;

impl Parser for StanzaParser {
    fn name(&self) -> &'static str {
        "stanza"
    }

    fn parse(&self, content: &str) -> Option<Data> {
        Stanza::parse(content).map(Data::Stanza)
    }
}

pub struct YamlParser;

impl Parser for YamlParser {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, content: &str) -> Option<Data> {
        serde_yaml::from_str::<serde_yaml::Value>(content)
            .ok()
            .map(Data::Yaml)
    }
}

pub struct XmlParser;

impl Parser for XmlParser {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn parse(&self, content: &str) -> Option<Data> {
        XmlDocument::parse(content).map(Data::Xml)
    }
}

/// Content that names a local file: read it, then parse what it holds.
pub struct FileParser;

impl Parser for FileParser {
    fn name(&self) -> &'static str {
        "file"
    }

    fn parse(&self, content: &str) -> Option<Data> {
        let body = std::fs::read_to_string(content).ok()?;
        // One level of indirection only.
        if is_file(&body) {
            return Some(Data::Text(body));
        }
        super::parse(&body, Some(content))
    }
}

/// Splits a conf file into its stanza sections.
pub struct ConfParser;

impl ConfParser {
    pub fn sections(content: &str) -> Vec<String> {
        SECTION_BREAK
            .split(content)
            .map(str::trim)
            .filter(|section| !section.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Parser for ConfParser {
    fn name(&self) -> &'static str {
        "conf"
    }

    fn parse(&self, content: &str) -> Option<Data> {
        let sections = Self::sections(content);
        if sections.is_empty() {
            return None;
        }
        Some(Data::Sections(sections))
    }
}

pub struct ListParser;

impl Parser for ListParser {
    fn name(&self) -> &'static str {
        "list"
    }

    fn parse(&self, content: &str) -> Option<Data> {
        Some(Data::List(
            content.split_whitespace().map(str::to_string).collect(),
        ))
    }
}

/// `name.ends_with` over several extensions.
pub(crate) fn has_extension(name: &str, extensions: &[&str]) -> bool {
    let file = name.rsplit('/').next().unwrap_or(name);
    extensions.iter().any(|ext| {
        file.strip_suffix(ext)
            .is_some_and(|stem| stem.ends_with('.') && stem.len() > 1)
    })
}

pub(crate) fn is_conf_name(name: &str) -> bool {
    has_extension(name, &["conf", "meta"])
}

pub(crate) fn is_xml_name(name: &str) -> bool {
    has_extension(name, &["xml"])
}

pub(crate) fn is_yaml_name(name: &str) -> bool {
    has_extension(name, &["yml", "yaml"])
}

/// Content-classified parsers in dispatch order.
pub fn builtin() -> Registry<str, Arc<dyn Parser>> {
    let mut registry: Registry<str, Arc<dyn Parser>> = Registry::new();
    registry.register("stanza", is_ini, Arc::new(StanzaParser));
    registry.register("yaml", is_yaml, Arc::new(YamlParser));
    registry.register("xml", is_xml, Arc::new(XmlParser));
    registry.register("file", is_file, Arc::new(FileParser));
    registry.register("conf", is_conf, Arc::new(ConfParser));
    registry.register("list", is_list, Arc::new(ListParser));
    registry
}

/// File-name-classified parsers.
pub fn builtin_hints() -> Registry<str, Arc<dyn Parser>> {
    let mut registry: Registry<str, Arc<dyn Parser>> = Registry::new();
    registry.register("conf", is_conf_name, Arc::new(ConfParser));
    registry.register("xml", is_xml_name, Arc::new(XmlParser));
    registry.register("yaml", is_yaml_name, Arc::new(YamlParser));
    registry
}
