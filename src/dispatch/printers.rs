//! Builtin printers.

use super::parsers::{is_conf_name, is_xml_name, is_yaml_name};
use super::{Data, Printer};
use crate::registry::Registry;
use crate::stanza::Stanza;
use std::sync::Arc;

/// `[name]` followed by `key = value` lines, sorted by key.
pub struct IniPrinter;

impl Printer for IniPrinter {
    fn name(&self) -> &'static str {
        "ini"
    }

    fn print(&self, data: &Data) -> Option<String> {
        data.as_stanza().map(Stanza::render)
    }
}

/// Stanzas separated by one blank line.
pub struct ConfPrinter;

impl ConfPrinter {
    fn section(section: &str) -> String {
        match Stanza::parse_commented(section) {
            Some(stanza) => stanza.render(),
            None => format!("{}\n", section),
        }
    }
}

impl Printer for ConfPrinter {
    fn name(&self) -> &'static str {
        "conf"
    }

    fn print(&self, data: &Data) -> Option<String> {
        let pieces: Vec<String> = match data {
            Data::Conf(children) => children
                .iter()
                .map(|child| terminated(child.print()))
                .collect(),
            Data::Sections(sections) => sections.iter().map(|s| Self::section(s)).collect(),
            Data::Stanza(stanza) => vec![stanza.render()],
            _ => return None,
        };
        Some(pieces.join("\n"))
    }
}

fn terminated(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

pub struct YamlPrinter;

impl Printer for YamlPrinter {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn print(&self, data: &Data) -> Option<String> {
        match data {
            Data::Yaml(value) => {
                let body = serde_yaml::to_string(value).ok()?;
                Some(format!("---\n{}", body))
            }
            _ => None,
        }
    }
}

pub struct XmlPrinter;

impl Printer for XmlPrinter {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn print(&self, data: &Data) -> Option<String> {
        match data {
            Data::Xml(doc) => Some(doc.to_xml_string()),
            _ => None,
        }
    }
}

/// Generic string conversion; handles everything.
pub struct DefaultPrinter;

impl Printer for DefaultPrinter {
    fn name(&self) -> &'static str {
        "default"
    }

    fn print(&self, data: &Data) -> Option<String> {
        Some(data.to_string())
    }
}

/// Data-classified printers.
pub fn builtin() -> Registry<Data, Arc<dyn Printer>> {
    let mut registry: Registry<Data, Arc<dyn Printer>> = Registry::new();
    registry.register(
        "ini",
        |data: &Data| matches!(data, Data::Stanza(_)),
        Arc::new(IniPrinter),
    );
    registry.register(
        "conf",
        |data: &Data| matches!(data, Data::Sections(_) | Data::Conf(_)),
        Arc::new(ConfPrinter),
    );
    registry.register(
        "yaml",
        |data: &Data| matches!(data, Data::Yaml(_)),
        Arc::new(YamlPrinter),
    );
    registry.register(
        "xml",
        |data: &Data| matches!(data, Data::Xml(_)),
        Arc::new(XmlPrinter),
    );
    registry
}

/// File-name-classified printers.
pub fn builtin_hints() -> Registry<str, Arc<dyn Printer>> {
    let mut registry: Registry<str, Arc<dyn Printer>> = Registry::new();
    registry.register("conf", is_conf_name, Arc::new(ConfPrinter));
    registry.register("xml", is_xml_name, Arc::new(XmlPrinter));
    registry.register("yaml", is_yaml_name, Arc::new(YamlPrinter));
    registry
}
