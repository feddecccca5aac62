//! Integration tests for format dispatch and registry extension.

use conf_migrate::dispatch::{self, Data, Formats, Parser, Printer};
use conf_migrate::registry::Registry;
use std::io::Write;
use std::sync::Arc;

/// Comma-separated values, one item per field.
struct CsvParser;

impl Parser for CsvParser {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn parse(&self, content: &str) -> Option<Data> {
        Some(Data::List(
            content.trim().split(',').map(|f| f.trim().to_string()).collect(),
        ))
    }
}

struct CsvPrinter;

impl Printer for CsvPrinter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn print(&self, data: &Data) -> Option<String> {
        match data {
            Data::List(items) => Some(items.join(",")),
            _ => None,
        }
    }
}

#[test]
fn test_registry_exact_match() {
    let mut registry: Registry<str, u32> = Registry::new();
    registry.register("passme", |candidate: &str| candidate == "passme", 7);
    assert_eq!(registry.find("passme"), Some(&7));
    assert_eq!(registry.find("other"), None);
}

#[test]
fn test_empty_and_unknown_content() {
    assert_eq!(dispatch::parse("", None), None);
    assert_eq!(
        dispatch::parse("single line", None),
        Some(Data::Text("single line".to_string()))
    );
}

#[test]
fn test_list_for_unstructured_lines() {
    let data = dispatch::parse("alpha beta\ngamma\n", None).unwrap();
    assert_eq!(
        data,
        Data::List(vec!["alpha".into(), "beta".into(), "gamma".into()])
    );
}

#[test]
fn test_conf_by_hint_then_print() {
    let content = "[b]\nz = 1\na = 2\n\n[a]\nk = v\n";
    let data = dispatch::parse(content, Some("local/props.conf")).unwrap();
    assert_eq!(
        data,
        Data::Sections(vec!["[b]\nz = 1\na = 2".into(), "[a]\nk = v".into()])
    );
    assert_eq!(
        dispatch::print(&data, Some("local/props.conf")),
        "[b]\na = 2\nz = 1\n\n[a]\nk = v\n"
    );
}

#[test]
fn test_file_indirection() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[svc]\nport = 8080\n").unwrap();
    let path = file.path().to_string_lossy().to_string();

    let data = dispatch::parse(&path, None).unwrap();
    assert_eq!(data.as_stanza().map(|s| s.name.as_str()), Some("svc"));
    assert_eq!(data.get("port").as_deref(), Some("8080"));
}

#[test]
fn test_extend_with_new_format() {
    let formats = Formats::builtin();
    formats.parser_hints.register(
        "csv",
        |name: &str| name.ends_with(".csv"),
        Arc::new(CsvParser) as Arc<dyn Parser>,
    );
    formats.printer_hints.register(
        "csv",
        |name: &str| name.ends_with(".csv"),
        Arc::new(CsvPrinter) as Arc<dyn Printer>,
    );

    let data = formats.parse("a, b,c\n", Some("lookups/hosts.csv")).unwrap();
    assert_eq!(data, Data::List(vec!["a".into(), "b".into(), "c".into()]));
    assert_eq!(formats.print(&data, Some("lookups/hosts.csv")), "a,b,c");

    // The process-wide instance is untouched.
    assert_eq!(
        dispatch::parse("a, b,c", Some("lookups/hosts.csv")),
        Some(Data::Text("a, b,c".to_string()))
    );
}

#[test]
fn test_printer_hint_declines_then_shape_wins() {
    let formats = Formats::builtin();
    formats.printer_hints.register(
        "csv",
        |name: &str| name.ends_with(".csv"),
        Arc::new(CsvPrinter) as Arc<dyn Printer>,
    );
    let data = formats.parse("[s]\nk = v\n", None).unwrap();
    assert_eq!(formats.print(&data, Some("odd.csv")), "[s]\nk = v\n");
}
