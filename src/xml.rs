//! Minimal XML element tree.
//!
//! Built on `quick-xml` events. Keeps comments, declarations and whitespace
//! so an unmodified document prints back close to its source. Supports the
//! two operations patches need: descendant lookup by tag name and text
//! replacement.

use quick_xml::Reader;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use std::fmt;

/// A node inside an element or at document level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    /// `<?...?>` declarations and processing instructions, inner text only.
    Instruction(String),
    DocType(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// A parsed document: prolog, one root element, trailing misc nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    fn collect<'a>(&'a self, tag: &str, out: &mut Vec<&'a XmlElement>) {
        for child in self.elements() {
            if child.name == tag {
                out.push(child);
            }
            child.collect(tag, out);
        }
    }

    fn visit_mut(&mut self, tag: &str, f: &mut dyn FnMut(&mut XmlElement)) -> usize {
        let mut hits = 0;
        for node in &mut self.children {
            if let XmlNode::Element(child) = node {
                if child.name == tag {
                    f(child);
                    hits += 1;
                }
                // A matched element may have had its children replaced.
                hits += child.visit_mut(tag, f);
            }
        }
        hits
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        write_nodes(&self.children, out);
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl XmlDocument {
    /// Parse a document. Returns `None` for malformed XML or no root element.
    pub fn parse(source: &str) -> Option<Self> {
        let mut reader = Reader::from_str(source);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut nodes: Vec<XmlNode> = Vec::new();

        loop {
            let node = match reader.read_event().ok()? {
                Event::Start(start) => {
                    stack.push(element_from(&start)?);
                    continue;
                }
                Event::End(_) => XmlNode::Element(stack.pop()?),
                Event::Empty(start) => XmlNode::Element(element_from(&start)?),
                Event::Text(text) => {
                    let value = match text.unescape() {
                        Ok(value) => value.into_owned(),
                        Err(_) => String::from_utf8_lossy(&text).into_owned(),
                    };
                    XmlNode::Text(value)
                }
                Event::CData(data) => {
                    XmlNode::CData(String::from_utf8_lossy(&data.into_inner()).into_owned())
                }
                Event::Comment(comment) => {
                    XmlNode::Comment(String::from_utf8_lossy(&comment).into_owned())
                }
                Event::Decl(decl) => {
                    XmlNode::Instruction(String::from_utf8_lossy(&decl).into_owned())
                }
                Event::PI(pi) => XmlNode::Instruction(String::from_utf8_lossy(&pi).into_owned()),
                Event::DocType(doctype) => {
                    XmlNode::DocType(String::from_utf8_lossy(&doctype).into_owned())
                }
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        let has_root = nodes.iter().any(|n| matches!(n, XmlNode::Element(_)));
        if !stack.is_empty() || !has_root {
            return None;
        }
        Some(Self { nodes })
    }

    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn root_mut(&mut self) -> Option<&mut XmlElement> {
        self.nodes.iter_mut().find_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Every element named `tag`, root included, in document order.
    pub fn descendants(&self, tag: &str) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        if let Some(root) = self.root() {
            if root.name == tag {
                out.push(root);
            }
            root.collect(tag, &mut out);
        }
        out
    }

    pub fn has(&self, tag: &str) -> bool {
        !self.descendants(tag).is_empty()
    }

    /// Apply `f` to every element named `tag`. Returns how many matched.
    pub fn for_each_mut(&mut self, tag: &str, mut f: impl FnMut(&mut XmlElement)) -> usize {
        let Some(root) = self.root_mut() else {
            return 0;
        };
        let mut hits = 0;
        if root.name == tag {
            f(root);
            hits += 1;
        }
        hits + root.visit_mut(tag, &mut f)
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        write_nodes(&self.nodes, &mut out);
        out
    }
}

impl fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}

fn element_from(start: &BytesStart<'_>) -> Option<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.ok()?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = match attribute.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attribute.value).into_owned(),
        };
        attributes.push((key, value));
    }
    Some(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn collect_text(nodes: &[XmlNode], out: &mut String) {
    for node in nodes {
        match node {
            XmlNode::Text(text) | XmlNode::CData(text) => out.push_str(text),
            XmlNode::Element(element) => collect_text(&element.children, out),
            _ => {}
        }
    }
}

fn write_nodes(nodes: &[XmlNode], out: &mut String) {
    for node in nodes {
        match node {
            XmlNode::Element(element) => element.write(out),
            XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
            XmlNode::CData(text) => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            XmlNode::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            XmlNode::Instruction(text) => {
                out.push_str("<?");
                out.push_str(text);
                out.push_str("?>");
            }
            XmlNode::DocType(text) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(text);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: &str = "<?xml version=\"1.0\"?>\n<view name=\"main\">\n  <row>\n    <query>index=mpos | stats count</query>\n  </row>\n  <query>index=web</query>\n  <!-- footer -->\n</view>\n";

    #[test]
    fn test_parse_root() {
        let doc = XmlDocument::parse(VIEW).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.name, "view");
        assert_eq!(root.attribute("name"), Some("main"));
    }

    #[test]
    fn test_descendants_by_tag() {
        let doc = XmlDocument::parse(VIEW).unwrap();
        let queries = doc.descendants("query");
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].text(), "index=mpos | stats count");
        assert_eq!(queries[1].text(), "index=web");
        assert!(doc.has("row"));
        assert!(!doc.has("not.a.tag.at.all"));
    }

    #[test]
    fn test_round_trip_unmodified() {
        let doc = XmlDocument::parse(VIEW).unwrap();
        assert_eq!(doc.to_xml_string(), VIEW);
    }

    #[test]
    fn test_set_text() {
        let mut doc = XmlDocument::parse(VIEW).unwrap();
        let hits = doc.for_each_mut("query", |q| q.set_text("lol all replaced"));
        assert_eq!(hits, 2);
        for query in doc.descendants("query") {
            assert_eq!(query.text(), "lol all replaced");
        }
        assert!(doc.to_xml_string().contains("<query>lol all replaced</query>"));
    }

    #[test]
    fn test_escaping() {
        let doc = XmlDocument::parse("<a k=\"x &amp; y\">1 &lt; 2</a>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.attribute("k"), Some("x & y"));
        assert_eq!(root.text(), "1 < 2");
        assert_eq!(doc.to_xml_string(), "<a k=\"x &amp; y\">1 &lt; 2</a>");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(XmlDocument::parse("<open><close></open>").is_none());
        assert!(XmlDocument::parse("<open>").is_none());
        assert!(XmlDocument::parse("this is a sentence").is_none());
    }
}
