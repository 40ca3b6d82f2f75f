//! Minimal element tree for repository documents.
//!
//! Documents are read completely into an [`Element`] tree before any
//! interpretation, so extraction code walks nodes instead of reacting to
//! parser events.

use std::fmt;

use quick_xml::events::Event;
use quick_xml::Reader;

/// An element with its concatenated, trimmed character data and child elements.
/// Attributes are not kept; repository documents don't use them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }
}

/// A document that isn't well-formed, with the parser's messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub messages: Vec<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("; "))
    }
}

impl std::error::Error for ParseError {}

/// Parse a document into its root element.
pub fn parse(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            ParseError::new(format!("{e} at byte {}", reader.buffer_position()))
        })?;
        match event {
            Event::Start(e) => {
                stack.push(Element::named(local_name(e.local_name().as_ref())));
            }
            Event::Empty(e) => {
                let element = Element::named(local_name(e.local_name().as_ref()));
                attach(&mut stack, &mut root, element);
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    current.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                let Some(mut element) = stack.pop() else {
                    return Err(ParseError::new("unexpected closing tag"));
                };
                element.text = element.text.trim().to_string();
                attach(&mut stack, &mut root, element);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::new(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| ParseError::new("document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn local_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_tree() {
        let root = parse(
            r#"<?xml version="1.0"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <groupId>org.example</groupId>
  <dependencies>
    <dependency><artifactId>a</artifactId></dependency>
    <dependency><artifactId>b</artifactId><optional/></dependency>
  </dependencies>
</project>"#,
        )
        .unwrap();
        assert_eq!(root.name, "project");
        assert_eq!(root.child_text("groupId"), Some("org.example"));
        let deps: Vec<_> = root
            .child("dependencies")
            .unwrap()
            .children_named("dependency")
            .collect();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[1].child_text("artifactId"), Some("b"));
        assert_eq!(deps[1].child_text("optional"), Some(""));
    }

    #[test]
    fn unescapes_entities_and_cdata() {
        let root = parse("<a><b>x &amp; y</b><c><![CDATA[<raw>]]></c></a>").unwrap();
        assert_eq!(root.child_text("b"), Some("x & y"));
        assert_eq!(root.child_text("c"), Some("<raw>"));
    }

    #[test]
    fn strips_namespace_prefixes() {
        let root = parse(r#"<m:project xmlns:m="urn:x"><m:version>1</m:version></m:project>"#).unwrap();
        assert_eq!(root.name, "project");
        assert_eq!(root.child_text("version"), Some("1"));
    }

    #[test]
    fn mismatched_tags_are_errors() {
        assert!(parse("<a><b></a>").is_err());
    }

    #[test]
    fn truncated_document_is_an_error() {
        let err = parse("<project><dependencies>").unwrap_err();
        assert!(err.to_string().contains("dependencies"), "got: {err}");
    }

    #[test]
    fn empty_document_is_an_error() {
        assert!(parse("").is_err());
    }
}
