//! XML element builder and node readers.
//!
//! Writing goes through [`XmlElement`], a small owned tree that renders to a
//! deterministic, indented fragment. Reading uses `roxmltree` nodes and the
//! helper functions below, which turn missing or malformed data into
//! descriptive [`SerializeError`]s.

use std::borrow::Cow;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{SerializeError, SerializeResult};

/// A parsed XML node.
pub type XmlNode<'a, 'input> = roxmltree::Node<'a, 'input>;

/// Header a caller prepends before handing a fragment to a parser.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Owned element with ordered attributes and child elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append an attribute (builder style).
    pub fn attr(mut self, name: &str, value: impl Display) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Append a child element (builder style).
    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Render prefixed with [`XML_DECLARATION`].
    pub fn to_document(&self) -> String {
        format!("{XML_DECLARATION}\n{self}")
    }

    fn write_indented(&self, out: &mut impl fmt::Write, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        write!(out, "{indent}<{}", self.name)?;
        for (name, value) in &self.attributes {
            write!(out, " {name}=\"{}\"", escape(value))?;
        }
        if self.children.is_empty() {
            return write!(out, "/>");
        }
        writeln!(out, ">")?;
        for child in &self.children {
            child.write_indented(out, depth + 1)?;
            writeln!(out)?;
        }
        write!(out, "{indent}</{}>", self.name)
    }
}

impl Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Escape the five predefined entities for use inside an attribute value.
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'', '\n', '\r', '\t']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Fail unless `node` is an element named `name`.
pub fn expect_element(node: XmlNode<'_, '_>, name: &str) -> SerializeResult<()> {
    let found = node.tag_name().name();
    if node.is_element() && found == name {
        Ok(())
    } else {
        Err(SerializeError::UnexpectedElement {
            expected: name.to_string(),
            found: found.to_string(),
        })
    }
}

/// Raw attribute text, required.
pub fn attr_str<'a>(node: XmlNode<'a, '_>, name: &str) -> SerializeResult<&'a str> {
    node.attribute(name)
        .ok_or_else(|| SerializeError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name.to_string(),
        })
}

/// Required attribute parsed through [`FromStr`].
pub fn attr<T: FromStr>(node: XmlNode<'_, '_>, name: &str) -> SerializeResult<T> {
    let raw = attr_str(node, name)?;
    raw.trim()
        .parse()
        .map_err(|_| invalid_attribute(node, name, raw))
}

/// Optional attribute parsed through [`FromStr`]; `None` when absent.
pub fn optional_attr<T: FromStr>(node: XmlNode<'_, '_>, name: &str) -> SerializeResult<Option<T>> {
    match node.attribute(name) {
        Some(_) => attr(node, name).map(Some),
        None => Ok(None),
    }
}

/// Required finite `f32` attribute.
pub fn float_attr(node: XmlNode<'_, '_>, name: &str) -> SerializeResult<f32> {
    let value: f32 = attr(node, name)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid_attribute(node, name, attr_str(node, name)?))
    }
}

/// Required time attribute written as decimal seconds.
pub fn duration_attr(node: XmlNode<'_, '_>, name: &str) -> SerializeResult<Duration> {
    let raw = attr_str(node, name)?;
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid_attribute(node, name, raw))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid_attribute(node, name, raw));
    }
    Ok(Duration::from_micros((seconds * 1_000_000.0).round() as u64))
}

/// Decimal seconds for a time attribute, exact at microsecond resolution.
pub fn format_duration(value: Duration) -> String {
    (value.as_micros() as f64 / 1_000_000.0).to_string()
}

/// First child element with the given name, required.
pub fn child<'a, 'input>(
    node: XmlNode<'a, 'input>,
    name: &str,
) -> SerializeResult<XmlNode<'a, 'input>> {
    optional_child(node, name).ok_or_else(|| SerializeError::MissingElement {
        parent: node.tag_name().name().to_string(),
        child: name.to_string(),
    })
}

/// First child element with the given name.
pub fn optional_child<'a, 'input>(
    node: XmlNode<'a, 'input>,
    name: &str,
) -> Option<XmlNode<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// All child elements in document order.
pub fn child_elements<'a, 'input>(
    node: XmlNode<'a, 'input>,
) -> impl Iterator<Item = XmlNode<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

fn invalid_attribute(node: XmlNode<'_, '_>, name: &str, raw: &str) -> SerializeError {
    SerializeError::InvalidAttribute {
        element: node.tag_name().name().to_string(),
        attribute: name.to_string(),
        value: raw.to_string(),
    }
}

/// Render a named list of elements, e.g. `<Frames>...</Frames>`.
pub fn list_element(name: &str, items: impl IntoIterator<Item = XmlElement>) -> XmlElement {
    let mut element = XmlElement::new(name);
    for item in items {
        element.push(item);
    }
    element
}
