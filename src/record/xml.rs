//! Minimal XML element tree
//!
//! Handles what query responses contain: a declaration, comments, CDATA,
//! elements with quoted attributes, text with the predefined and numeric
//! entities. DTDs and namespaces-as-semantics are not supported; prefixed
//! names are kept verbatim (`xtk:schema`).
//!
//! The root element and its direct children (the records of a collection)
//! keep their exact source text, so a record is written out byte for byte
//! as the server sent it. The tree itself is a lossy view: comments are
//! dropped and text runs are concatenated.

use crate::error::{Error, Result};
use std::fmt::Write as _;

/// Elements nested deeper than this are rejected
pub const MAX_DEPTH: usize = 256;

/// Depth down to which elements keep their source text (root is 0)
const SOURCE_DEPTH: usize = 1;

/// An XML element with its attributes, child elements and text content
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    /// Element name (prefix included)
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
    /// Concatenated text content directly under this element
    pub text: String,
    /// Exact source text of the element, when parsed at record depth
    source: Option<String>,
}

impl XmlNode {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an attribute (builder style)
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element (builder style)
    #[must_use]
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set the text content (builder style)
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Parse a document and return its root element
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser::new(input);
        parser.skip_misc()?;
        if parser.at_end() {
            return Err(Error::xml("Document has no root element"));
        }
        let root = parser.element(0)?;
        parser.skip_misc()?;
        if !parser.at_end() {
            return Err(Error::xml(format!(
                "Unexpected content after root element at offset {}",
                parser.pos
            )));
        }
        Ok(root)
    }

    /// Read an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Cursor on the first child element, if any
    pub fn first_child(&self) -> Option<XmlCursor<'_>> {
        XmlCursor::new(&self.children, 0)
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Source text of the element as parsed, if it was kept
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Source text when available, else the serialized element
    pub fn raw_xml(&self) -> String {
        self.source.clone().unwrap_or_else(|| self.to_xml())
    }

    /// Serialize the tree back to XML text
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            let _ = write!(out, " {k}=\"{}\"", escape(v, true));
        }
        if self.children.is_empty() && self.text.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        out.push_str(&escape(&self.text, false));
        for child in &self.children {
            child.write_xml(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

/// First-child / next-sibling cursor over a run of sibling elements
#[derive(Debug, Clone, Copy)]
pub struct XmlCursor<'a> {
    siblings: &'a [XmlNode],
    index: usize,
}

impl<'a> XmlCursor<'a> {
    fn new(siblings: &'a [XmlNode], index: usize) -> Option<Self> {
        (index < siblings.len()).then_some(Self { siblings, index })
    }

    /// Element under the cursor
    pub fn node(&self) -> &'a XmlNode {
        &self.siblings[self.index]
    }

    /// Move to the next sibling element
    pub fn next_sibling(self) -> Option<Self> {
        Self::new(self.siblings, self.index + 1)
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        // Tolerate a UTF-8 BOM
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        let input = self.input;
        &input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn skip_until(&mut self, terminator: &str, what: &str) -> Result<&'a str> {
        let rest = self.rest();
        let end = rest
            .find(terminator)
            .ok_or_else(|| Error::xml(format!("Unterminated {what}")))?;
        self.pos += end + terminator.len();
        Ok(&rest[..end])
    }

    /// Skip declarations, processing instructions, comments and doctypes
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("<?") {
                self.skip_until("?>", "processing instruction")?;
            } else if rest.starts_with("<!--") {
                self.skip_until("-->", "comment")?;
            } else if rest.starts_with("<!DOCTYPE") {
                self.skip_until(">", "doctype")?;
            } else {
                return Ok(());
            }
        }
    }

    fn name(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '>' | '/' | '='))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(Error::xml(format!("Expected a name at offset {}", self.pos)));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(Error::xml(format!(
                "Expected '{token}' at offset {}",
                self.pos
            )))
        }
    }

    fn keep_source(&self, node: &mut XmlNode, start: usize, depth: usize) {
        if depth <= SOURCE_DEPTH {
            node.source = Some(self.input[start..self.pos].to_string());
        }
    }

    fn element(&mut self, depth: usize) -> Result<XmlNode> {
        if depth > MAX_DEPTH {
            return Err(Error::xml(format!(
                "Elements nested deeper than {MAX_DEPTH} levels at offset {}",
                self.pos
            )));
        }
        let start = self.pos;
        self.expect("<")?;
        let mut node = XmlNode::new(self.name()?);

        // Attributes
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.pos += 2;
                self.keep_source(&mut node, start, depth);
                return Ok(node);
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            let key = self.name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let quote = match self.rest().chars().next() {
                Some(q @ ('"' | '\'')) => q,
                _ => {
                    return Err(Error::xml(format!(
                        "Unquoted value for attribute '{key}'"
                    )))
                }
            };
            self.pos += 1;
            let raw = self.skip_until(&quote.to_string(), "attribute value")?;
            node.attributes.push((key.to_string(), unescape(raw)?));
        }

        // Content
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(Error::xml(format!(
                    "Missing closing tag for {}",
                    node.name
                )));
            }
            if rest.starts_with("</") {
                self.pos += 2;
                let closing = self.name()?;
                if closing != node.name {
                    return Err(Error::xml(format!(
                        "Mismatched closing tag: expected </{}>, found </{closing}>",
                        node.name
                    )));
                }
                self.skip_whitespace();
                self.expect(">")?;
                break;
            } else if rest.starts_with("<!--") {
                self.skip_until("-->", "comment")?;
            } else if rest.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let data = self.skip_until("]]>", "CDATA section")?;
                node.text.push_str(data);
            } else if rest.starts_with("<?") {
                self.skip_until("?>", "processing instruction")?;
            } else if rest.starts_with('<') {
                node.children.push(self.element(depth + 1)?);
            } else {
                let len = rest.find('<').unwrap_or(rest.len());
                let raw = &rest[..len];
                self.pos += len;
                if !raw.trim().is_empty() {
                    node.text.push_str(&unescape(raw)?);
                }
            }
        }

        self.keep_source(&mut node, start, depth);
        Ok(node)
    }
}

/// Decode predefined and numeric character references
fn unescape(raw: &str) -> Result<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| Error::xml("Unterminated entity reference"))?;
        let entity = &after[..end];
        let decoded = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| Error::xml(format!("Unknown entity '&{entity};'")))?
            }
        };
        out.push(decoded);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
