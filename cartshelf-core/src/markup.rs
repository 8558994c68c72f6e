//! BML document model.
//!
//! BML is the line-oriented, indentation-based markup used for cartridge
//! manifests and for the release database:
//!
//! ```text
//! cartridge region=NTSC
//!   rom name=program.rom size=0x80000
//!   ram name=save.ram size=0x2000
//! information
//!   title: Super Mario World
//! ```
//!
//! Every node has a name, an optional text value, and ordered children.
//! Attributes written on a node's line (`name=program.rom`) become children,
//! so `rom["name"]` and a nested `name` line are the same thing once parsed.

use std::fmt;

use crate::error::MarkupError;

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

/// Closed set of node kinds the import pipeline cares about.
///
/// Resolved once from the node name when the node is built, so consumers
/// match on the kind instead of comparing tag strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// `cartridge`: root of a cartridge layout
    Cartridge,
    /// `rom`: a ROM declaration (`name` + `size`)
    Rom,
    /// `ram`: a RAM declaration
    Ram,
    /// `information`: provenance metadata (title, sha256, note)
    Information,
    /// `release`: one record of the release database
    Release,
    /// Anything else (boards, coprocessors, attributes, ...)
    #[default]
    Other,
}

impl NodeKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "cartridge" => Self::Cartridge,
            "rom" => Self::Rom,
            "ram" => Self::Ram,
            "information" => Self::Information,
            "release" => Self::Release,
            _ => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A node of a BML document.
///
/// A document is represented by a nameless root node whose children are the
/// top-level entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    name: String,
    value: String,
    kind: NodeKind,
    children: Vec<Node>,
}

impl Node {
    /// Create an empty document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = NodeKind::from_name(&name);
        Self {
            name,
            value: String::new(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Shorthand for a child holding a single value, e.g. `size: 0x8000`.
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_child(Node::new(name).with_value(value))
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Raw value, possibly spanning several lines.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Value with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.value.trim()
    }

    /// Value read as an unsigned number.
    ///
    /// Accepts plain decimal as well as `0x` (hex) and `0b` (binary)
    /// prefixes, since manifests write sizes in hex.
    pub fn decimal(&self) -> Option<u64> {
        parse_number(self.text())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// True for a nameless node with no value and no children.
    ///
    /// An empty document is how a failed manifest resolution looks.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.value.is_empty() && self.children.is_empty()
    }

    /// Look up a descendant by `/`-separated path, taking the first child
    /// with each name: `release.get("information/sha256")`.
    pub fn get(&self, path: &str) -> Option<&Node> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| {
                node.children.iter().find(|child| child.name == segment)
            })
    }

    /// Text of the descendant at `path`, or `""` when it does not exist.
    pub fn text_at(&self, path: &str) -> &str {
        self.get(path).map(Node::text).unwrap_or("")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

fn parse_number(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()
    } else {
        text.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// Serializer
// ---------------------------------------------------------------------------

/// Serialize a node (or a whole document) to BML text.
///
/// Attributes are written back as child lines (`name: value`), which parse
/// to the same tree as the inline `name=value` form.
pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    if node.name.is_empty() {
        for child in &node.children {
            write_node(&mut out, child, 0);
        }
    } else {
        write_node(&mut out, node, 0);
    }
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push_str(&node.name);

    let lines: Vec<&str> = if node.value.is_empty() {
        Vec::new()
    } else {
        node.value.split('\n').collect()
    };
    if let [line] = lines.as_slice() {
        out.push_str(": ");
        out.push_str(line);
    }
    out.push('\n');
    if lines.len() > 1 {
        for line in &lines {
            out.push_str(&indent);
            out.push_str("  : ");
            out.push_str(line);
            out.push('\n');
        }
    }

    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse BML text into a document (a nameless root node).
///
/// Blank lines and `//` comments are skipped. Empty input parses to an empty
/// document rather than an error.
pub fn parse(text: &str) -> Result<Node, MarkupError> {
    let mut root = Node::root();
    // Open nodes with the indentation of the line that created them
    let mut stack: Vec<(usize, Node)> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.trim_start_matches([' ', '\t']);
        let indent = raw.len() - content.len();
        let content = content.trim_end();
        if content.is_empty() || content.starts_with("//") {
            continue;
        }

        if let Some(rest) = content.strip_prefix(':') {
            match stack.last_mut() {
                Some((depth, node)) if indent > *depth => {
                    if !node.value.is_empty() {
                        node.value.push('\n');
                    }
                    node.value.push_str(rest.trim());
                    continue;
                }
                _ => {
                    return Err(MarkupError::syntax(
                        line,
                        "value continuation without an enclosing node",
                    ));
                }
            }
        }

        let node = parse_node_line(content, line)?;
        close_nodes(&mut stack, &mut root, Some(indent));
        stack.push((indent, node));
    }

    close_nodes(&mut stack, &mut root, None);
    Ok(root)
}

/// Pop open nodes indented at least `indent` (all of them for `None`),
/// attaching each to its parent.
fn close_nodes(stack: &mut Vec<(usize, Node)>, root: &mut Node, indent: Option<usize>) {
    while stack
        .last()
        .is_some_and(|(depth, _)| indent.is_none_or(|indent| *depth >= indent))
    {
        let Some((_, node)) = stack.pop() else {
            break;
        };
        match stack.last_mut() {
            Some((_, parent)) => parent.children.push(node),
            None => root.children.push(node),
        }
    }
}

fn parse_node_line(content: &str, line: usize) -> Result<Node, MarkupError> {
    let mut cursor = LineCursor { rest: content, line };
    let mut node = Node::new(cursor.name()?);
    node.value = cursor.value()?;
    while let Some(attribute) = cursor.attribute()? {
        node.children.push(attribute);
    }
    Ok(node)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '.'
}

/// Tokenizer over the remainder of one node line.
struct LineCursor<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> LineCursor<'a> {
    fn name(&mut self) -> Result<&'a str, MarkupError> {
        let end = self
            .rest
            .find(|c: char| !is_name_char(c))
            .unwrap_or(self.rest.len());
        if end == 0 {
            let found = self.rest.chars().next().unwrap_or(' ');
            return Err(MarkupError::syntax(
                self.line,
                format!("invalid node name starting at '{found}'"),
            ));
        }
        let (name, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(name)
    }

    fn value(&mut self) -> Result<String, MarkupError> {
        if let Some(rest) = self.rest.strip_prefix(':') {
            self.rest = "";
            return Ok(rest.trim().to_string());
        }
        let Some(rest) = self.rest.strip_prefix('=') else {
            return Ok(String::new());
        };

        if let Some(quoted) = rest.strip_prefix('"') {
            let Some(end) = quoted.find('"') else {
                return Err(MarkupError::syntax(self.line, "unterminated quoted value"));
            };
            let after = &quoted[end + 1..];
            if !after.is_empty() && !after.starts_with([' ', '\t']) {
                return Err(MarkupError::syntax(
                    self.line,
                    "expected whitespace after quoted value",
                ));
            }
            self.rest = after;
            return Ok(quoted[..end].to_string());
        }

        let end = rest.find([' ', '\t']).unwrap_or(rest.len());
        self.rest = &rest[end..];
        Ok(rest[..end].to_string())
    }

    fn attribute(&mut self) -> Result<Option<Node>, MarkupError> {
        self.rest = self.rest.trim_start_matches([' ', '\t']);
        if self.rest.is_empty() {
            return Ok(None);
        }
        let mut node = Node::new(self.name()?);
        node.value = self.value()?;
        Ok(Some(node))
    }
}

#[cfg(test)]
#[path = "tests/markup_tests.rs"]
mod tests;
