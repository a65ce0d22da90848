//! Documents loaded from XML text with the `quick-xml` pull parser.
//!
//! The whole document is read into an index-linked arena up front; nodes are
//! `(document, index)` handles into it. `xmlns` attributes become namespace
//! declarations. Whitespace-only text and comments are dropped unless
//! [`ParseOptions`] asks to keep them.
//!
//! ```
//! use treepath::model::xml::Document;
//! use treepath::model::TreeNode;
//!
//! let doc = Document::parse(r#"<a xmlns:p="urn:p"><b id="1">hi</b></a>"#).unwrap();
//! let b = doc.root().first_child().unwrap();
//! assert_eq!(b.name(), "b");
//! assert_eq!(b.attribute("id"), Some("1"));
//! assert_eq!(b.text(), "hi");
//! ```
use core::str;
use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::{NodeKind, Pairs, TreeNode};
use crate::error::{Error, Result};

type PairList = Vec<(CompactString, CompactString)>;

/// Controls what the loader keeps from the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep text nodes made only of whitespace.
    pub keep_whitespace_text: bool,
    /// Keep comments as [`NodeKind::Comment`] nodes.
    pub keep_comments: bool,
    /// Also report `xmlns` declarations as plain attributes.
    pub keep_namespace_attributes: bool,
}

impl ParseOptions {
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_whitespace_text(mut self, keep: bool) -> Self {
        self.options.keep_whitespace_text = keep;
        self
    }

    #[must_use]
    pub fn with_comments(mut self, keep: bool) -> Self {
        self.options.keep_comments = keep;
        self
    }

    #[must_use]
    pub fn with_namespace_attributes(mut self, keep: bool) -> Self {
        self.options.keep_namespace_attributes = keep;
        self
    }

    pub fn build(self) -> ParseOptions {
        self.options
    }
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    name: CompactString,
    value: CompactString,
    attributes: PairList,
    namespaces: PairList,
    parent: Option<usize>,
    first_child: Option<usize>,
    next_sibling: Option<usize>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: CompactString::default(),
            value: CompactString::default(),
            attributes: Vec::new(),
            namespaces: Vec::new(),
            parent: None,
            first_child: None,
            next_sibling: None,
        }
    }
}

// Node 0 is always the root element.
#[derive(Debug)]
struct Arena {
    nodes: Vec<NodeData>,
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct Document(Rc<Arena>);

impl Document {
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, &ParseOptions::default())
    }

    pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut builder = ArenaBuilder::new(options);
        loop {
            match reader.read_event()? {
                Event::Start(start) => builder.open_element(&start)?,
                Event::Empty(start) => {
                    builder.open_element(&start)?;
                    builder.close_element(None)?;
                }
                Event::End(end) => builder.close_element(Some(str::from_utf8(end.name().as_ref())?))?,
                Event::Text(content) => builder.text(&unescape(str::from_utf8(&content)?)?),
                Event::CData(content) => builder.text(str::from_utf8(&content)?),
                Event::GeneralRef(reference) => {
                    let entity = format!("&{};", str::from_utf8(&reference)?);
                    builder.text(&unescape(&entity)?);
                }
                Event::Comment(content) => builder.comment(str::from_utf8(&content)?),
                Event::Eof => break,
                _ => {}
            }
        }
        let document = builder.finish()?;
        tracing::debug!(nodes = document.node_count(), "parsed XML document");
        Ok(document)
    }

    pub fn root(&self) -> XmlNode {
        XmlNode { doc: Rc::clone(&self.0), idx: 0 }
    }

    pub fn node_count(&self) -> usize {
        self.0.nodes.len()
    }
}

impl str::FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

struct ArenaBuilder<'o> {
    options: &'o ParseOptions,
    nodes: Vec<NodeData>,
    open: Vec<usize>,
    // last child appended to each open element
    last_child: Vec<Option<usize>>,
    pending_text: String,
}

impl<'o> ArenaBuilder<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        Self { options, nodes: Vec::new(), open: Vec::new(), last_child: Vec::new(), pending_text: String::new() }
    }

    fn append(&mut self, mut data: NodeData) -> usize {
        let idx = self.nodes.len();
        data.parent = self.open.last().copied();
        self.nodes.push(data);
        if let (Some(parent), Some(last)) = (self.open.last().copied(), self.last_child.last_mut()) {
            match *last {
                Some(prev) => self.nodes[prev].next_sibling = Some(idx),
                None => self.nodes[parent].first_child = Some(idx),
            }
            *last = Some(idx);
        }
        idx
    }

    fn open_element(&mut self, start: &BytesStart<'_>) -> Result<()> {
        let qname = start.name();
        let name = str::from_utf8(qname.as_ref())?;
        if self.open.is_empty() && !self.nodes.is_empty() {
            return Err(Error::TrailingElement(name.to_owned()));
        }
        self.flush_text();
        let mut data = NodeData::new(NodeKind::Element);
        data.name = name.into();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = str::from_utf8(attribute.key.as_ref())?;
            let value = unescape(str::from_utf8(&attribute.value)?)?;
            let prefix = if key == "xmlns" { Some("") } else { key.strip_prefix("xmlns:") };
            if let Some(prefix) = prefix {
                data.namespaces.push((prefix.into(), value.as_ref().into()));
                if !self.options.keep_namespace_attributes {
                    continue;
                }
            }
            data.attributes.push((key.into(), value.as_ref().into()));
        }
        let idx = self.append(data);
        self.open.push(idx);
        self.last_child.push(None);
        Ok(())
    }

    fn close_element(&mut self, name: Option<&str>) -> Result<()> {
        self.flush_text();
        let Some(idx) = self.open.pop() else {
            return Err(Error::UnbalancedTag {
                expected: "a start tag".to_owned(),
                found: format!("</{}>", name.unwrap_or_default()),
            });
        };
        if let Some(name) = name
            && name != self.nodes[idx].name
        {
            return Err(Error::UnbalancedTag {
                expected: format!("</{}>", self.nodes[idx].name),
                found: format!("</{name}>"),
            });
        }
        self.last_child.pop();
        Ok(())
    }

    fn text(&mut self, content: &str) {
        if !self.open.is_empty() {
            self.pending_text.push_str(content);
        }
    }

    fn comment(&mut self, content: &str) {
        self.flush_text();
        if self.options.keep_comments && !self.open.is_empty() {
            let mut data = NodeData::new(NodeKind::Comment);
            data.value = content.into();
            self.append(data);
        }
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.pending_text);
        if self.options.keep_whitespace_text || !content.trim().is_empty() {
            let mut data = NodeData::new(NodeKind::Text);
            data.value = content.into();
            self.append(data);
        }
    }

    fn finish(self) -> Result<Document> {
        if let Some(&idx) = self.open.last() {
            return Err(Error::UnbalancedTag {
                expected: format!("</{}>", self.nodes[idx].name),
                found: "end of input".to_owned(),
            });
        }
        if self.nodes.is_empty() {
            return Err(Error::NoRootElement);
        }
        Ok(Document(Rc::new(Arena { nodes: self.nodes })))
    }
}

/// Handle to a node of a [`Document`].
#[derive(Clone)]
pub struct XmlNode {
    doc: Rc<Arena>,
    idx: usize,
}

impl XmlNode {
    fn data(&self) -> &NodeData {
        &self.doc.nodes[self.idx]
    }

    fn at(&self, idx: Option<usize>) -> Option<Self> {
        idx.map(|idx| XmlNode { doc: Rc::clone(&self.doc), idx })
    }

    /// Position of this node in document order.
    pub fn index(&self) -> usize {
        self.idx
    }
}

impl PartialEq for XmlNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.doc, &other.doc) && self.idx == other.idx
    }
}
impl Eq for XmlNode {}

impl fmt::Debug for XmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        f.debug_struct("XmlNode")
            .field("idx", &self.idx)
            .field("kind", &data.kind)
            .field("name", &data.name)
            .finish_non_exhaustive()
    }
}

impl TreeNode for XmlNode {
    type Attributes<'a> = Pairs<'a>;
    type Namespaces<'a> = Pairs<'a>;

    fn kind(&self) -> NodeKind {
        self.data().kind
    }

    fn name(&self) -> &str {
        &self.data().name
    }

    fn value(&self) -> &str {
        &self.data().value
    }

    fn first_child(&self) -> Option<Self> {
        self.at(self.data().first_child)
    }

    fn next_sibling(&self) -> Option<Self> {
        self.at(self.data().next_sibling)
    }

    fn parent(&self) -> Option<Self> {
        self.at(self.data().parent)
    }

    fn has_children(&self) -> bool {
        self.data().first_child.is_some()
    }

    fn has_next_sibling(&self) -> bool {
        self.data().next_sibling.is_some()
    }

    fn attributes(&self) -> Pairs<'_> {
        Pairs::new(&self.data().attributes)
    }

    fn namespace_declarations(&self) -> Pairs<'_> {
        Pairs::new(&self.data().namespaces)
    }
}
