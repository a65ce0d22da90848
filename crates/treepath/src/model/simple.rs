//! Simple in-memory tree implementing [`TreeNode`], used in tests and quick prototypes.
//!
//! Nodes are `Rc`-backed and immutable once built. Parents are held weakly:
//! keep the root handle alive for as long as the tree is navigated.
//!
//! ```
//! use treepath::model::simple::{elem, text};
//! use treepath::model::TreeNode;
//!
//! // <root xmlns:p="urn:p" id="r"><child>Hello</child><child world="yes"/></root>
//! let root = elem("root")
//!     .ns("p", "urn:p")
//!     .attr("id", "r")
//!     .child(elem("child").child(text("Hello")))
//!     .child(elem("child").attr("world", "yes"))
//!     .build();
//!
//! let first = root.first_child().unwrap();
//! assert_eq!(first.text(), "Hello");
//! assert_eq!(first.next_sibling().unwrap().attribute("world"), Some("yes"));
//! assert!(root.is_root());
//! ```
use std::cell::OnceCell;
use std::fmt;
use std::rc::{Rc, Weak};

use compact_str::CompactString;

use super::{NodeKind, Pairs, TreeNode};

type PairList = Vec<(CompactString, CompactString)>;

struct Inner {
    kind: NodeKind,
    name: CompactString,
    value: CompactString,
    attributes: PairList,
    namespaces: PairList,
    children: Vec<SimpleNode>,
    // parent and position among its children
    parent: OnceCell<(Weak<Inner>, usize)>,
}

/// A simple Rc-backed node implementation.
#[derive(Clone)]
pub struct SimpleNode(Rc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}
impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish_non_exhaustive()
    }
}

impl SimpleNode {
    fn leaf(kind: NodeKind, value: &str) -> Self {
        SimpleNode(Rc::new(Inner {
            kind,
            name: CompactString::default(),
            value: value.into(),
            attributes: Vec::new(),
            namespaces: Vec::new(),
            children: Vec::new(),
            parent: OnceCell::new(),
        }))
    }

    pub fn element(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(name)
    }

    pub fn text(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Text, value)
    }

    pub fn comment(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Comment, value)
    }

    /// Child nodes, including text and comments.
    pub fn children(&self) -> &[SimpleNode] {
        &self.0.children
    }

    fn parent_link(&self) -> Option<(SimpleNode, usize)> {
        let (weak, index) = self.0.parent.get()?;
        weak.upgrade().map(|inner| (SimpleNode(inner), *index))
    }
}

pub struct SimpleNodeBuilder {
    name: CompactString,
    attributes: PairList,
    namespaces: PairList,
    children: Vec<SimpleNode>,
}

impl SimpleNodeBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            namespaces: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Declares `prefix` (empty for the default namespace) on this element.
    pub fn ns(mut self, prefix: &str, uri: &str) -> Self {
        self.namespaces.push((prefix.into(), uri.into()));
        self
    }

    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        self.children.push(child.into().build());
        self
    }

    pub fn children<I: IntoIterator<Item = SimpleNodeOrBuilder>>(mut self, it: I) -> Self {
        self.children.extend(it.into_iter().map(SimpleNodeOrBuilder::build));
        self
    }

    pub fn build(self) -> SimpleNode {
        let node = SimpleNode(Rc::new(Inner {
            kind: NodeKind::Element,
            name: self.name,
            value: CompactString::default(),
            attributes: self.attributes,
            namespaces: self.namespaces,
            children: self.children,
            parent: OnceCell::new(),
        }));
        for (index, child) in node.0.children.iter().enumerate() {
            let attached = child.0.parent.set((Rc::downgrade(&node.0), index)).is_ok();
            debug_assert!(attached, "node is already attached to another parent");
        }
        node
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl SimpleNodeOrBuilder {
    fn build(self) -> SimpleNode {
        match self {
            SimpleNodeOrBuilder::Built(n) => n,
            SimpleNodeOrBuilder::Builder(b) => b.build(),
        }
    }
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}
impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

// Convenience helper functions for concise test code
pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNode::element(name)
}
pub fn text(v: &str) -> SimpleNode {
    SimpleNode::text(v)
}
pub fn comment(v: &str) -> SimpleNode {
    SimpleNode::comment(v)
}

impl TreeNode for SimpleNode {
    type Attributes<'a> = Pairs<'a>;
    type Namespaces<'a> = Pairs<'a>;

    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn name(&self) -> &str {
        &self.0.name
    }

    fn value(&self) -> &str {
        &self.0.value
    }

    fn first_child(&self) -> Option<Self> {
        self.0.children.first().cloned()
    }

    fn next_sibling(&self) -> Option<Self> {
        let (parent, index) = self.parent_link()?;
        parent.0.children.get(index + 1).cloned()
    }

    fn parent(&self) -> Option<Self> {
        self.parent_link().map(|(parent, _)| parent)
    }

    fn has_children(&self) -> bool {
        !self.0.children.is_empty()
    }

    fn attributes(&self) -> Pairs<'_> {
        Pairs::new(&self.0.attributes)
    }

    fn namespace_declarations(&self) -> Pairs<'_> {
        Pairs::new(&self.0.namespaces)
    }
}
