//! The tree adapter capability the engine navigates through.
//!
//! Any tree can be queried once it implements [`TreeNode`]. Absence of a node
//! (the "null node" of pointer-based DOMs) is expressed as `Option::None`.
//! Two implementations ship with the crate: [`simple`] (builder trees for
//! tests and prototypes) and [`xml`] (documents loaded from XML text).
use core::fmt;
use std::fmt::Write as _;

use compact_str::CompactString;
use quick_xml::escape::escape;

pub mod simple;
pub mod xml;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

/// Navigation and inspection primitives required from a tree.
///
/// Equality must be node identity: two handles are equal iff they denote the
/// same position in the same tree.
pub trait TreeNode: Clone + PartialEq + fmt::Debug + 'static {
    type Attributes<'a>: Iterator<Item = (&'a str, &'a str)>
    where
        Self: 'a;
    type Namespaces<'a>: Iterator<Item = (&'a str, &'a str)>
    where
        Self: 'a;

    fn kind(&self) -> NodeKind;

    /// Qualified name (`prefix:local` or `local`); empty for text and comments.
    fn name(&self) -> &str;

    /// Character content of text and comment nodes; empty for elements.
    fn value(&self) -> &str;

    fn first_child(&self) -> Option<Self>;
    fn next_sibling(&self) -> Option<Self>;
    fn parent(&self) -> Option<Self>;

    fn has_children(&self) -> bool {
        self.first_child().is_some()
    }

    fn has_next_sibling(&self) -> bool {
        self.next_sibling().is_some()
    }

    /// `true` for the top-most node of the tree.
    fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Plain attributes as `(name, value)` in document order.
    fn attributes(&self) -> Self::Attributes<'_>;

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Namespace declarations attached directly to this node as
    /// `(prefix, uri)`; the default namespace uses the empty prefix.
    fn namespace_declarations(&self) -> Self::Namespaces<'_>;

    /// Value of the first text child, or an empty string.
    fn text(&self) -> String {
        let mut child = self.first_child();
        while let Some(node) = child {
            if node.kind() == NodeKind::Text {
                return node.value().to_owned();
            }
            child = node.next_sibling();
        }
        String::new()
    }

    /// Markup for this node and its subtree.
    fn serialize(&self) -> String {
        let mut out = String::new();
        write_markup(self, &mut out);
        out
    }
}

/// Splits `prefix:local` into its parts.
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Iterator over stored `(name, value)` pairs, shared by the bundled adapters.
#[derive(Debug, Clone)]
pub struct Pairs<'a>(core::slice::Iter<'a, (CompactString, CompactString)>);

impl<'a> Pairs<'a> {
    pub(crate) fn new(pairs: &'a [(CompactString, CompactString)]) -> Self {
        Self(pairs.iter())
    }
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

fn is_namespace_attribute(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

fn write_markup<N: TreeNode>(node: &N, out: &mut String) {
    match node.kind() {
        NodeKind::Text => out.push_str(&escape(node.value())),
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(node.value());
            out.push_str("-->");
        }
        NodeKind::Element => {
            let _ = write!(out, "<{}", node.name());
            for (prefix, uri) in node.namespace_declarations() {
                if prefix.is_empty() {
                    let _ = write!(out, " xmlns=\"{}\"", escape(uri));
                } else {
                    let _ = write!(out, " xmlns:{prefix}=\"{}\"", escape(uri));
                }
            }
            for (name, value) in node.attributes().filter(|(n, _)| !is_namespace_attribute(n)) {
                let _ = write!(out, " {name}=\"{}\"", escape(value));
            }
            let Some(first) = node.first_child() else {
                out.push_str("/>");
                return;
            };
            out.push('>');
            let mut child = Some(first);
            while let Some(current) = child {
                write_markup(&current, out);
                child = current.next_sibling();
            }
            let _ = write!(out, "</{}>", node.name());
        }
    }
}
