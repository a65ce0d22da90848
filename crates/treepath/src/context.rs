//! A node paired with the namespace bindings in force at its position.
//!
//! A [`Context`] keeps one scope map per tree level between the document root
//! and its node. Navigation pushes or pops exactly one level, so contexts
//! produced while walking a tree never re-read the ancestor chain.
use core::fmt;
use core::mem;

use smallvec::SmallVec;

use crate::model::{NodeKind, TreeNode, split_qname};
use crate::scope::NamespaceScope;

/// Namespace bound to the `xml` prefix without a declaration.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Clone)]
pub struct Context<N: TreeNode> {
    node: Option<N>,
    scope: NamespaceScope,
    // enclosing levels, outermost first
    outer: SmallVec<[NamespaceScope; 8]>,
}

impl<N: TreeNode> Context<N> {
    /// A context without a node and with an empty scope.
    pub fn null() -> Self {
        Self { node: None, scope: NamespaceScope::new(), outer: SmallVec::new() }
    }

    /// Builds a context for `node`, collecting the namespace declarations of
    /// every ancestor once, root first.
    pub fn from_node(node: Option<N>) -> Self {
        let mut context = Self::null();
        let Some(node) = node else {
            return context;
        };
        let mut path: SmallVec<[N; 16]> = SmallVec::new();
        let mut current = Some(node.clone());
        while let Some(level) = current {
            current = level.parent();
            path.push(level);
        }
        for level in path.iter().rev() {
            context.push_scope(level);
        }
        context.node = Some(node);
        context
    }

    fn push_scope(&mut self, node: &N) {
        let bindings = node.namespace_declarations().map(|(prefix, uri)| (prefix.to_owned(), uri.to_owned()));
        let inner = self.scope.enter_scope(bindings);
        self.outer.push(mem::replace(&mut self.scope, inner));
    }

    fn pop_scope(&mut self) {
        if let Some(enclosing) = self.outer.pop() {
            self.scope = enclosing;
        }
    }

    /// Moves to the first child; the context becomes null if there is none.
    pub fn first_child(&mut self) {
        debug_assert!(self.node.is_some(), "first_child on a null context");
        self.node = self.node.as_ref().and_then(TreeNode::first_child);
        if let Some(child) = self.node.clone() {
            self.push_scope(&child);
        }
    }

    /// Moves to the next sibling, which gets its own scope on the shared
    /// parent level.
    pub fn next_sibling(&mut self) {
        debug_assert!(self.node.is_some(), "next_sibling on a null context");
        self.pop_scope();
        self.node = self.node.as_ref().and_then(TreeNode::next_sibling);
        if let Some(sibling) = self.node.clone() {
            self.push_scope(&sibling);
        }
    }

    pub fn parent(&mut self) {
        debug_assert!(self.node.is_some(), "parent on a null context");
        self.pop_scope();
        self.node = self.node.as_ref().and_then(TreeNode::parent);
    }

    pub fn node(&self) -> Option<&N> {
        self.node.as_ref()
    }

    pub fn into_node(self) -> Option<N> {
        self.node
    }

    pub fn is_null(&self) -> bool {
        self.node.is_none()
    }

    pub fn has_children(&self) -> bool {
        self.node.as_ref().is_some_and(TreeNode::has_children)
    }

    pub fn has_next_sibling(&self) -> bool {
        self.node.as_ref().is_some_and(TreeNode::has_next_sibling)
    }

    /// `true` when the node is the top-most node of its tree.
    pub fn is_root(&self) -> bool {
        self.node.as_ref().is_some_and(TreeNode::is_root)
    }

    /// Scope map of the current level.
    pub fn scope(&self) -> &NamespaceScope {
        &self.scope
    }

    /// Number of tree levels between the root and the node, counting both.
    pub fn level(&self) -> usize {
        self.outer.len()
    }

    /// Resolves `prefix` through the scope chain. `xml` is always bound.
    pub fn lookup_namespace(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE.to_owned());
        }
        self.scope.get(prefix)
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.node.as_ref().map(TreeNode::kind)
    }

    /// Qualified name; empty for null contexts and non-element nodes.
    pub fn name(&self) -> &str {
        self.node.as_ref().map_or("", TreeNode::name)
    }

    pub fn local_name(&self) -> &str {
        split_qname(self.name()).1
    }

    pub fn prefix(&self) -> Option<&str> {
        split_qname(self.name()).0
    }

    /// Namespace URI of an element: its prefix (or the default namespace)
    /// resolved through the scope chain. Empty when nothing is bound.
    pub fn namespace_uri(&self) -> String {
        if self.kind() != Some(NodeKind::Element) {
            return String::new();
        }
        self.lookup_namespace(self.prefix().unwrap_or_default()).unwrap_or_default()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.node.iter().flat_map(TreeNode::attributes)
    }

    /// Attribute value, or an empty string when absent.
    pub fn attribute(&self, name: &str) -> &str {
        self.node.as_ref().and_then(|node| node.attribute(name)).unwrap_or_default()
    }

    pub fn text(&self) -> String {
        self.node.as_ref().map(TreeNode::text).unwrap_or_default()
    }

    pub fn serialize(&self) -> String {
        self.node.as_ref().map(TreeNode::serialize).unwrap_or_default()
    }
}

impl<N: TreeNode> Default for Context<N> {
    fn default() -> Self {
        Self::null()
    }
}

impl<N: TreeNode> From<N> for Context<N> {
    fn from(node: N) -> Self {
        Self::from_node(Some(node))
    }
}

impl<N: TreeNode> PartialEq for Context<N> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<N: TreeNode> fmt::Debug for Context<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("node", &self.node).field("namespaces", &self.scope).finish()
    }
}
