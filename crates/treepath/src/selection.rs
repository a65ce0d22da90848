//! Expressions bound to their seeds, with the reducers that end a query.
use std::fmt::Display;

use itertools::Itertools;

use crate::context::Context;
use crate::expr::{Expr, Nodes};
use crate::model::TreeNode;

/// A query over fixed seed contexts.
///
/// Nothing is evaluated up front. Every [`iter`](Selection::iter) starts a new
/// lazy pass from the first seed, so a selection can be read any number of
/// times.
#[derive(Clone)]
pub struct Selection<N: TreeNode> {
    seeds: Vec<Context<N>>,
    expr: Expr,
}

impl<N: TreeNode> Selection<N> {
    pub fn new<I: IntoIterator<Item = Context<N>>>(seeds: I, expr: Expr) -> Self {
        Self { seeds: seeds.into_iter().collect(), expr }
    }

    pub fn from_node(node: N, expr: Expr) -> Self {
        Self::new([Context::from(node)], expr)
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn iter(&self) -> Nodes<'_, N> {
        self.expr.apply(Box::new(self.seeds.iter().cloned()))
    }

    /// Continues the query with `next` applied to this selection's output.
    #[must_use]
    pub fn select(&self, next: Expr) -> Self {
        Self { seeds: self.seeds.clone(), expr: self.expr.clone().then(next) }
    }

    /// First result, or a null context when there is none.
    pub fn first(&self) -> Context<N> {
        self.iter().next().unwrap_or_default()
    }

    pub fn nodes(&self) -> Vec<N> {
        self.iter().filter_map(Context::into_node).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|ctx| ctx.name().to_owned()).collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.iter().map(|ctx| ctx.text()).collect()
    }

    /// Text of the first result, or an empty string.
    pub fn first_text(&self) -> String {
        self.first().text()
    }

    /// Every `(name, value)` attribute pair of every result, in order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.iter()
            .flat_map(|ctx| {
                ctx.attributes().map(|(name, value)| (name.to_owned(), value.to_owned())).collect::<Vec<_>>()
            })
            .collect()
    }

    /// Values of the `name` attribute of the results that carry it.
    pub fn attribute_values(&self, name: &str) -> Vec<String> {
        self.iter()
            .filter_map(|ctx| ctx.node().and_then(|node| node.attribute(name)).map(str::to_owned))
            .collect()
    }

    pub fn namespace_uris(&self) -> Vec<String> {
        self.iter().map(|ctx| ctx.namespace_uri()).collect()
    }

    /// Serialized markup of the first result.
    pub fn xml_string(&self) -> String {
        self.first().serialize()
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn exists(&self) -> bool {
        self.iter().next().is_some()
    }
}

impl<'s, N: TreeNode> IntoIterator for &'s Selection<N> {
    type Item = Context<N>;
    type IntoIter = Nodes<'s, N>;

    fn into_iter(self) -> Nodes<'s, N> {
        self.iter()
    }
}

impl<N: TreeNode> Context<N> {
    /// Runs `expr` with this context as the only seed.
    pub fn select(&self, expr: Expr) -> Selection<N> {
        Selection::new([self.clone()], expr)
    }
}

/// Joins `items` with `delimiter` between neighbours.
pub fn concatenate<I>(items: I, delimiter: &str) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    items.into_iter().join(delimiter)
}

impl<N: TreeNode> std::fmt::Debug for Selection<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection").field("seeds", &self.seeds.len()).field("expr", &self.expr.to_string()).finish()
    }
}
