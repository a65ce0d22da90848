//! Composable traversal expressions.
//!
//! An [`Expr`] maps a lazy sequence of contexts to another lazy sequence.
//! Expressions are plain values: subtrees are shared, cloning is cheap and
//! evaluation only borrows them. Predicates are expressions too; a candidate
//! passes [`where_`] when the predicate, run on the candidate alone, yields
//! anything.
//!
//! ```
//! use treepath::expr::{child, descendant_named, ancestor_named, where_};
//! use treepath::model::simple::elem;
//! use treepath::Selection;
//!
//! // <a><b><x><y/></x></b><y/><d><x><y/></x></d></a>
//! let a = elem("a")
//!     .child(elem("b").child(elem("x").child(elem("y"))))
//!     .child(elem("y"))
//!     .child(elem("d").child(elem("x").child(elem("y"))))
//!     .build();
//!
//! let query = child() / where_(descendant_named("y") / ancestor_named("x"));
//! assert_eq!(Selection::from_node(a, query).names(), ["b", "d"]);
//! ```
use core::fmt;
use core::ops::{BitOr, Div};
use std::rc::Rc;

use compact_str::CompactString;
use itertools::Itertools;

use crate::axis::{Axis, singleton};
use crate::context::Context;
use crate::model::TreeNode;

/// Lazy sequence of contexts flowing between expressions.
pub type Nodes<'a, N> = Box<dyn Iterator<Item = Context<N>> + 'a>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    Any,
    /// Local name, compared with the prefix stripped.
    Local(CompactString),
}

impl NameTest {
    fn accepts<N: TreeNode>(&self, ctx: &Context<N>) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Local(name) => ctx.local_name() == name.as_str(),
        }
    }
}

/// Per-node tests that need no sub-query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Named(CompactString),
    AttributeEq { name: CompactString, value: CompactString },
    HasAttribute(CompactString),
    TextContains(CompactString),
    Namespace(CompactString),
}

impl Filter {
    pub fn accepts<N: TreeNode>(&self, ctx: &Context<N>) -> bool {
        match self {
            Filter::Named(name) => ctx.local_name() == name.as_str(),
            Filter::AttributeEq { name, value } => {
                ctx.node().and_then(|node| node.attribute(name)) == Some(value.as_str())
            }
            Filter::HasAttribute(name) => ctx.node().is_some_and(|node| node.attribute(name).is_some()),
            Filter::TextContains(needle) => ctx.text().contains(needle.as_str()),
            Filter::Namespace(uri) => ctx.namespace_uri() == uri.as_str(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// Passes its input through.
    Identity,
    Step { axis: Axis, test: NameTest },
    Then(Expr, Expr),
    Or(Expr, Expr),
    Where(Expr),
    WhereNot(Expr),
    Filter(Filter),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr(Rc<ExprKind>);

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr(Rc::new(kind))
    }

    pub fn identity() -> Self {
        Self::new(ExprKind::Identity)
    }

    pub fn step(axis: Axis, test: NameTest) -> Self {
        Self::new(ExprKind::Step { axis, test })
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// Feeds the output of `self` into `next`.
    #[must_use]
    pub fn then(self, next: Expr) -> Expr {
        match (self.kind(), next.kind()) {
            (ExprKind::Identity, _) => next,
            (_, ExprKind::Identity) => self,
            _ => Self::new(ExprKind::Then(self, next)),
        }
    }

    /// Everything `self` yields for the input, followed by everything `other`
    /// yields for the same input.
    ///
    /// The input is pulled once. Every input context is buffered until
    /// `self` has finished, so memory grows with the input size, not with
    /// the output size.
    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Self::new(ExprKind::Or(self, other))
    }

    /// Evaluates the expression lazily over `input`.
    pub fn apply<'a, N: TreeNode>(&'a self, input: Nodes<'a, N>) -> Nodes<'a, N> {
        match self.kind() {
            ExprKind::Identity => input,
            ExprKind::Step { axis, test: NameTest::Any } => axis.walk(input),
            ExprKind::Step { axis, test } => Box::new(axis.walk(input).filter(move |ctx| test.accepts(ctx))),
            ExprKind::Then(first, next) => next.apply(first.apply(input)),
            ExprKind::Or(left, right) => {
                let (for_left, for_right) = input.tee();
                Box::new(left.apply(Box::new(for_left)).chain(right.apply(Box::new(for_right))))
            }
            ExprKind::Where(predicate) => Box::new(input.filter(move |ctx| predicate.matches(ctx))),
            ExprKind::WhereNot(predicate) => Box::new(input.filter(move |ctx| !predicate.matches(ctx))),
            ExprKind::Filter(filter) => Box::new(input.filter(move |ctx| filter.accepts(ctx))),
        }
    }

    /// `true` when the expression yields at least one context for `ctx`
    /// alone. Stops at the first result.
    pub fn matches<N: TreeNode>(&self, ctx: &Context<N>) -> bool {
        self.apply(Box::new(singleton(ctx.clone()))).next().is_some()
    }
}

impl Default for Expr {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Filter> for Expr {
    fn from(filter: Filter) -> Self {
        Self::new(ExprKind::Filter(filter))
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, next: Expr) -> Expr {
        self.then(next)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, other: Expr) -> Expr {
        self.or(other)
    }
}

pub fn child() -> Expr {
    Expr::step(Axis::Child, NameTest::Any)
}

pub fn child_named(name: &str) -> Expr {
    Expr::step(Axis::Child, NameTest::Local(name.into()))
}

pub fn descendant() -> Expr {
    Expr::step(Axis::Descendant, NameTest::Any)
}

pub fn descendant_named(name: &str) -> Expr {
    Expr::step(Axis::Descendant, NameTest::Local(name.into()))
}

pub fn ancestor() -> Expr {
    Expr::step(Axis::Ancestor, NameTest::Any)
}

pub fn ancestor_named(name: &str) -> Expr {
    Expr::step(Axis::Ancestor, NameTest::Local(name.into()))
}

pub fn parent() -> Expr {
    Expr::step(Axis::Parent, NameTest::Any)
}

pub fn parent_named(name: &str) -> Expr {
    Expr::step(Axis::Parent, NameTest::Local(name.into()))
}

/// Keeps candidates for which `predicate` yields at least one context.
pub fn where_(predicate: Expr) -> Expr {
    Expr::new(ExprKind::Where(predicate))
}

/// Keeps candidates for which `predicate` yields nothing.
pub fn where_not(predicate: Expr) -> Expr {
    Expr::new(ExprKind::WhereNot(predicate))
}

/// Keeps nodes whose local name is `name`.
pub fn named(name: &str) -> Expr {
    Filter::Named(name.into()).into()
}

pub fn attribute_eq(name: &str, value: &str) -> Expr {
    Filter::AttributeEq { name: name.into(), value: value.into() }.into()
}

pub fn has_attribute(name: &str) -> Expr {
    Filter::HasAttribute(name.into()).into()
}

/// Keeps nodes whose text contains `needle`.
pub fn text_contains(needle: &str) -> Expr {
    Filter::TextContains(needle.into()).into()
}

/// Keeps elements whose resolved namespace URI is `uri`.
pub fn in_namespace(uri: &str) -> Expr {
    Filter::Namespace(uri.into()).into()
}

// Rendering in path syntax; the output compiles back to an equivalent
// expression.

fn quoted(value: &str) -> String {
    match (value.contains('\''), value.contains('"')) {
        (true, false) => format!("\"{value}\""),
        (false, _) => format!("'{value}'"),
        (true, true) => format!("'{}'", value.replace('\'', "''")),
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Named(name) => write!(f, "local-name()={}", quoted(name)),
            Filter::AttributeEq { name, value } => write!(f, "@{name}={}", quoted(value)),
            Filter::HasAttribute(name) => write!(f, "@{name}"),
            Filter::TextContains(needle) => write!(f, "contains(text(),{})", quoted(needle)),
            Filter::Namespace(uri) => write!(f, "namespace-uri()={}", quoted(uri)),
        }
    }
}

impl Expr {
    fn fmt_predicate(&self, f: &mut fmt::Formatter<'_>) -> Option<fmt::Result> {
        Some(match self.kind() {
            ExprKind::Where(predicate) => write!(f, "[{predicate}]"),
            ExprKind::WhereNot(predicate) => write!(f, "[not({predicate})]"),
            ExprKind::Filter(filter) => write!(f, "[{filter}]"),
            _ => return None,
        })
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Or(..) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Identity => f.write_str("."),
            ExprKind::Step { axis, test: NameTest::Any } => write!(f, "{axis}::*"),
            ExprKind::Step { axis, test: NameTest::Local(name) } => write!(f, "{axis}::{name}"),
            ExprKind::Then(first, next) => {
                first.fmt_operand(f)?;
                match next.fmt_predicate(f) {
                    Some(result) => result,
                    None => {
                        f.write_str("/")?;
                        next.fmt_operand(f)
                    }
                }
            }
            ExprKind::Or(left, right) => write!(f, "{left} | {right}"),
            ExprKind::Where(_) | ExprKind::WhereNot(_) | ExprKind::Filter(_) => {
                f.write_str(".")?;
                self.fmt_predicate(f).unwrap_or(Ok(()))
            }
        }
    }
}
