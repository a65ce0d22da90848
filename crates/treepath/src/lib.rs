pub mod axis;
pub mod context;
pub mod error;
pub mod expr;
pub mod model;
pub mod parser;
pub mod scope;
pub mod selection;

pub use axis::{
    Ancestors, Axis, AxisIter, AxisRange, Children, Descendants, Parents, Step, ancestors, children, descendants,
    parents, singleton,
};
pub use context::{Context, XML_NAMESPACE};
pub use error::{Error, Result};
pub use expr::{Expr, Nodes};
pub use model::simple::{SimpleNode, SimpleNodeBuilder, elem, text};
pub use model::xml::{Document, ParseOptions, XmlNode};
pub use model::{NodeKind, TreeNode};
pub use parser::compile;
pub use scope::{NamespaceScope, ScopedMap};
pub use selection::{Selection, concatenate};

/// Compiles `path` and runs it from `node`.
pub fn select<N: TreeNode>(node: N, path: &str) -> Result<Selection<N>> {
    Ok(Selection::from_node(node, compile(path)?))
}
