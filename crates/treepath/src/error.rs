//! Errors raised while loading documents and compiling path expressions.
//!
//! Traversal itself never fails: walking off the tree ends a sequence and
//! missing names or attributes read as absent or empty.
use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;

use crate::parser::Rule;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("invalid character or entity reference: {0}")]
    Escape(#[from] EscapeError),
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] core::str::Utf8Error),
    #[error("unbalanced markup: expected {expected}, found {found}")]
    UnbalancedTag { expected: String, found: String },
    #[error("document has no root element")]
    NoRootElement,
    #[error("element <{0}> follows the root element")]
    TrailingElement(String),
    #[error("invalid path expression: {0}")]
    Syntax(String),
}

impl From<pest::error::Error<Rule>> for Error {
    fn from(e: pest::error::Error<Rule>) -> Self {
        Error::Syntax(e.to_string())
    }
}
