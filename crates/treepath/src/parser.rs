//! Compiles the textual path syntax into [`Expr`] values.
//!
//! ```
//! use treepath::expr::{child, descendant_named, ancestor_named, where_};
//! use treepath::parser::compile;
//!
//! let compiled = compile("child::*[descendant::y/ancestor::x]").unwrap();
//! assert_eq!(compiled, child() / where_(descendant_named("y") / ancestor_named("x")));
//! ```
use pest::Parser;
use pest::error::ErrorVariant;
use pest::iterators::Pair;

use crate::axis::Axis;
use crate::error::Result;
use crate::expr::{
    Expr, NameTest, attribute_eq, has_attribute, in_namespace, named, text_contains, where_, where_not,
};

#[derive(pest_derive::Parser)]
#[grammar = "path.pest"]
pub struct PathParser;

/// Parses `input` and builds the expression it denotes.
pub fn compile(input: &str) -> Result<Expr> {
    let mut pairs = PathParser::parse(Rule::path, input)?;
    let root = pairs.next().ok_or_else(|| unsupported_input(input))?;
    let union = root.into_inner().next().ok_or_else(|| unsupported_input(input))?;
    let span = union.as_span();
    let Some(expr) = PathParser::build_union(union) else {
        return Err(pest::error::Error::new_from_span(
            ErrorVariant::<Rule>::CustomError { message: "unsupported path expression".into() },
            span,
        )
        .into());
    };
    tracing::debug!(path = input, compiled = %expr, "compiled path expression");
    Ok(expr)
}

fn unsupported_input(input: &str) -> crate::error::Error {
    crate::error::Error::Syntax(format!("empty parse tree for {input:?}"))
}

impl PathParser {
    fn build_union(pair: Pair<'_, Rule>) -> Option<Expr> {
        debug_assert_eq!(pair.as_rule(), Rule::union);
        let mut branches = pair.into_inner().map(Self::build_sequence);
        let first = branches.next()??;
        branches.try_fold(first, |acc, branch| Some(acc.or(branch?)))
    }

    fn build_sequence(pair: Pair<'_, Rule>) -> Option<Expr> {
        let mut steps = pair.into_inner().map(Self::build_step);
        let first = steps.next()??;
        steps.try_fold(first, |acc, step| Some(acc.then(step?)))
    }

    fn build_step(pair: Pair<'_, Rule>) -> Option<Expr> {
        let mut inner = pair.into_inner();
        let primary = inner.next()?;
        let mut expr = match primary.as_rule() {
            Rule::axis_step => Self::build_axis_step(primary)?,
            Rule::self_step => Expr::identity(),
            Rule::group => Self::build_union(primary.into_inner().next()?)?,
            _ => return None,
        };
        for predicate in inner {
            expr = expr.then(Self::build_condition(predicate.into_inner().next()?)?);
        }
        Some(expr)
    }

    fn build_axis_step(pair: Pair<'_, Rule>) -> Option<Expr> {
        let mut inner = pair.into_inner();
        let axis = match inner.next()?.as_str() {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "ancestor" => Axis::Ancestor,
            "parent" => Axis::Parent,
            _ => return None,
        };
        let test = inner.next()?.into_inner().next()?;
        let test = match test.as_rule() {
            Rule::wildcard => NameTest::Any,
            Rule::name => NameTest::Local(test.as_str().into()),
            _ => return None,
        };
        Some(Expr::step(axis, test))
    }

    fn build_condition(pair: Pair<'_, Rule>) -> Option<Expr> {
        let test = pair.into_inner().next()?;
        match test.as_rule() {
            Rule::negation => Some(where_not(Self::build_union(test.into_inner().next()?)?)),
            Rule::attribute_test => {
                let mut inner = test.into_inner();
                let name = inner.next()?.as_str();
                match inner.next() {
                    Some(value) => Some(attribute_eq(name, &Self::string_value(value)?)),
                    None => Some(has_attribute(name)),
                }
            }
            Rule::text_test => Some(text_contains(&Self::string_value(test.into_inner().next()?)?)),
            Rule::namespace_test => Some(in_namespace(&Self::string_value(test.into_inner().next()?)?)),
            Rule::local_name_test => Some(named(&Self::string_value(test.into_inner().next()?)?)),
            Rule::union => Some(where_(Self::build_union(test)?)),
            _ => None,
        }
    }

    fn string_value(pair: Pair<'_, Rule>) -> Option<String> {
        debug_assert_eq!(pair.as_rule(), Rule::string);
        let content = pair.into_inner().next()?;
        Some(match content.as_rule() {
            Rule::sq_inner => content.as_str().replace("''", "'"),
            _ => content.as_str().replace("\"\"", "\""),
        })
    }
}

impl core::str::FromStr for Expr {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        compile(s)
    }
}
