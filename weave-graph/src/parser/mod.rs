//! Parser for the textual selection grammar.
//!
//! ```text
//! language, originalLanguage      two relations, one level deep
//! actors(language(country))       nested relations
//! *                               every relation of this level
//! actors(**)                      actors and everything reachable below them
//! ```

mod grammar;

use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;

use crate::error::{SelectionError, SelectionResult};
use crate::node::Node;

pub use grammar::{Rule, SelectionParser};

/// Parse a selection graph from a string.
///
/// The result is a root node (empty name) whose children are the top-level
/// selections. Whitespace is insignificant and stray commas are ignored.
pub fn parse_selection(input: &str) -> SelectionResult<Node> {
    let pairs = SelectionParser::parse(Rule::graph, input).map_err(|e| {
        let (offset, len) = match e.location {
            InputLocation::Pos(pos) => (pos, 0),
            InputLocation::Span((start, end)) => (start, end - start),
        };
        SelectionError::syntax(input, offset, len, e.variant.message().into_owned())
    })?;

    let mut children = Vec::new();
    for graph in pairs {
        for pair in graph.into_inner() {
            if pair.as_rule() != Rule::EOI {
                children.push(parse_node(pair)?);
            }
        }
    }

    let root = Node::root(children)?;
    tracing::trace!(selection = %root, "parsed selection");
    Ok(root)
}

/// Parse a single selection entry.
fn parse_node(pair: Pair<'_, Rule>) -> SelectionResult<Node> {
    match pair.as_rule() {
        Rule::all => Ok(Node::all()),
        Rule::all_descendants => Ok(Node::all_descendants()),
        Rule::relation => {
            let mut name = "";
            let mut children = Vec::new();
            for item in pair.into_inner() {
                match item.as_rule() {
                    Rule::ident => name = item.as_str(),
                    Rule::children => {
                        for child in item.into_inner() {
                            children.push(parse_node(child)?);
                        }
                    }
                    _ => {}
                }
            }
            Node::new(name, children)
        }
        other => Err(SelectionError::syntax(
            pair.as_str(),
            0,
            pair.as_str().len(),
            format!("unexpected {other:?}"),
        )),
    }
}
