//! Pest grammar parser for textual selection graphs.

use pest_derive::Parser;

/// The selection graph parser.
#[derive(Parser)]
#[grammar = "parser/selection.pest"]
pub struct SelectionParser;
