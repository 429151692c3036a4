//! Error types for building and parsing selection graphs.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for selection operations.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// Errors that can occur while building or parsing a selection graph.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Syntax error in a textual selection.
    #[error("syntax error in selection: {message}")]
    #[diagnostic(code(weave::graph::syntax_error))]
    SyntaxError {
        #[source_code]
        src: String,
        #[label("error here")]
        span: miette::SourceSpan,
        message: String,
    },

    /// Two children of one node share a name.
    #[error("duplicate selection `{name}` under `{parent}`")]
    #[diagnostic(
        code(weave::graph::duplicate),
        help("merge the nested selections into a single `{name}(...)` entry")
    )]
    Duplicate { parent: String, name: String },

    /// A wildcard was given nested selections.
    #[error("wildcard `{name}` cannot have nested selections")]
    #[diagnostic(code(weave::graph::wildcard_with_children))]
    WildcardWithChildren { name: String },

    /// A relation name that cannot be rendered back into the grammar.
    #[error("invalid relation name `{name}`")]
    #[diagnostic(
        code(weave::graph::invalid_name),
        help("relation names start with an ASCII letter or `_` and continue with ASCII letters, digits or `_`")
    )]
    InvalidName { name: String },
}

impl SelectionError {
    /// Create a syntax error with source location.
    pub fn syntax(
        src: impl Into<String>,
        offset: usize,
        len: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::SyntaxError {
            src: src.into(),
            span: (offset, len).into(),
            message: message.into(),
        }
    }

    /// Create a duplicate child error.
    pub fn duplicate(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            parent: parent.into(),
            name: name.into(),
        }
    }

    /// Check if this is a syntax error.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::SyntaxError { .. })
    }
}
