//! Error types for graph fetching with actionable messages.
//!
//! Error codes follow a pattern: W{category}{number}
//! - 1xxx: Selection errors (unknown type, undefined relation, depth)
//! - 2xxx: Host errors (a supplied fetch function failed)
//! - 7xxx: Configuration errors (registry, config files)
//! - 9xxx: Internal errors
//!
//! ```rust
//! use weave_fetch::{ErrorCode, FetchError};
//!
//! let err = FetchError::undefined_properties("Film", ["director"]);
//! assert_eq!(err.code, ErrorCode::UndefinedProperty);
//! assert_eq!(err.context.relations, vec!["director".to_string()]);
//! assert!(err.to_string().contains("director"));
//! ```

use std::fmt;
use thiserror::Error;

use weave_graph::SelectionError;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Boxed error returned by host fetch functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Selection errors (1xxx)
    /// No registered type matches a value (W1001).
    UnknownType = 1001,
    /// The selection names relations the type does not declare (W1002).
    UndefinedProperty = 1002,
    /// A level mixes entity kinds (W1003).
    KindMismatch = 1003,
    /// Recursion went deeper than the configured limit (W1004).
    DepthLimitExceeded = 1004,
    /// A textual selection could not be parsed (W1005).
    InvalidSelection = 1005,

    // Host errors (2xxx)
    /// A host-supplied fetch function failed (W2001).
    HostFetch = 2001,

    // Configuration errors (7xxx)
    /// The type registry is inconsistent (W7001).
    InvalidRegistry = 7001,
    /// A configuration file is unreadable or invalid (W7002).
    InvalidConfiguration = 7002,

    // Internal errors (9xxx)
    /// Internal error (W9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "W1002").
    pub fn code(&self) -> String {
        format!("W{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnknownType => "Unknown entity type",
            Self::UndefinedProperty => "Undefined relation",
            Self::KindMismatch => "Entity kind mismatch",
            Self::DepthLimitExceeded => "Selection depth limit exceeded",
            Self::InvalidSelection => "Invalid selection",
            Self::HostFetch => "Fetch function failed",
            Self::InvalidRegistry => "Invalid type registry",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The entity kind involved.
    pub entity: Option<String>,
    /// The relations involved.
    pub relations: Vec<String>,
    /// The selection involved.
    pub selection: Option<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while resolving a selection graph.
#[derive(Error, Debug)]
pub struct FetchError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<BoxError>,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl FetchError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Set the entity kind.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.context.entity = Some(entity.into());
        self
    }

    /// Add a relation name.
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.context.relations.push(relation.into());
        self
    }

    /// Set the selection.
    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.context.selection = Some(selection.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the source error.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    // ============== Constructor Functions ==============

    /// Create an unknown type error.
    pub fn unknown_type(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::UnknownType,
            format!("No registered type matches {}", entity),
        )
        .with_entity(&entity)
        .with_help("Register an EntityType for this kind with GraphFetcher::builder()")
    }

    /// Create an undefined property error listing every unknown name.
    pub fn undefined_properties<I, S>(entity: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entity = entity.into();
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut err = Self::new(
            ErrorCode::UndefinedProperty,
            format!("Undefined properties of type {}: {}", entity, names.join(", ")),
        )
        .with_entity(&entity);
        err.context.relations = names;
        err
    }

    /// Create a kind mismatch error.
    pub fn kind_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        let expected = expected.into();
        let found = found.into();
        Self::new(
            ErrorCode::KindMismatch,
            format!("Expected {} but found {}", expected, found),
        )
        .with_entity(&expected)
        .with_help("All values passed to one fetch call must be of the same entity kind")
    }

    /// Create a depth limit error.
    pub fn depth_limit_exceeded(max_depth: usize, selection: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DepthLimitExceeded,
            format!("Selection exceeded the maximum depth of {}", max_depth),
        )
        .with_selection(selection)
        .with_help("The data may contain a cycle reachable through `**`; raise fetch.max_depth or select explicitly")
    }

    /// Create an error for a failed host fetch function.
    pub fn host_fetch(entity: impl Into<String>, source: BoxError) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::HostFetch,
            format!("Fetching {} failed: {}", entity, source),
        )
        .with_entity(&entity)
        .with_source(source)
    }

    /// Create an invalid registry error listing every problem found.
    pub fn invalid_registry<I, S>(problems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let problems: Vec<String> = problems.into_iter().map(Into::into).collect();
        Self::new(
            ErrorCode::InvalidRegistry,
            format!("Invalid type registry: {}", problems.join("; ")),
        )
    }

    /// Create a configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    // ============== Error Checks ==============

    /// Check if this is an unknown type error.
    pub fn is_unknown_type(&self) -> bool {
        self.code == ErrorCode::UnknownType
    }

    /// Check if this is an undefined property error.
    pub fn is_undefined_property(&self) -> bool {
        self.code == ErrorCode::UndefinedProperty
    }

    /// Check if a host fetch function caused this error.
    pub fn is_host_fetch(&self) -> bool {
        self.code == ErrorCode::HostFetch
    }
}

impl From<SelectionError> for FetchError {
    fn from(err: SelectionError) -> Self {
        Self::new(ErrorCode::InvalidSelection, format!("Invalid selection: {}", err))
            .with_source(err)
    }
}
