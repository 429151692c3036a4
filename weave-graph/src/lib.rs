//! # weave-graph
//!
//! Selection graphs for the Weave graph fetcher.
//!
//! This crate provides:
//! - [`Node`], an immutable tree describing which relations to load
//! - A textual grammar for selections (`"language, actors(language)"`)
//! - The `*` and `**` wildcards
//! - Structural [`Shape`] keys used to batch sibling selections
//!
//! ## Example
//!
//! ```rust
//! use weave_graph::Node;
//!
//! // Parse a selection
//! let root = Node::parse("language, actors(language)").unwrap();
//! assert_eq!(root.len(), 2);
//!
//! // Or build it programmatically
//! let built = Node::root([
//!     Node::leaf("language"),
//!     Node::new("actors", [Node::leaf("language")]).unwrap(),
//! ])
//! .unwrap();
//! assert_eq!(root, built);
//! ```

pub mod error;
pub mod node;
pub mod parser;

pub use error::{SelectionError, SelectionResult};
pub use node::{ALL, ALL_DESCENDANTS, Node, Shape, is_valid_name};
pub use parser::parse_selection;
