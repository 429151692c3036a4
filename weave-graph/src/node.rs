//! Selection nodes: an immutable tree naming the relations to load.
//!
//! A node has a name (a relation name, a wildcard, or empty for the root) and a
//! set of uniquely-named children. Lookups through [`Node::get`] honour the
//! wildcards:
//!
//! - `*` ([`Node::all`]) selects every relation of one level without descending.
//! - `**` ([`Node::all_descendants`]) selects every relation of this level and,
//!   recursively, every relation reachable below it.
//!
//! ```rust
//! use weave_graph::Node;
//!
//! let root = Node::parse("language, actors(language)").unwrap();
//! let actors = root.get("actors").unwrap();
//! assert!(actors.get("language").unwrap().is_leaf());
//! assert!(root.get("director").is_none());
//!
//! let everything = Node::parse("*").unwrap();
//! assert!(everything.get("director").unwrap().is_all());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;

use crate::error::{SelectionError, SelectionResult};
use crate::parser::parse_selection;

/// Name of the single-level wildcard.
pub const ALL: &str = "*";

/// Name of the recursive wildcard.
pub const ALL_DESCENDANTS: &str = "**";

/// A node of a selection graph.
///
/// Children are stored by name, so iteration is in name order and two nodes
/// built in a different order compare equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
    name: SmolStr,
    children: Arc<BTreeMap<SmolStr, Node>>,
}

impl Node {
    /// Create a node with the given children.
    ///
    /// Fails if two children share a name, if a wildcard is given children, or
    /// if a name could not be written back in the textual grammar.
    pub fn new(
        name: impl Into<SmolStr>,
        children: impl IntoIterator<Item = Node>,
    ) -> SelectionResult<Self> {
        let name = name.into();
        let mut by_name = BTreeMap::new();
        for child in children {
            if child.name.is_empty() || !is_valid_name(&child.name) {
                return Err(SelectionError::InvalidName {
                    name: child.name.to_string(),
                });
            }
            if by_name.contains_key(&child.name) {
                return Err(SelectionError::duplicate(name.as_str(), child.name.as_str()));
            }
            by_name.insert(child.name.clone(), child);
        }

        if is_wildcard(&name) && !by_name.is_empty() {
            return Err(SelectionError::WildcardWithChildren {
                name: name.to_string(),
            });
        }
        if !name.is_empty() && !is_valid_name(&name) {
            return Err(SelectionError::InvalidName {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name,
            children: Arc::new(by_name),
        })
    }

    /// Create a root node (empty name) with the given top-level selections.
    pub fn root(children: impl IntoIterator<Item = Node>) -> SelectionResult<Self> {
        Self::new("", children)
    }

    /// Create a relation node without nested selections.
    pub fn leaf(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            children: Arc::default(),
        }
    }

    /// The root node that selects nothing.
    pub fn empty() -> Self {
        Self::leaf("")
    }

    /// The `*` wildcard: every relation of one level, no further descent.
    pub fn all() -> Self {
        Self::leaf(ALL)
    }

    /// The `**` wildcard: every relation, recursively.
    pub fn all_descendants() -> Self {
        Self::leaf(ALL_DESCENDANTS)
    }

    /// Parse a selection graph from its textual form.
    pub fn parse(input: &str) -> SelectionResult<Self> {
        parse_selection(input)
    }

    /// The relation name (empty for a root).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate over the children in name order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.values()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if the node has no direct children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Look up a direct child by its exact name, ignoring wildcards.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Resolve the selection for a relation name.
    ///
    /// Returns the wildcard child if there is one (`**` before `*`), otherwise
    /// the child with that exact name. The wildcards themselves answer every
    /// name with themselves.
    pub fn get(&self, name: &str) -> Option<&Node> {
        if self.is_wildcard() {
            return Some(self);
        }
        self.children
            .get(ALL_DESCENDANTS)
            .or_else(|| self.children.get(ALL))
            .or_else(|| self.children.get(name))
    }

    /// Check if this is the `*` wildcard.
    pub fn is_all(&self) -> bool {
        self.name == ALL
    }

    /// Check if this is the `**` wildcard.
    pub fn is_all_descendants(&self) -> bool {
        self.name == ALL_DESCENDANTS
    }

    /// Check if this is either wildcard.
    pub fn is_wildcard(&self) -> bool {
        is_wildcard(&self.name)
    }

    /// Check if selecting this node stops at the relation itself.
    pub fn is_leaf(&self) -> bool {
        !self.descends()
    }

    /// Check if the relations of the selected values must be resolved as well.
    pub fn descends(&self) -> bool {
        self.is_all_descendants() || !self.children.is_empty()
    }

    /// The structural identity of this node's sub-selection.
    pub fn shape(&self) -> Shape {
        Shape(self.clone())
    }
}

fn is_wildcard(name: &str) -> bool {
    name == ALL || name == ALL_DESCENDANTS
}

/// Whether `name` can be written as a relation in the textual grammar: an
/// ASCII letter or `_` followed by ASCII letters, digits or `_`, or one of the
/// wildcards.
pub fn is_valid_name(name: &str) -> bool {
    if is_wildcard(name) {
        return true;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let is_root = self.name.is_empty();
        f.write_str(&self.name)?;
        if self.children.is_empty() {
            return Ok(());
        }
        if !is_root {
            f.write_str("(")?;
        }
        for (i, child) in self.children.values().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        if !is_root {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({self})")
    }
}

impl FromStr for Node {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Structural key of a selection, used to batch sibling sub-selections.
///
/// Two shapes are equal when both nodes agree on being `**` and have equal
/// children; the nodes' own names and identities do not matter.
#[derive(Clone, Debug)]
pub struct Shape(Node);

impl Shape {
    /// A node carrying this shape.
    pub fn node(&self) -> &Node {
        &self.0
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.0.is_all_descendants() == other.0.is_all_descendants()
            && self.0.children == other.0.children
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.is_all_descendants().hash(state);
        self.0.children.hash(state);
    }
}
