//! Request-scoped memo of fetched entities.

use std::collections::HashMap;

use crate::entity::Entity;
use crate::types::IdSet;

/// Entities fetched during one call, keyed by kind then id.
///
/// Lives exactly as long as one `fetch`; nothing is evicted and nothing is
/// shared between calls.
#[derive(Debug)]
pub(crate) struct FetchedCache<E: Entity> {
    by_kind: HashMap<E::Kind, HashMap<E::Id, E>>,
}

impl<E: Entity> FetchedCache<E> {
    pub(crate) fn new() -> Self {
        Self {
            by_kind: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, kind: E::Kind, id: &E::Id) -> Option<&E> {
        self.by_kind.get(&kind).and_then(|entities| entities.get(id))
    }

    pub(crate) fn contains(&self, kind: E::Kind, id: &E::Id) -> bool {
        self.get(kind, id).is_some()
    }

    pub(crate) fn insert(&mut self, kind: E::Kind, id: E::Id, value: E) {
        self.by_kind.entry(kind).or_default().insert(id, value);
    }

    pub(crate) fn extend(&mut self, kind: E::Kind, values: HashMap<E::Id, E>) {
        self.by_kind.entry(kind).or_default().extend(values);
    }

    /// Keep only the ids not fetched yet, preserving order.
    pub(crate) fn missing(&self, kind: E::Kind, ids: &IdSet<E::Id>) -> IdSet<E::Id> {
        ids.iter()
            .filter(|id| !self.contains(kind, id))
            .cloned()
            .collect()
    }

    /// Total number of cached entities.
    pub(crate) fn len(&self) -> usize {
        self.by_kind.values().map(HashMap::len).sum()
    }
}
