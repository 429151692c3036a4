//! Level-by-level resolution of a selection.
//!
//! Each level gathers the ids every value needs, issues the batched host
//! calls, then applies results. Values that need further resolution are moved
//! into fresh slots and grouped by `(kind, sub-selection shape)` so that the
//! next level again issues one call per group rather than one per value. The
//! applies for those values are deferred until their group has finished.

use std::collections::HashMap;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, debug_span, trace};

use weave_graph::{Node, Shape};

use super::GraphFetcher;
use super::arena::{SlotArena, SlotId};
use super::cache::FetchedCache;
use crate::entity::Entity;
use crate::error::{FetchError, FetchResult};
use crate::relations::{Property, ToMany, ToOne};
use crate::types::IdSet;

type ChildGroups<E> = IndexMap<(<E as Entity>::Kind, Shape), Vec<SlotId>>;

/// An apply waiting for its child slots to be resolved.
enum Deferred<'a, E: Entity> {
    One {
        parent: SlotId,
        property: &'a ToOne<E>,
        child: SlotId,
    },
    Many {
        parent: SlotId,
        property: &'a ToMany<E>,
        children: SmallVec<[SlotId; 8]>,
    },
}

/// State owned by a single fetch call.
pub(super) struct Resolver<'f, E: Entity> {
    fetcher: &'f GraphFetcher<E>,
    arena: SlotArena<E>,
    cache: FetchedCache<E>,
}

impl<'f, E: Entity> Resolver<'f, E> {
    pub(super) fn new(fetcher: &'f GraphFetcher<E>) -> Self {
        Self {
            fetcher,
            arena: SlotArena::new(),
            cache: FetchedCache::new(),
        }
    }

    /// Resolve `root` over `values` and hand them back in input order.
    pub(super) fn run(mut self, values: Vec<E>, root: &Node) -> FetchResult<Vec<E>> {
        self.arena = SlotArena::with_capacity(values.len());
        let roots: Vec<SlotId> = values.into_iter().map(|v| self.arena.alloc(v)).collect();

        self.resolve(&roots, root, 0)?;

        debug!(
            slots = self.arena.len(),
            cached = self.cache.len(),
            "fetch complete"
        );

        roots.into_iter().map(|slot| self.arena.take(slot)).collect()
    }

    fn resolve(&mut self, slots: &[SlotId], node: &Node, depth: usize) -> FetchResult<()> {
        let Some(&first) = slots.first() else {
            return Ok(());
        };

        let fetcher = self.fetcher;
        let kind = self.arena.get(first)?.kind();
        let ty = fetcher
            .entity_type(kind)
            .ok_or_else(|| FetchError::unknown_type(format!("{:?}", kind)))?;

        for &slot in &slots[1..] {
            let found = self.arena.get(slot)?.kind();
            if found != kind {
                return Err(FetchError::kind_mismatch(
                    format!("{:?}", kind),
                    format!("{:?}", found),
                ));
            }
        }

        let properties = fetcher.find_matching_properties(ty, node)?;
        if properties.is_empty() {
            return Ok(());
        }

        let max_depth = fetcher.config().max_depth;
        if depth > max_depth {
            return Err(FetchError::depth_limit_exceeded(max_depth, node.to_string())
                .with_entity(format!("{:?}", kind)));
        }

        let span = debug_span!("resolve_level", depth, kind = ?kind, values = slots.len());
        let _enter = span.enter();

        if fetcher.debug_config().log_values {
            for &slot in slots {
                let value = self.arena.get(slot)?;
                trace!(value = ?value, "level input");
            }
        }

        let mut groups: ChildGroups<E> = IndexMap::new();
        let mut deferred: Vec<Deferred<'_, E>> = Vec::new();

        self.resolve_to_one(slots, &properties, &mut groups, &mut deferred)?;
        self.resolve_to_many(slots, &properties, &mut groups, &mut deferred)?;

        for ((child_kind, shape), children) in groups {
            trace!(kind = ?child_kind, values = children.len(), selection = %shape.node(), "descending");
            self.resolve(&children, shape.node(), depth + 1)?;
        }

        for pending in deferred {
            self.apply_deferred(pending)?;
        }

        Ok(())
    }

    fn resolve_to_one<'a>(
        &mut self,
        slots: &[SlotId],
        properties: &[(&'a Property<E>, &'a Node)],
        groups: &mut ChildGroups<E>,
        deferred: &mut Vec<Deferred<'a, E>>,
    ) -> FetchResult<()> {
        let fetcher = self.fetcher;

        // Ids merged across every to-one property per target kind.
        let mut wanted: IndexMap<E::Kind, IdSet<E::Id>> = IndexMap::new();
        for &(property, _) in properties {
            let Property::One(relation) = property else {
                continue;
            };
            let target = property.target();
            for &slot in slots {
                if let Some(id) = relation.id_of(self.arena.get(slot)?) {
                    wanted.entry(target).or_default().insert(id);
                }
            }
        }

        for (target, ids) in wanted {
            let ids = self.cache.missing(target, &ids);
            if ids.is_empty() {
                trace!(kind = ?target, "every id already fetched");
                continue;
            }
            let ty = fetcher
                .entity_type(target)
                .ok_or_else(|| FetchError::unknown_type(format!("{:?}", target)))?;
            for batch in batches(ids, fetcher.config().batch_size) {
                debug!(kind = ?target, ids = batch.len(), "fetch_by_ids");
                let fetched = ty.fetch_by_ids(&batch)?;
                self.cache.extend(target, fetched);
            }
        }

        for &slot in slots {
            for &(property, sub) in properties {
                let Property::One(relation) = property else {
                    continue;
                };
                let target = property.target();
                let Some(id) = relation.id_of(self.arena.get(slot)?) else {
                    continue;
                };
                let Some(value) = self.cache.get(target, &id).cloned() else {
                    trace!(relation = property.name(), id = ?id, "target not found, left unset");
                    continue;
                };

                if sub.descends() {
                    let child = self.arena.alloc(value);
                    groups.entry((target, sub.shape())).or_default().push(child);
                    deferred.push(Deferred::One {
                        parent: slot,
                        property: relation,
                        child,
                    });
                } else {
                    trace!(relation = property.name(), id = ?id, "apply");
                    self.arena.update(slot, |parent| relation.apply(parent, value))?;
                }
            }
        }

        Ok(())
    }

    fn resolve_to_many<'a>(
        &mut self,
        slots: &[SlotId],
        properties: &[(&'a Property<E>, &'a Node)],
        groups: &mut ChildGroups<E>,
        deferred: &mut Vec<Deferred<'a, E>>,
    ) -> FetchResult<()> {
        let fetcher = self.fetcher;

        for &(property, sub) in properties {
            let Property::Many(relation) = property else {
                continue;
            };
            let target = property.target();

            let mut parent_ids = IdSet::new();
            let mut slot_ids = Vec::with_capacity(slots.len());
            for &slot in slots {
                let id = relation.id_of(self.arena.get(slot)?);
                if let Some(id) = &id {
                    parent_ids.insert(id.clone());
                }
                slot_ids.push((slot, id));
            }

            if parent_ids.is_empty() {
                continue;
            }

            let mut children_by_parent: HashMap<E::Id, Vec<E>> = HashMap::new();
            for batch in batches(parent_ids, fetcher.config().batch_size) {
                debug!(relation = property.name(), kind = ?target, ids = batch.len(), "fetch_by_parent_ids");
                children_by_parent.extend(relation.fetch_by_parent_ids(&batch)?);
            }

            if let Some(target_ty) = fetcher.entity_type(target) {
                for child in children_by_parent.values().flatten() {
                    if let Some(id) = target_ty.id_of(child) {
                        self.cache.insert(target, id, child.clone());
                    }
                }
            }

            for (slot, id) in slot_ids {
                let Some(id) = id else {
                    continue;
                };
                let children = children_by_parent.get(&id).cloned().unwrap_or_default();

                if sub.descends() && !children.is_empty() {
                    let child_slots: SmallVec<[SlotId; 8]> =
                        children.into_iter().map(|c| self.arena.alloc(c)).collect();
                    groups
                        .entry((target, sub.shape()))
                        .or_default()
                        .extend(child_slots.iter().copied());
                    deferred.push(Deferred::Many {
                        parent: slot,
                        property: relation,
                        children: child_slots,
                    });
                } else {
                    trace!(relation = property.name(), count = children.len(), "apply");
                    self.arena
                        .update(slot, |parent| relation.apply(parent, children))?;
                }
            }
        }

        Ok(())
    }

    fn apply_deferred(&mut self, pending: Deferred<'_, E>) -> FetchResult<()> {
        match pending {
            Deferred::One {
                parent,
                property,
                child,
            } => {
                let value = self.arena.take(child)?;
                self.arena.update(parent, |p| property.apply(p, value))
            }
            Deferred::Many {
                parent,
                property,
                children,
            } => {
                let values = children
                    .into_iter()
                    .map(|child| self.arena.take(child))
                    .collect::<FetchResult<Vec<_>>>()?;
                self.arena.update(parent, |p| property.apply(p, values))
            }
        }
    }
}

/// Split ids into host calls of at most `size` ids each.
fn batches<Id: Clone + Eq + std::hash::Hash>(ids: IdSet<Id>, size: Option<usize>) -> Vec<IdSet<Id>> {
    match size {
        Some(size) if size > 0 && ids.len() > size => {
            let ids: Vec<Id> = ids.into_iter().collect();
            ids.chunks(size)
                .map(|chunk| chunk.iter().cloned().collect())
                .collect()
        }
        _ => vec![ids],
    }
}
