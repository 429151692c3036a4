//! Relation descriptors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::entity::{Entity, Member};
use crate::error::{BoxError, FetchError, FetchResult};
use crate::types::IdSet;

type IdOf<E> = Arc<dyn Fn(&E) -> Option<<E as Entity>::Id> + Send + Sync>;
type ApplyOne<E> = Arc<dyn Fn(E, E) -> FetchResult<E> + Send + Sync>;
type ApplyMany<E> = Arc<dyn Fn(E, Vec<E>) -> FetchResult<E> + Send + Sync>;
type FetchByParentIds<E> = Arc<
    dyn Fn(&IdSet<<E as Entity>::Id>) -> Result<HashMap<<E as Entity>::Id, Vec<E>>, BoxError>
        + Send
        + Sync,
>;

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    /// Resolved by looking up one target by id.
    ToOne,
    /// Resolved by looking up the children of a parent id.
    ToMany,
}

/// A relation declared on an entity type.
pub enum Property<E: Entity> {
    /// A single, possibly absent, related entity.
    One(ToOne<E>),
    /// A collection of related entities.
    Many(ToMany<E>),
}

impl<E: Entity> Property<E> {
    /// Declare a to-one relation from `C` to `T`.
    ///
    /// `id_of` reads the foreign id from the container, returning `None` when
    /// the relation is absent. `apply` returns the container with the target
    /// spliced in and must be free of side effects.
    pub fn to_one<C, T, I, A>(name: impl Into<SmolStr>, id_of: I, apply: A) -> Self
    where
        C: Member<E> + 'static,
        T: Member<E> + 'static,
        I: Fn(&C) -> Option<E::Id> + Send + Sync + 'static,
        A: Fn(C, T) -> C + Send + Sync + 'static,
    {
        let name = name.into();
        let relation = name.clone();
        Self::One(ToOne {
            name,
            target: T::KIND,
            id_of: Arc::new(move |entity: &E| C::as_member(entity).and_then(&id_of)),
            apply: Arc::new(move |container: E, target: E| {
                let container = unwrap_member::<E, C>(container, &relation)?;
                let target = unwrap_member::<E, T>(target, &relation)?;
                Ok(apply(container, target).into_entity())
            }),
        })
    }

    /// Declare a to-many relation from `C` to `T`.
    ///
    /// `fetch_by_parent_ids` loads the children of many parents in one call,
    /// keyed by parent id, omitting parents without children.
    pub fn to_many<C, T, I, F, A, Err>(
        name: impl Into<SmolStr>,
        id_of: I,
        fetch_by_parent_ids: F,
        apply: A,
    ) -> Self
    where
        C: Member<E> + 'static,
        T: Member<E> + 'static,
        I: Fn(&C) -> E::Id + Send + Sync + 'static,
        F: Fn(&IdSet<E::Id>) -> Result<HashMap<E::Id, Vec<T>>, Err> + Send + Sync + 'static,
        A: Fn(C, Vec<T>) -> C + Send + Sync + 'static,
        Err: Into<BoxError>,
    {
        let name = name.into();
        let relation = name.clone();
        Self::Many(ToMany {
            name,
            target: T::KIND,
            id_of: Arc::new(move |entity: &E| C::as_member(entity).map(&id_of)),
            fetch_by_parent_ids: Arc::new(move |ids: &IdSet<E::Id>| {
                let fetched = fetch_by_parent_ids(ids).map_err(Into::into)?;
                Ok(fetched
                    .into_iter()
                    .map(|(id, children)| {
                        (id, children.into_iter().map(Member::into_entity).collect())
                    })
                    .collect())
            }),
            apply: Arc::new(move |container: E, children: Vec<E>| {
                let container = unwrap_member::<E, C>(container, &relation)?;
                let children = children
                    .into_iter()
                    .map(|child| unwrap_member::<E, T>(child, &relation))
                    .collect::<FetchResult<Vec<T>>>()?;
                Ok(apply(container, children).into_entity())
            }),
        })
    }

    /// The relation name, as used in selections.
    pub fn name(&self) -> &str {
        match self {
            Self::One(p) => &p.name,
            Self::Many(p) => &p.name,
        }
    }

    /// The kind of the related entities.
    pub fn target(&self) -> E::Kind {
        match self {
            Self::One(p) => p.target,
            Self::Many(p) => p.target,
        }
    }

    /// The cardinality of this relation.
    pub fn relation_type(&self) -> RelationType {
        match self {
            Self::One(_) => RelationType::ToOne,
            Self::Many(_) => RelationType::ToMany,
        }
    }

    /// Check if this relation resolves to a collection.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

fn unwrap_member<E: Entity, T: Member<E>>(value: E, relation: &str) -> FetchResult<T> {
    T::from_entity(value).map_err(|other| {
        FetchError::kind_mismatch(format!("{:?}", T::KIND), format!("{:?}", other.kind()))
            .with_relation(relation)
    })
}

impl<E: Entity> fmt::Debug for Property<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name())
            .field("target", &self.target())
            .field("relation_type", &self.relation_type())
            .finish()
    }
}

/// A to-one relation: foreign id on the container, target fetched by id.
pub struct ToOne<E: Entity> {
    name: SmolStr,
    target: E::Kind,
    id_of: IdOf<E>,
    apply: ApplyOne<E>,
}

impl<E: Entity> ToOne<E> {
    /// Read the foreign id, `None` if the relation is absent.
    pub fn id_of(&self, container: &E) -> Option<E::Id> {
        (self.id_of)(container)
    }

    /// Splice a target into its container.
    pub fn apply(&self, container: E, target: E) -> FetchResult<E> {
        (self.apply)(container, target)
    }
}

/// A to-many relation: children fetched by the container's own id.
pub struct ToMany<E: Entity> {
    name: SmolStr,
    target: E::Kind,
    id_of: IdOf<E>,
    fetch_by_parent_ids: FetchByParentIds<E>,
    apply: ApplyMany<E>,
}

impl<E: Entity> ToMany<E> {
    /// Read the parent id used to look up children.
    pub fn id_of(&self, container: &E) -> Option<E::Id> {
        (self.id_of)(container)
    }

    /// Load the children of many parents in a single call.
    pub fn fetch_by_parent_ids(
        &self,
        parent_ids: &IdSet<E::Id>,
    ) -> FetchResult<HashMap<E::Id, Vec<E>>> {
        (self.fetch_by_parent_ids)(parent_ids).map_err(|e| {
            FetchError::host_fetch(format!("{:?}", self.target), e).with_relation(self.name.as_str())
        })
    }

    /// Splice a collection into its container.
    pub fn apply(&self, container: E, children: Vec<E>) -> FetchResult<E> {
        (self.apply)(container, children)
    }
}
