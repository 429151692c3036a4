//! Type descriptors: identity and batch lookup for one entity kind.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::entity::{Entity, Member};
use crate::error::{BoxError, FetchError, FetchResult};
use crate::relations::Property;

/// A set of ids passed to one batched fetch call, in first-seen order.
pub type IdSet<Id> = IndexSet<Id>;

type IdOf<E> = Arc<dyn Fn(&E) -> Option<<E as Entity>::Id> + Send + Sync>;
type FetchByIds<E> = Arc<
    dyn Fn(&IdSet<<E as Entity>::Id>) -> Result<HashMap<<E as Entity>::Id, E>, BoxError>
        + Send
        + Sync,
>;

/// Metadata for one kind of entity.
///
/// Holds how to read an entity's id, how to load many entities of this kind by
/// id in one call, and the relations the kind declares.
pub struct EntityType<E: Entity> {
    kind: E::Kind,
    id_of: IdOf<E>,
    fetch_by_ids: FetchByIds<E>,
    properties: Vec<Property<E>>,
}

impl<E: Entity> EntityType<E> {
    /// Create a type descriptor for the member type `T`.
    ///
    /// `fetch_by_ids` must omit ids with no corresponding entity rather than
    /// failing for them, and key its result by `id_of`.
    pub fn new<T, I, F, Err>(id_of: I, fetch_by_ids: F) -> Self
    where
        T: Member<E> + 'static,
        I: Fn(&T) -> E::Id + Send + Sync + 'static,
        F: Fn(&IdSet<E::Id>) -> Result<HashMap<E::Id, T>, Err> + Send + Sync + 'static,
        Err: Into<BoxError>,
    {
        Self {
            kind: T::KIND,
            id_of: Arc::new(move |entity: &E| T::as_member(entity).map(&id_of)),
            fetch_by_ids: Arc::new(move |ids: &IdSet<E::Id>| {
                let fetched = fetch_by_ids(ids).map_err(Into::into)?;
                Ok(fetched
                    .into_iter()
                    .map(|(id, value)| (id, value.into_entity()))
                    .collect())
            }),
            properties: Vec::new(),
        }
    }

    /// Declare the relations of this type.
    pub fn with_properties(mut self, properties: impl IntoIterator<Item = Property<E>>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// The kind tag.
    pub fn kind(&self) -> E::Kind {
        self.kind
    }

    /// The declared relations, in declaration order.
    pub fn properties(&self) -> &[Property<E>] {
        &self.properties
    }

    /// Look up a declared relation by name.
    pub fn property(&self, name: &str) -> Option<&Property<E>> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Check if a value is of this kind.
    pub fn supports(&self, value: &E) -> bool {
        value.kind() == self.kind
    }

    /// Read the id of a value of this kind.
    pub fn id_of(&self, value: &E) -> Option<E::Id> {
        (self.id_of)(value)
    }

    /// Load entities of this kind by id in a single call.
    pub fn fetch_by_ids(&self, ids: &IdSet<E::Id>) -> FetchResult<HashMap<E::Id, E>> {
        (self.fetch_by_ids)(ids).map_err(|e| FetchError::host_fetch(format!("{:?}", self.kind), e))
    }

    pub(crate) fn push_properties(&mut self, properties: Vec<Property<E>>) {
        self.properties.extend(properties);
    }
}

impl<E: Entity> fmt::Debug for EntityType<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.properties.iter().map(|p| p.name()).collect();
        write!(f, "{:?}({})", self.kind, names.join(", "))
    }
}
