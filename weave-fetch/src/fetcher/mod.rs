//! The graph fetcher: registry of entity types and the batched traversal.
//!
//! A [`GraphFetcher`] is built once from every [`EntityType`] of a model and
//! shared afterwards. Each `fetch` walks the selection level by level and
//! issues at most one host call per target kind (to-one) or per collection
//! relation (to-many) at every level, however many values it is given.
//!
//! ## Example
//!
//! ```rust,ignore
//! let fetcher = GraphFetcher::builder()
//!     .register(film_type)
//!     .register(actor_type)
//!     .register(language_type)
//!     .build()?;
//!
//! let films = fetcher.fetch(films, &Node::parse("language, actors(language)")?)?;
//! ```

mod arena;
mod cache;
mod resolve;

use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use weave_graph::Node;

use crate::config::{DebugConfig, FetchConfig, WeaveConfig};
use crate::entity::{Entity, Member};
use crate::error::{FetchError, FetchResult};
use crate::relations::Property;
use crate::types::EntityType;

use resolve::Resolver;

/// Resolves selections over a frozen registry of entity types.
///
/// Holds no per-request state, so one instance can serve many threads.
pub struct GraphFetcher<E: Entity> {
    types: IndexMap<E::Kind, EntityType<E>>,
    config: FetchConfig,
    debug: DebugConfig,
}

impl<E: Entity> GraphFetcher<E> {
    /// Start building a fetcher.
    pub fn builder() -> GraphFetcherBuilder<E> {
        GraphFetcherBuilder::new()
    }

    /// The fetch settings in effect.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// The registered types, in registration order.
    pub fn types(&self) -> impl Iterator<Item = &EntityType<E>> {
        self.types.values()
    }

    /// Look up a registered type by kind.
    pub fn entity_type(&self, kind: E::Kind) -> Option<&EntityType<E>> {
        self.types.get(&kind)
    }

    /// Find the type describing a value.
    pub fn find_matching_type(&self, value: &E) -> FetchResult<&EntityType<E>> {
        let kind = value.kind();
        self.types
            .get(&kind)
            .ok_or_else(|| FetchError::unknown_type(format!("{:?}", kind)))
    }

    /// Pair each declared property of `ty` with the sub-selection `node`
    /// holds for it, in declaration order.
    ///
    /// Every child of `node` that names no declared property is reported in a
    /// single error. Wildcard children never fail.
    pub fn find_matching_properties<'a>(
        &'a self,
        ty: &'a EntityType<E>,
        node: &'a Node,
    ) -> FetchResult<Vec<(&'a Property<E>, &'a Node)>> {
        let undefined: Vec<&str> = node
            .children()
            .filter(|child| !child.is_wildcard() && ty.property(child.name()).is_none())
            .map(Node::name)
            .collect();

        if !undefined.is_empty() {
            return Err(
                FetchError::undefined_properties(format!("{:?}", ty.kind()), undefined)
                    .with_selection(node.to_string()),
            );
        }

        Ok(ty
            .properties()
            .iter()
            .filter_map(|property| node.get(property.name()).map(|sub| (property, sub)))
            .collect())
    }

    /// Populate the relations selected by `root` on every value.
    ///
    /// Returns one value per input, in input order. All values must be of the
    /// same kind.
    pub fn fetch(&self, values: impl IntoIterator<Item = E>, root: &Node) -> FetchResult<Vec<E>> {
        let values: Vec<E> = values.into_iter().collect();
        if values.is_empty() {
            return Ok(values);
        }
        Resolver::new(self).run(values, root)
    }

    /// Populate the relations selected by `root` on a single value.
    pub fn fetch_one(&self, value: E, root: &Node) -> FetchResult<E> {
        self.fetch([value], root)?
            .pop()
            .ok_or_else(|| FetchError::internal("fetch returned no value for a single input"))
    }

    /// Like [`fetch`](Self::fetch), over values of one member type.
    pub fn fetch_as<T: Member<E>>(
        &self,
        values: impl IntoIterator<Item = T>,
        root: &Node,
    ) -> FetchResult<Vec<T>> {
        self.fetch(values.into_iter().map(Member::into_entity), root)?
            .into_iter()
            .map(|value| {
                T::from_entity(value).map_err(|other| {
                    FetchError::kind_mismatch(format!("{:?}", T::KIND), format!("{:?}", other.kind()))
                })
            })
            .collect()
    }

    /// Fetch with a textual selection, such as a `fetch=` query parameter.
    ///
    /// A missing or blank selection returns the values untouched.
    pub fn fetch_selection(
        &self,
        values: impl IntoIterator<Item = E>,
        selection: Option<&str>,
    ) -> FetchResult<Vec<E>> {
        match selection.map(str::trim).filter(|text| !text.is_empty()) {
            None => Ok(values.into_iter().collect()),
            Some(text) => {
                let root = Node::parse(text)
                    .map_err(|e| FetchError::from(e).with_selection(text))?;
                self.fetch(values, &root)
            }
        }
    }

    pub(crate) fn debug_config(&self) -> &DebugConfig {
        &self.debug
    }
}

impl<E: Entity> fmt::Debug for GraphFetcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphFetcher")
            .field("types", &self.types.values().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`GraphFetcher`].
///
/// Relations may be attached after registration with
/// [`relations`](Self::relations), which lets types that refer to each other
/// be declared in any order.
pub struct GraphFetcherBuilder<E: Entity> {
    types: Vec<EntityType<E>>,
    relations: Vec<(E::Kind, Vec<Property<E>>)>,
    config: FetchConfig,
    debug: DebugConfig,
}

impl<E: Entity> GraphFetcherBuilder<E> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            relations: Vec::new(),
            config: FetchConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    /// Register an entity type.
    pub fn register(mut self, ty: EntityType<E>) -> Self {
        self.types.push(ty);
        self
    }

    /// Attach relations to a registered kind.
    pub fn relations(mut self, kind: E::Kind, properties: impl IntoIterator<Item = Property<E>>) -> Self {
        self.relations.push((kind, properties.into_iter().collect()));
        self
    }

    /// Set the fetch settings.
    pub fn config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the debug settings.
    pub fn debug(mut self, debug: DebugConfig) -> Self {
        self.debug = debug;
        self
    }

    /// Take the fetch and debug settings from a loaded configuration.
    pub fn with_config(self, config: &WeaveConfig) -> Self {
        self.config(config.fetch.clone()).debug(config.debug.clone())
    }

    /// Validate the registry and freeze it.
    pub fn build(self) -> FetchResult<GraphFetcher<E>> {
        self.config.validate()?;

        let mut problems = Vec::new();
        let mut types: IndexMap<E::Kind, EntityType<E>> = IndexMap::with_capacity(self.types.len());

        for ty in self.types {
            let kind = ty.kind();
            if types.contains_key(&kind) {
                problems.push(format!("kind {:?} is registered more than once", kind));
                continue;
            }
            types.insert(kind, ty);
        }

        for (kind, properties) in self.relations {
            match types.get_mut(&kind) {
                Some(ty) => ty.push_properties(properties),
                None => problems.push(format!(
                    "relations declared for unregistered kind {:?}",
                    kind
                )),
            }
        }

        for ty in types.values() {
            let mut seen = HashSet::new();
            for property in ty.properties() {
                let name = property.name();
                if name == weave_graph::ALL || name == weave_graph::ALL_DESCENDANTS {
                    problems.push(format!("{:?}.{} uses a reserved wildcard name", ty.kind(), name));
                } else if !weave_graph::is_valid_name(name) {
                    problems.push(format!(
                        "{:?}.{:?} is not a valid relation name",
                        ty.kind(),
                        name
                    ));
                }
                if !seen.insert(name) {
                    problems.push(format!("{:?}.{} is declared more than once", ty.kind(), name));
                }
                if !types.contains_key(&property.target()) {
                    problems.push(format!(
                        "{:?}.{} targets unregistered kind {:?}",
                        ty.kind(),
                        name,
                        property.target()
                    ));
                }
            }
        }

        if !problems.is_empty() {
            return Err(FetchError::invalid_registry(problems));
        }

        debug!(
            types = types.len(),
            max_depth = self.config.max_depth,
            "GraphFetcher built"
        );

        Ok(GraphFetcher {
            types,
            config: self.config,
            debug: self.debug,
        })
    }
}

impl<E: Entity> Default for GraphFetcherBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use crate::fixtures::*;
    use pretty_assertions::assert_eq;

    fn node(text: &str) -> Node {
        Node::parse(text).unwrap()
    }

    fn names(properties: &[(&Property<Model>, &Node)]) -> Vec<(String, String)> {
        properties
            .iter()
            .map(|(p, n)| (p.name().to_string(), n.to_string()))
            .collect()
    }

    #[test]
    fn test_find_matching_type() {
        let fetcher = Tracker::default().fetcher();
        let film = fetcher.find_matching_type(&fight_club().into_entity()).unwrap();
        assert_eq!(film.kind(), Kind::Film);
        let actor = fetcher.find_matching_type(&brad().into_entity()).unwrap();
        assert_eq!(actor.kind(), Kind::Actor);
        let language = fetcher.find_matching_type(&english().into_entity()).unwrap();
        assert_eq!(language.kind(), Kind::Language);
    }

    #[test]
    fn test_find_matching_type_rejects_unknown() {
        let fetcher = GraphFetcher::builder()
            .register(language_type(languages()))
            .register(country_type_with(countries(), Calls::default()))
            .register(continent_type_with(continents(), Calls::default()))
            .build()
            .unwrap();
        let err = fetcher
            .find_matching_type(&fight_club().into_entity())
            .unwrap_err();
        assert!(err.is_unknown_type());
        assert_eq!(err.context.entity.as_deref(), Some("Film"));
    }

    #[test]
    fn test_find_matching_properties_all() {
        let fetcher = Tracker::default().fetcher();
        let film = fetcher.entity_type(Kind::Film).unwrap();
        let all = Node::all();
        let properties = fetcher.find_matching_properties(film, &all).unwrap();
        assert_eq!(properties.len(), film.properties().len());
        for (_, sub) in &properties {
            assert!(sub.is_all());
        }
    }

    #[test]
    fn test_find_matching_properties_by_name() {
        let fetcher = Tracker::default().fetcher();
        let film = fetcher.entity_type(Kind::Film).unwrap();

        let selection = node("language");
        let properties = fetcher.find_matching_properties(film, &selection).unwrap();
        assert_eq!(names(&properties), vec![("language".into(), "language".into())]);

        let selection = node("actors, language");
        let properties = fetcher.find_matching_properties(film, &selection).unwrap();
        assert_eq!(
            names(&properties),
            vec![
                ("language".into(), "language".into()),
                ("actors".into(), "actors".into()),
            ]
        );
    }

    #[test]
    fn test_find_matching_properties_nested_wildcard() {
        let fetcher = Tracker::default().fetcher();
        let film = fetcher.entity_type(Kind::Film).unwrap();
        let selection = node("*, actors(language)");
        let properties = fetcher.find_matching_properties(film, &selection).unwrap();
        // An explicit child is shadowed by the wildcard sibling.
        assert_eq!(
            names(&properties),
            vec![
                ("language".into(), "*".into()),
                ("originalLanguage".into(), "*".into()),
                ("actors".into(), "*".into()),
            ]
        );
    }

    #[test]
    fn test_find_matching_properties_lists_every_unknown_name() {
        let fetcher = Tracker::default().fetcher();
        let film = fetcher.entity_type(Kind::Film).unwrap();
        let selection = node("language, director, studio");
        let err = fetcher
            .find_matching_properties(film, &selection)
            .unwrap_err();
        assert!(err.is_undefined_property());
        assert_eq!(err.context.relations, vec!["director", "studio"]);
        assert_eq!(err.context.entity.as_deref(), Some("Film"));
    }

    #[test]
    fn test_build_collects_every_problem() {
        let err = GraphFetcher::builder()
            .register(film_type(films(), actors_by_film()))
            .register(language_type(languages()))
            .register(language_type(languages()))
            .relations(
                Kind::Continent,
                [Property::to_one(
                    "parent",
                    |c: &Continent| Some(c.id.clone()),
                    |c: Continent, _p: Continent| c,
                )],
            )
            .build()
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidRegistry);
        let message = err.to_string();
        assert!(message.contains("kind Language is registered more than once"));
        assert!(message.contains("relations declared for unregistered kind Continent"));
        assert!(message.contains("Film.actors targets unregistered kind Actor"));
        assert!(message.contains("Language.country targets unregistered kind Country"));
    }

    #[test]
    fn test_build_rejects_duplicate_and_reserved_names() {
        let err = GraphFetcher::builder()
            .register(continent_type_with(continents(), Calls::default()))
            .relations(
                Kind::Continent,
                [
                    Property::to_one(
                        "*",
                        |c: &Continent| Some(c.id.clone()),
                        |c: Continent, _p: Continent| c,
                    ),
                    Property::to_one(
                        "next",
                        |c: &Continent| Some(c.id.clone()),
                        |c: Continent, _p: Continent| c,
                    ),
                    Property::to_one(
                        "next",
                        |c: &Continent| Some(c.id.clone()),
                        |c: Continent, _p: Continent| c,
                    ),
                ],
            )
            .build()
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Continent.* uses a reserved wildcard name"));
        assert!(message.contains("Continent.next is declared more than once"));
    }

    #[test]
    fn test_build_rejects_names_outside_selection_grammar() {
        let err = GraphFetcher::builder()
            .register(continent_type_with(continents(), Calls::default()))
            .relations(
                Kind::Continent,
                [
                    Property::to_one(
                        "first-name",
                        |c: &Continent| Some(c.id.clone()),
                        |c: Continent, _p: Continent| c,
                    ),
                    Property::to_one(
                        "9lives",
                        |c: &Continent| Some(c.id.clone()),
                        |c: Continent, _p: Continent| c,
                    ),
                    Property::to_one(
                        "next_one",
                        |c: &Continent| Some(c.id.clone()),
                        |c: Continent, _p: Continent| c,
                    ),
                ],
            )
            .build()
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidRegistry);
        let message = err.to_string();
        assert!(message.contains("Continent.\"first-name\" is not a valid relation name"));
        assert!(message.contains("Continent.\"9lives\" is not a valid relation name"));
        assert!(!message.contains("next_one"));
    }

    #[test]
    fn test_relations_attach_in_second_phase() {
        let tracker = Tracker::default();
        let fetcher = GraphFetcher::builder()
            .register(continent_type_with(continents(), tracker.continents.clone()))
            .register(EntityType::new(
                |c: &Country| c.id.clone(),
                |_ids: &crate::IdSet<String>| -> Result<std::collections::HashMap<String, Country>, crate::BoxError> {
                    Ok(Default::default())
                },
            ))
            .relations(
                Kind::Country,
                [Property::to_one(
                    "continent",
                    |c: &Country| c.continent.as_ref().map(|con| con.id.clone()),
                    |c: Country, con: Continent| Country {
                        continent: Some(con),
                        ..c
                    },
                )],
            )
            .build()
            .unwrap();

        let country = fetcher.entity_type(Kind::Country).unwrap();
        assert_eq!(format!("{country:?}"), "Country(continent)");

        let japan = fetcher
            .fetch_as([japan()], &node("continent"))
            .unwrap()
            .remove(0);
        assert_eq!(japan.continent, Some(asia()));
    }

    #[test]
    fn test_build_rejects_zero_batch_size() {
        let err = GraphFetcher::<Model>::builder()
            .config(FetchConfig {
                batch_size: Some(0),
                ..FetchConfig::default()
            })
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_fetcher_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GraphFetcher<Model>>();
    }
}
