//! Entity traits: the closed set of kinds a fetcher dispatches over.
//!
//! A host describes its model as one enum implementing [`Entity`], with a
//! `Copy` kind tag per variant. Each variant's payload implements [`Member`],
//! which lets descriptors be written against the concrete struct types while
//! the engine moves values around as the enum.
//!
//! ```rust
//! use weave_fetch::{Entity, Member, members};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Film { id: i64, language_id: i64 }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Language { id: i64, name: String }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Model { Film(Film), Language(Language) }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind { Film, Language }
//!
//! impl Entity for Model {
//!     type Kind = Kind;
//!     type Id = i64;
//!
//!     fn kind(&self) -> Kind {
//!         match self {
//!             Model::Film(_) => Kind::Film,
//!             Model::Language(_) => Kind::Language,
//!         }
//!     }
//! }
//!
//! members!(Model: Kind { Film => Film, Language => Language });
//!
//! let model = Film { id: 1, language_id: 7 }.into_entity();
//! assert_eq!(model.kind(), Kind::Film);
//! assert!(Language::as_member(&model).is_none());
//! ```

use std::fmt::Debug;
use std::hash::Hash;

/// A value the graph fetcher can resolve relations for.
pub trait Entity: Clone + Debug + 'static {
    /// Tag identifying the kind of entity, one per registered type.
    type Kind: Copy + Eq + Hash + Debug + 'static;

    /// Identifier shared by every kind of this model.
    ///
    /// When kinds are keyed by different types, use an enum with one variant
    /// per key type and wrap the key in `id_of` and in the foreign-id readers:
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use std::convert::Infallible;
    /// use weave_fetch::{Entity, EntityType, GraphFetcher, IdSet, Member, Node, Property, members};
    ///
    /// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    /// enum Key { Numeric(i64), Code(String) }
    ///
    /// #[derive(Debug, Clone, PartialEq)]
    /// struct Film { id: i64, language_code: String, language: Option<Language> }
    ///
    /// #[derive(Debug, Clone, PartialEq)]
    /// struct Language { code: String }
    ///
    /// #[derive(Debug, Clone)]
    /// enum Model { Film(Film), Language(Language) }
    ///
    /// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// enum Kind { Film, Language }
    ///
    /// impl Entity for Model {
    ///     type Kind = Kind;
    ///     type Id = Key;
    ///
    ///     fn kind(&self) -> Kind {
    ///         match self {
    ///             Model::Film(_) => Kind::Film,
    ///             Model::Language(_) => Kind::Language,
    ///         }
    ///     }
    /// }
    ///
    /// members!(Model: Kind { Film => Film, Language => Language });
    ///
    /// let fetcher = GraphFetcher::builder()
    ///     .register(EntityType::new(
    ///         |f: &Film| Key::Numeric(f.id),
    ///         |_: &IdSet<Key>| Ok::<_, Infallible>(HashMap::new()),
    ///     ))
    ///     .register(EntityType::new(
    ///         |l: &Language| Key::Code(l.code.clone()),
    ///         |ids: &IdSet<Key>| {
    ///             Ok::<_, Infallible>(
    ///                 ids.iter()
    ///                     .filter_map(|id| match id {
    ///                         Key::Code(code) => Some((id.clone(), Language { code: code.clone() })),
    ///                         Key::Numeric(_) => None,
    ///                     })
    ///                     .collect(),
    ///             )
    ///         },
    ///     ))
    ///     .relations(Kind::Film, [Property::to_one(
    ///         "language",
    ///         |f: &Film| Some(Key::Code(f.language_code.clone())),
    ///         |f: Film, l: Language| Film { language: Some(l), ..f },
    ///     )])
    ///     .build()
    ///     .unwrap();
    ///
    /// let film = Film { id: 1, language_code: "fr".into(), language: None };
    /// let loaded = fetcher.fetch_as([film], &Node::parse("language").unwrap()).unwrap();
    /// assert_eq!(loaded[0].language, Some(Language { code: "fr".into() }));
    /// ```
    type Id: Clone + Eq + Hash + Debug + 'static;

    /// The kind of this value.
    fn kind(&self) -> Self::Kind;
}

/// A concrete entity type wrapped by one variant of `E`.
pub trait Member<E: Entity>: Sized {
    /// The kind tag of the wrapping variant.
    const KIND: E::Kind;

    /// Wrap this value into the model enum.
    fn into_entity(self) -> E;

    /// Unwrap a model value, handing it back if it is another kind.
    fn from_entity(entity: E) -> Result<Self, E>;

    /// Borrow the payload of a model value of this kind.
    fn as_member(entity: &E) -> Option<&Self>;
}
