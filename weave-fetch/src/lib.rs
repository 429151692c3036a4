//! # weave-fetch
//!
//! Batched relation loading for object graphs.
//!
//! Given root values and a [`Node`] selection, a [`GraphFetcher`] fills in the
//! selected relations with at most one host call per target kind or collection
//! relation at each level of the selection, regardless of how many values are
//! being resolved. The fetcher never builds queries itself: every lookup goes
//! through functions supplied by the host.
//!
//! This crate provides:
//! - [`Entity`] / [`Member`] traits describing a model as one enum
//! - [`EntityType`] descriptors (`id_of` and batched `fetch_by_ids`)
//! - [`Property`] descriptors for to-one and to-many relations
//! - [`GraphFetcher`], its builder and the level-by-level resolver
//! - [`WeaveConfig`] for `weave.toml`, and [`logging`] setup
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::convert::Infallible;
//! use weave_fetch::{Entity, EntityType, GraphFetcher, IdSet, Node, Property, members};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Film { id: u32, language_id: u32, language: Option<Language> }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Language { id: u32, name: String }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Model { Film(Film), Language(Language) }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind { Film, Language }
//!
//! impl Entity for Model {
//!     type Kind = Kind;
//!     type Id = u32;
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
//! let films = EntityType::new(
//!     |f: &Film| f.id,
//!     |_ids: &IdSet<u32>| Ok::<_, Infallible>(HashMap::new()),
//! )
//! .with_properties([Property::to_one(
//!     "language",
//!     |f: &Film| Some(f.language_id),
//!     |f: Film, l: Language| Film { language: Some(l), ..f },
//! )]);
//!
//! let languages = EntityType::new(
//!     |l: &Language| l.id,
//!     |ids: &IdSet<u32>| {
//!         Ok::<_, Infallible>(
//!             ids.iter()
//!                 .map(|&id| (id, Language { id, name: format!("language {id}") }))
//!                 .collect(),
//!         )
//!     },
//! );
//!
//! let fetcher = GraphFetcher::builder()
//!     .register(films)
//!     .register(languages)
//!     .build()
//!     .unwrap();
//!
//! let film = Film { id: 1, language_id: 7, language: None };
//! let loaded = fetcher
//!     .fetch_as([film], &Node::parse("language").unwrap())
//!     .unwrap();
//! assert_eq!(loaded[0].language.as_ref().unwrap().name, "language 7");
//! ```

#[macro_use]
mod macros;

pub mod config;
pub mod entity;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod relations;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use config::{DebugConfig, FetchConfig, WeaveConfig};
pub use entity::{Entity, Member};
pub use error::{BoxError, ErrorCode, ErrorContext, FetchError, FetchResult};
pub use fetcher::{GraphFetcher, GraphFetcherBuilder};
pub use relations::{Property, RelationType, ToMany, ToOne};
pub use types::{EntityType, IdSet};

// Selections are defined in weave-graph; re-exported for convenience.
pub use weave_graph::{Node, SelectionError, Shape};
