//! # Weave
//!
//! N+1-free graph fetching for data-access layers.
//!
//! Weave provides:
//! - A selection language describing which relations to load
//!   (`"language, actors(language)"`, `"*"`, `"**"`)
//! - Type and relation descriptors built from host-supplied batch lookups
//! - A graph fetcher that resolves a selection over many values with one
//!   lookup per target kind at each level
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use weave::prelude::*;
//!
//! let fetcher = GraphFetcher::builder()
//!     .register(EntityType::new(|f: &Film| f.id, move |ids: &IdSet<i64>| film_dao.find_by_ids(ids)))
//!     .register(EntityType::new(|l: &Language| l.id, move |ids: &IdSet<i64>| language_dao.find_by_ids(ids)))
//!     .relations(Kind::Film, [Property::to_one(
//!         "language",
//!         |f: &Film| Some(f.language_id),
//!         |f: Film, l: Language| Film { language: Some(l), ..f },
//!     )])
//!     .build()?;
//!
//! // e.g. from a `?fetch=language` query parameter
//! let films = fetcher.fetch_selection(films, params.get("fetch").map(String::as_str))?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Selection graphs and their textual grammar.
pub mod graph {
    pub use weave_graph::*;
}

/// Entity descriptors and the graph fetcher.
pub mod fetch {
    pub use weave_fetch::*;
}

pub use weave_fetch::{logging, members};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fetch::{
        Entity, EntityType, FetchConfig, FetchError, FetchResult, GraphFetcher, IdSet, Member,
        Property, WeaveConfig,
    };
    pub use crate::graph::Node;
    pub use crate::members;
}

// Re-export key types at the crate root
pub use weave_fetch::{
    BoxError, DebugConfig, Entity, EntityType, ErrorCode, FetchConfig, FetchError, FetchResult,
    GraphFetcher, GraphFetcherBuilder, IdSet, Member, Property, RelationType, WeaveConfig,
};
pub use weave_graph::{Node, SelectionError, Shape, parse_selection};
