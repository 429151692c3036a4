//! Relation descriptors for the graph fetcher.
//!
//! A relation is declared on the containing entity type and names its target
//! kind:
//! - [`Property::to_one`] reads a nullable foreign id and resolves it through
//!   the target type's batched `fetch_by_ids`
//! - [`Property::to_many`] carries its own batched `fetch_by_parent_ids`
//!
//! ## Example
//!
//! ```rust,ignore
//! let language = Property::to_one(
//!     "language",
//!     |f: &Film| Some(f.language_id),
//!     |f: Film, l: Language| Film { language: Some(l), ..f },
//! );
//!
//! let actors = Property::to_many(
//!     "actors",
//!     |f: &Film| f.id,
//!     move |film_ids: &IdSet<i64>| actor_dao.find_by_film_ids(film_ids),
//!     |f: Film, actors: Vec<Actor>| Film { actors, ..f },
//! );
//! ```

mod property;

pub use property::{Property, RelationType, ToMany, ToOne};
