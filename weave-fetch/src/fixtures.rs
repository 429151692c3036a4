//! Film catalogue used by the unit tests.
//!
//! Every fetch function records the id set it was called with so tests can
//! assert how many batched calls a traversal issued.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::entity::Entity;
use crate::fetcher::{GraphFetcher, GraphFetcherBuilder};
use crate::relations::Property;
use crate::types::{EntityType, IdSet};

#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Film(Film),
    Actor(Actor),
    Language(Language),
    Country(Country),
    Continent(Continent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Film,
    Actor,
    Language,
    Country,
    Continent,
}

impl Entity for Model {
    type Kind = Kind;
    type Id = String;

    fn kind(&self) -> Kind {
        match self {
            Model::Film(_) => Kind::Film,
            Model::Actor(_) => Kind::Actor,
            Model::Language(_) => Kind::Language,
            Model::Country(_) => Kind::Country,
            Model::Continent(_) => Kind::Continent,
        }
    }
}

members!(Model: Kind {
    Film => Film,
    Actor => Actor,
    Language => Language,
    Country => Country,
    Continent => Continent,
});

#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    pub id: String,
    pub name: String,
    pub language: Language,
    pub original_language: Option<Language>,
    pub actors: Vec<Actor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    pub id: String,
    pub name: String,
    pub country: Option<Country>,
    pub country2: Option<Country>,
}

impl Language {
    /// A reference holding only the id, as read from a foreign key column.
    pub fn stub(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            country: None,
            country2: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub id: String,
    pub name: String,
    pub continent: Option<Continent>,
}

impl Country {
    pub fn stub(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            continent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Continent {
    pub id: String,
    pub name: String,
}

impl Continent {
    pub fn stub(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
        }
    }
}

// ============== Data ==============

pub fn europe() -> Continent {
    Continent {
        id: "EU".into(),
        name: "Europe".into(),
    }
}

pub fn asia() -> Continent {
    Continent {
        id: "AS".into(),
        name: "Asia".into(),
    }
}

pub fn oceania() -> Continent {
    Continent {
        id: "AU".into(),
        name: "Australia".into(),
    }
}

pub fn england() -> Country {
    Country {
        id: "GB".into(),
        name: "England".into(),
        continent: Some(Continent::stub("EU")),
    }
}

pub fn japan() -> Country {
    Country {
        id: "JP".into(),
        name: "Japan".into(),
        continent: Some(Continent::stub("AS")),
    }
}

pub fn australia() -> Country {
    Country {
        id: "AU".into(),
        name: "Australia".into(),
        continent: Some(Continent::stub("AU")),
    }
}

pub fn english() -> Language {
    Language {
        id: "E".into(),
        name: "English".into(),
        country: Some(Country::stub("GB")),
        country2: Some(Country::stub("JP")),
    }
}

pub fn japanese() -> Language {
    Language {
        id: "J".into(),
        name: "Japanese".into(),
        country: Some(Country::stub("JP")),
        country2: None,
    }
}

pub fn australian() -> Language {
    Language {
        id: "A".into(),
        name: "Australian".into(),
        country: Some(Country::stub("AU")),
        country2: None,
    }
}

pub fn brad() -> Actor {
    Actor {
        id: "1".into(),
        first_name: "Brad".into(),
        last_name: "Spit".into(),
        language: Language::stub("E"),
    }
}

pub fn kate() -> Actor {
    Actor {
        id: "2".into(),
        first_name: "Kate".into(),
        last_name: "Beck".into(),
        language: Language::stub("J"),
    }
}

pub fn fight_club() -> Film {
    Film {
        id: "10".into(),
        name: "Fight Club".into(),
        language: Language::stub("E"),
        original_language: Some(Language::stub("J")),
        actors: Vec::new(),
    }
}

pub fn groundhog_day() -> Film {
    Film {
        id: "11".into(),
        name: "Groundhog Day".into(),
        language: Language::stub("A"),
        original_language: None,
        actors: Vec::new(),
    }
}

fn by_id<T>(values: impl IntoIterator<Item = T>, id_of: impl Fn(&T) -> &str) -> HashMap<String, T> {
    values
        .into_iter()
        .map(|value| (id_of(&value).to_string(), value))
        .collect()
}

pub fn continents() -> HashMap<String, Continent> {
    by_id([europe(), asia(), oceania()], |c| c.id.as_str())
}

pub fn countries() -> HashMap<String, Country> {
    by_id([england(), japan(), australia()], |c| c.id.as_str())
}

pub fn languages() -> HashMap<String, Language> {
    by_id([english(), japanese(), australian()], |l| l.id.as_str())
}

pub fn actors() -> HashMap<String, Actor> {
    by_id([brad(), kate()], |a| a.id.as_str())
}

pub fn films() -> HashMap<String, Film> {
    by_id([fight_club(), groundhog_day()], |f| f.id.as_str())
}

pub fn actors_by_film() -> HashMap<String, Vec<Actor>> {
    HashMap::from([
        ("10".to_string(), vec![brad()]),
        ("11".to_string(), vec![brad(), kate()]),
    ])
}

// ============== Call recording ==============

/// Id sets passed to one fetch function, in call order.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<Vec<String>>>>);

impl Calls {
    pub fn record(&self, ids: &IdSet<String>) {
        self.0.lock().push(ids.iter().cloned().collect());
    }

    pub fn count(&self) -> usize {
        self.0.lock().len()
    }

    pub fn all(&self) -> Vec<Vec<String>> {
        self.0.lock().clone()
    }

    /// The ids of one call, sorted.
    pub fn sorted(&self, call: usize) -> Vec<String> {
        let mut ids = self.0.lock()[call].clone();
        ids.sort();
        ids
    }
}

fn lookup<T: Clone>(
    data: HashMap<String, T>,
    calls: Calls,
) -> impl Fn(&IdSet<String>) -> Result<HashMap<String, T>, Infallible> + Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    move |ids| {
        calls.record(ids);
        Ok(ids
            .iter()
            .filter_map(|id| data.get(id).map(|value| (id.clone(), value.clone())))
            .collect())
    }
}

// ============== Descriptors ==============

pub fn continent_type_with(data: HashMap<String, Continent>, calls: Calls) -> EntityType<Model> {
    EntityType::new(|c: &Continent| c.id.clone(), lookup(data, calls))
}

pub fn country_type_with(data: HashMap<String, Country>, calls: Calls) -> EntityType<Model> {
    EntityType::new(|c: &Country| c.id.clone(), lookup(data, calls)).with_properties([
        Property::to_one(
            "continent",
            |c: &Country| c.continent.as_ref().map(|con| con.id.clone()),
            |c: Country, con: Continent| Country {
                continent: Some(con),
                ..c
            },
        ),
    ])
}

pub fn language_type(data: HashMap<String, Language>) -> EntityType<Model> {
    language_type_with(data, Calls::default())
}

pub fn language_type_with(data: HashMap<String, Language>, calls: Calls) -> EntityType<Model> {
    EntityType::new(|l: &Language| l.id.clone(), lookup(data, calls)).with_properties([
        Property::to_one(
            "country",
            |l: &Language| l.country.as_ref().map(|c| c.id.clone()),
            |l: Language, c: Country| Language {
                country: Some(c),
                ..l
            },
        ),
        Property::to_one(
            "country2",
            |l: &Language| l.country2.as_ref().map(|c| c.id.clone()),
            |l: Language, c: Country| Language {
                country2: Some(c),
                ..l
            },
        ),
    ])
}

pub fn actor_type_with(data: HashMap<String, Actor>, calls: Calls) -> EntityType<Model> {
    EntityType::new(|a: &Actor| a.id.clone(), lookup(data, calls)).with_properties([
        Property::to_one(
            "language",
            |a: &Actor| Some(a.language.id.clone()),
            |a: Actor, l: Language| Actor { language: l, ..a },
        ),
    ])
}

pub fn film_actors(data: HashMap<String, Vec<Actor>>) -> Property<Model> {
    film_actors_with(data, Calls::default())
}

pub fn film_actors_with(data: HashMap<String, Vec<Actor>>, calls: Calls) -> Property<Model> {
    Property::to_many(
        "actors",
        |f: &Film| f.id.clone(),
        lookup(data, calls),
        |f: Film, actors: Vec<Actor>| Film { actors, ..f },
    )
}

pub fn film_type(
    films: HashMap<String, Film>,
    actors_by_film: HashMap<String, Vec<Actor>>,
) -> EntityType<Model> {
    film_type_with(films, actors_by_film, &Tracker::default())
}

pub fn film_type_with(
    films: HashMap<String, Film>,
    actors_by_film: HashMap<String, Vec<Actor>>,
    tracker: &Tracker,
) -> EntityType<Model> {
    EntityType::new(|f: &Film| f.id.clone(), lookup(films, tracker.films.clone())).with_properties([
        Property::to_one(
            "language",
            |f: &Film| Some(f.language.id.clone()),
            |f: Film, l: Language| Film { language: l, ..f },
        ),
        Property::to_one(
            "originalLanguage",
            |f: &Film| f.original_language.as_ref().map(|l| l.id.clone()),
            |f: Film, l: Language| Film {
                original_language: Some(l),
                ..f
            },
        ),
        film_actors_with(actors_by_film, tracker.film_actors.clone()),
    ])
}

/// Call recorders for every fetch function of the catalogue.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    pub films: Calls,
    pub film_actors: Calls,
    pub actors: Calls,
    pub languages: Calls,
    pub countries: Calls,
    pub continents: Calls,
}

impl Tracker {
    /// A builder with every catalogue type registered.
    pub fn builder(&self) -> GraphFetcherBuilder<Model> {
        GraphFetcher::builder()
            .register(film_type_with(films(), actors_by_film(), self))
            .register(actor_type_with(actors(), self.actors.clone()))
            .register(language_type_with(languages(), self.languages.clone()))
            .register(country_type_with(countries(), self.countries.clone()))
            .register(continent_type_with(continents(), self.continents.clone()))
    }

    pub fn fetcher(&self) -> GraphFetcher<Model> {
        self.builder().build().unwrap()
    }

    /// Total number of fetch calls issued.
    pub fn total(&self) -> usize {
        self.films.count()
            + self.film_actors.count()
            + self.actors.count()
            + self.languages.count()
            + self.countries.count()
            + self.continents.count()
    }
}
