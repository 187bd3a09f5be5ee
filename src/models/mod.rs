use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt::Display, str::FromStr};

pub mod preferences;
pub mod recommendation;
pub mod review;

pub use preferences::{PreferredGenreSummary, PreferredGenres, PreferredGenresUpdate};
pub use recommendation::{
    Algorithm, PersonalizedRecommendations, RecommendationItem, RecommendationResult,
    SimilarMovies, SourceMovie, TasteProfile,
};
pub use review::{Author, AuthorRef, Review};

pub type MovieId = i64;
pub type GenreId = i64;
pub type UserId = i64;

/// A genre as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub movie_count: Option<u32>,
}

impl Genre {
    /// Creates a genre with a slug derived from its name
    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = name.to_lowercase().replace(' ', "-");
        Self {
            id,
            name,
            slug,
            description: None,
            movie_count: None,
        }
    }
}

/// A movie record. Always read fresh from the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default, deserialize_with = "deserialize_rating")]
    pub avg_rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Movie {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            genres: Vec::new(),
            avg_rating: 0.0,
            review_count: 0,
            release_date: None,
            poster_url: None,
            backdrop_url: None,
            created_at: None,
        }
    }

    pub fn with_genres(mut self, genres: Vec<Genre>) -> Self {
        self.genres = genres;
        self
    }

    pub fn with_rating(mut self, avg_rating: f64) -> Self {
        self.avg_rating = avg_rating;
        self
    }

    /// Genre labels attached to this movie
    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.genres.iter().map(|g| g.name.as_str())
    }
}

/// The backend serializes decimal ratings either as numbers or as strings ("4.50")
fn deserialize_rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRating {
        Number(f64),
        Text(String),
    }

    match Option::<RawRating>::deserialize(deserializer)? {
        Some(RawRating::Number(n)) => Ok(n),
        Some(RawRating::Text(s)) => s.trim().parse().map_err(de::Error::custom),
        None => Ok(0.0),
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Decodes a backend response body.
///
/// The backend wraps payloads in `{success, message, data, timestamp}`, but
/// some endpoints answer with the bare payload. When `data` is present it must
/// decode as `T`; the body is only read as a bare payload when `data` is absent,
/// so a malformed payload is an error rather than an all-default `T`.
pub fn from_envelope<T: DeserializeOwned>(mut body: Value) -> serde_json::Result<T> {
    match body.as_object_mut().and_then(|fields| fields.remove("data")) {
        Some(data) => serde_json::from_value(data),
        None => serde_json::from_value(body),
    }
}

/// Feed endpoints answer with either a flat list or a page
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MovieList {
    Flat(Vec<Movie>),
    Paged(Page<Movie>),
}

impl MovieList {
    pub fn into_movies(self) -> Vec<Movie> {
        match self {
            MovieList::Flat(movies) => movies,
            MovieList::Paged(page) => page.results,
        }
    }
}

/// Non-personalized movie lists served by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feed {
    TopRated,
    Trending,
    MostReviewed,
    Recent,
}

impl Feed {
    pub const ALL: [Feed; 4] = [Feed::TopRated, Feed::Trending, Feed::MostReviewed, Feed::Recent];

    pub fn path(&self) -> &'static str {
        match self {
            Feed::TopRated => "top-rated",
            Feed::Trending => "trending",
            Feed::MostReviewed => "most-reviewed",
            Feed::Recent => "recent",
        }
    }
}

impl FromStr for Feed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feed::ALL
            .into_iter()
            .find(|feed| feed.path() == s)
            .ok_or_else(|| format!("Unknown feed '{s}'"))
    }
}

impl Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// The currently signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}
