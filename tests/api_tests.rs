use std::sync::{Arc, Mutex};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use flixreview_recs::{
    create_router,
    error::{AppError, AppResult},
    models::{
        Algorithm, Feed, Genre, GenreId, Movie, MovieId, Page, PersonalizedRecommendations,
        PreferredGenreSummary, PreferredGenres, RecommendationItem, Review, SimilarMovies,
        TasteProfile, UserProfile,
    },
    services::{backend::MovieQuery, AccessToken, CatalogBackend},
    AppState, Config,
};

const TOKEN: &str = "test-token";

/// In-memory backend with a fixed catalog
#[derive(Default)]
struct StubBackend {
    catalog: Vec<Movie>,
    personalized_ids: Vec<MovieId>,
    stored_genre_ids: Vec<GenreId>,
    top_rated_down: bool,
    updates: Mutex<Vec<Vec<GenreId>>>,
}

impl StubBackend {
    fn with_catalog() -> Self {
        let drama = Genre::new(12, "Drama");
        let horror = Genre::new(7, "Horror");
        Self {
            catalog: vec![
                Movie::new(1, "Heat").with_rating(4.6).with_genres(vec![drama.clone()]),
                Movie::new(2, "Alien").with_rating(4.4).with_genres(vec![horror.clone()]),
                Movie::new(3, "Cats").with_rating(1.9).with_genres(vec![drama]),
                Movie::new(4, "Halloween").with_rating(3.8).with_genres(vec![horror]),
            ],
            ..Default::default()
        }
    }

    fn check(&self, token: &AccessToken) -> AppResult<()> {
        if token.as_str() == TOKEN {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Invalid token".into()))
        }
    }
}

#[async_trait::async_trait]
impl CatalogBackend for StubBackend {
    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Movie> {
        self.catalog
            .iter()
            .find(|m| m.id == movie_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Movie {movie_id}")))
    }

    async fn list_movies(&self, query: &MovieQuery) -> AppResult<Page<Movie>> {
        let results: Vec<Movie> = self
            .catalog
            .iter()
            .filter(|m| {
                query.genre_ids.is_empty()
                    || m.genres.iter().any(|g| query.genre_ids.contains(&g.id))
            })
            .cloned()
            .collect();
        Ok(Page {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        })
    }

    async fn feed(&self, feed: Feed, limit: usize) -> AppResult<Vec<Movie>> {
        if feed == Feed::TopRated && self.top_rated_down {
            return Err(AppError::ExternalApi("backend returned 500".into()));
        }
        let mut movies = self.catalog.clone();
        movies.sort_by(|a, b| b.avg_rating.total_cmp(&a.avg_rating));
        movies.truncate(limit);
        Ok(movies)
    }

    async fn personalized(
        &self,
        token: &AccessToken,
        _limit: usize,
        algorithm: Algorithm,
    ) -> AppResult<PersonalizedRecommendations> {
        self.check(token)?;
        Ok(PersonalizedRecommendations {
            recommendations: self
                .personalized_ids
                .iter()
                .map(|id| RecommendationItem::for_movie(*id))
                .collect(),
            algorithm: Some(algorithm.as_str().to_string()),
            ..Default::default()
        })
    }

    async fn preferred_genres(&self, token: &AccessToken) -> AppResult<PreferredGenres> {
        self.check(token)?;
        Ok(PreferredGenres {
            preferred_genre_ids: self.stored_genre_ids.clone(),
            preferred_genres: self
                .stored_genre_ids
                .iter()
                .map(|id| PreferredGenreSummary {
                    id: *id,
                    name: format!("Genre {id}"),
                    slug: format!("genre-{id}"),
                })
                .collect(),
            ..Default::default()
        })
    }

    async fn update_preferred_genres(
        &self,
        token: &AccessToken,
        genre_ids: Vec<GenreId>,
    ) -> AppResult<PreferredGenres> {
        self.check(token)?;
        self.updates.lock().unwrap().push(genre_ids.clone());
        Ok(PreferredGenres {
            preferred_genre_ids: genre_ids,
            cooldown_active: true,
            days_until_next_update: 1,
            ..Default::default()
        })
    }

    async fn similar_movies(&self, movie_id: MovieId, _limit: usize) -> AppResult<SimilarMovies> {
        let similar_movies = self
            .catalog
            .iter()
            .filter(|m| m.id != movie_id)
            .map(|m| RecommendationItem {
                id: Some(m.id),
                ..Default::default()
            })
            .collect();
        Ok(SimilarMovies {
            similar_movies,
            ..Default::default()
        })
    }

    async fn taste_profile(&self, token: &AccessToken) -> AppResult<TasteProfile> {
        self.check(token)?;
        Ok(TasteProfile {
            total_reviews: 2,
            average_rating: 4.5,
            ..Default::default()
        })
    }

    async fn current_user(&self, token: &AccessToken) -> AppResult<UserProfile> {
        self.check(token)?;
        Ok(UserProfile {
            id: 9,
            username: "maria".into(),
            avatar: None,
            bio: None,
        })
    }

    async fn user_reviews(&self, token: &AccessToken, _username: &str) -> AppResult<Vec<Review>> {
        self.check(token)?;
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn create_test_server(backend: Arc<StubBackend>) -> TestServer {
    let state = Arc::new(AppState::new(backend, &Config::default()));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn authorization() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {TOKEN}")).unwrap(),
    )
}

fn ids(movies: &Value) -> Vec<i64> {
    movies
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(Arc::new(StubBackend::default()));
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_anonymous_showcase_is_top_rated() {
    let server = create_test_server(Arc::new(StubBackend::with_catalog()));

    let response = server
        .get("/api/v1/recommendations/showcase")
        .add_query_param("limit", 2)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mode"], "top-rated");
    assert_eq!(ids(&body["movies"]), vec![1, 2]);
}

#[tokio::test]
async fn test_signed_in_showcase_is_personalized() {
    let backend = StubBackend {
        personalized_ids: vec![4, 2],
        ..StubBackend::with_catalog()
    };
    let server = create_test_server(Arc::new(backend));
    let (name, value) = authorization();

    let response = server
        .get("/api/v1/recommendations/showcase")
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mode"], "personalized");
    assert_eq!(body["algorithm"], "hybrid");
    assert_eq!(ids(&body["movies"]), vec![4, 2]);
}

#[tokio::test]
async fn test_showcase_falls_back_to_stored_genres() {
    let backend = StubBackend {
        stored_genre_ids: vec![12],
        ..StubBackend::with_catalog()
    };
    let server = create_test_server(Arc::new(backend));
    let (name, value) = authorization();

    let response = server
        .get("/api/v1/recommendations/showcase")
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mode"], "genre-based");
    assert_eq!(body["genre_ids"], json!([12]));
    // "Cats" is below the rating floor
    assert_eq!(ids(&body["movies"]), vec![1]);
}

#[tokio::test]
async fn test_showcase_unavailable_when_top_rated_fails() {
    let backend = StubBackend {
        top_rated_down: true,
        ..StubBackend::with_catalog()
    };
    let server = create_test_server(Arc::new(backend));

    let response = server.get("/api/v1/recommendations/showcase").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unable to load recommendations");
}

#[tokio::test]
async fn test_featured_pick_for_anonymous() {
    let server = create_test_server(Arc::new(StubBackend::with_catalog()));

    let response = server.get("/api/v1/recommendations/featured").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["personalized"], false);
    assert!(body["movie"]["id"].is_i64());
}

#[tokio::test]
async fn test_for_you_requires_authentication() {
    let server = create_test_server(Arc::new(StubBackend::with_catalog()));

    let response = server.get("/api/v1/recommendations/for-you").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_for_you_with_algorithm() {
    let backend = StubBackend {
        personalized_ids: vec![2, 99],
        ..StubBackend::with_catalog()
    };
    let server = create_test_server(Arc::new(backend));
    let (name, value) = authorization();

    let response = server
        .get("/api/v1/recommendations/for-you")
        .add_query_param("algorithm", "content")
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["algorithm"], "content");
    // Movie 99 does not exist and is dropped during hydration
    assert_eq!(ids(&body["movies"]), vec![2]);
}

#[tokio::test]
async fn test_similar_movies_are_hydrated() {
    let server = create_test_server(Arc::new(StubBackend::with_catalog()));

    let response = server.get("/api/v1/recommendations/similar/1").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(ids(&body), vec![2, 3, 4]);
    assert_eq!(body[0]["title"], "Alien");
}

#[tokio::test]
async fn test_taste_profile_requires_authentication() {
    let server = create_test_server(Arc::new(StubBackend::default()));

    server
        .get("/api/v1/recommendations/taste-profile")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let (name, value) = authorization();
    let response = server
        .get("/api/v1/recommendations/taste-profile")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total_reviews"], 2);
}

#[tokio::test]
async fn test_feeds() {
    let server = create_test_server(Arc::new(StubBackend::with_catalog()));

    let response = server
        .get("/api/v1/feeds/trending")
        .add_query_param("limit", 3)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 3);

    server
        .get("/api/v1/feeds/popular")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preferred_genres_round_trip() {
    let backend = Arc::new(StubBackend::with_catalog());
    let server = create_test_server(backend.clone());
    let (name, value) = authorization();

    let response = server
        .put("/api/v1/preferences/genres")
        .add_header(name, value)
        .json(&json!({ "genre_ids": [12, 7, 12] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["preferred_genre_ids"], json!([12, 7]));
    assert_eq!(body["cooldown_remaining_seconds"], 86_400);
    assert_eq!(*backend.updates.lock().unwrap(), vec![vec![12, 7]]);
}

#[tokio::test]
async fn test_too_many_preferred_genres_rejected() {
    let backend = Arc::new(StubBackend::with_catalog());
    let server = create_test_server(backend.clone());
    let (name, value) = authorization();

    let response = server
        .put("/api/v1/preferences/genres")
        .add_header(name, value)
        .json(&json!({ "genre_ids": [1, 2, 3, 4] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(backend.updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_preferred_genres() {
    let backend = StubBackend {
        stored_genre_ids: vec![7],
        ..StubBackend::with_catalog()
    };
    let server = create_test_server(Arc::new(backend));

    server
        .get("/api/v1/preferences/genres")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let (name, value) = authorization();
    let response = server
        .get("/api/v1/preferences/genres")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["preferred_genre_ids"], json!([7]));
    assert_eq!(body["cooldown_remaining_seconds"], Value::Null);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server(Arc::new(StubBackend::default()));
    let request_id = "6f1c2b9e-2d3a-4c5b-9e8f-0a1b2c3d4e5f";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(request_id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), request_id);

    let generated = server.get("/health").await;
    assert!(generated.headers().contains_key("x-request-id"));
}
