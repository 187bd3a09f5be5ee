//! Live FlixReview backend client
//!
//! Every payload arrives wrapped in the backend's `{success, message, data}`
//! envelope; responses are unwrapped here so callers only see model types.
use crate::{
    error::{AppError, AppResult},
    models::{
        from_envelope, Algorithm, Feed, GenreId, Movie, MovieId, MovieList, Page,
        PersonalizedRecommendations, PreferredGenres, Review, SimilarMovies, TasteProfile,
        UserProfile,
    },
    services::{
        backend::{CatalogBackend, MovieQuery},
        session::AccessToken,
    },
};
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Page size used when loading a user's review history
const REVIEW_HISTORY_PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct HttpBackend {
    http_client: HttpClient,
    api_url: String,
}

impl HttpBackend {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str, token: Option<&AccessToken>) -> RequestBuilder {
        let request = self.http_client.get(self.url(path));
        match token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> AppResult<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body));
        }

        let body: serde_json::Value = response.json().await?;
        from_envelope(body).map_err(|e| {
            tracing::warn!(error = %e, "Backend payload did not match the expected schema");
            AppError::ExternalApi(format!("Malformed backend payload: {}", e))
        })
    }

    fn status_error(status: StatusCode, body: &str) -> AppError {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .or_else(|| value.get("detail"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("Backend returned status {}: {}", status, body));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::TOO_MANY_REQUESTS => {
                AppError::InvalidInput(message)
            }
            _ => AppError::ExternalApi(message),
        }
    }
}

#[async_trait::async_trait]
impl CatalogBackend for HttpBackend {
    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Movie> {
        Self::send(self.get(&format!("movies/{}/", movie_id), None)).await
    }

    async fn list_movies(&self, query: &MovieQuery) -> AppResult<Page<Movie>> {
        let page: Page<Movie> =
            Self::send(self.get("movies/", None).query(&query.to_query_pairs())).await?;

        tracing::debug!(
            genres = ?query.genre_ids,
            results = page.results.len(),
            "Movie listing fetched"
        );

        Ok(page)
    }

    async fn feed(&self, feed: Feed, limit: usize) -> AppResult<Vec<Movie>> {
        let list: MovieList = Self::send(
            self.get(&format!("recommendations/{}/", feed.path()), None)
                .query(&[("limit", limit)]),
        )
        .await?;

        Ok(list.into_movies())
    }

    async fn personalized(
        &self,
        token: &AccessToken,
        limit: usize,
        algorithm: Algorithm,
    ) -> AppResult<PersonalizedRecommendations> {
        let response: PersonalizedRecommendations = Self::send(
            self.get("recommendations/for-you/", Some(token)).query(&[
                ("limit", limit.to_string()),
                ("algorithm", algorithm.as_str().to_string()),
            ]),
        )
        .await?;

        tracing::info!(
            items = response.recommendations.len(),
            cached = response.cached,
            preferences_applied = response.preferences_applied,
            algorithm = algorithm.as_str(),
            "Personalized recommendations fetched"
        );

        Ok(response)
    }

    async fn preferred_genres(&self, token: &AccessToken) -> AppResult<PreferredGenres> {
        Self::send(self.get("users/genres/", Some(token))).await
    }

    async fn update_preferred_genres(
        &self,
        token: &AccessToken,
        genre_ids: Vec<GenreId>,
    ) -> AppResult<PreferredGenres> {
        let request = self
            .http_client
            .post(self.url("users/genres/"))
            .bearer_auth(token.as_str())
            .json(&json!({ "preferred_genre_ids": genre_ids }));

        Self::send(request).await
    }

    async fn similar_movies(&self, movie_id: MovieId, limit: usize) -> AppResult<SimilarMovies> {
        Self::send(
            self.get(
                &format!("recommendations/movies/{}/similar/", movie_id),
                None,
            )
            .query(&[("limit", limit)]),
        )
        .await
    }

    async fn taste_profile(&self, token: &AccessToken) -> AppResult<TasteProfile> {
        Self::send(self.get("recommendations/profile/taste/", Some(token))).await
    }

    async fn current_user(&self, token: &AccessToken) -> AppResult<UserProfile> {
        Self::send(self.get("users/profile/", Some(token))).await
    }

    async fn user_reviews(&self, token: &AccessToken, username: &str) -> AppResult<Vec<Review>> {
        let page: Page<Review> = Self::send(self.get("reviews/", Some(token)).query(&[
            ("user", username.to_string()),
            ("page_size", REVIEW_HISTORY_PAGE_SIZE.to_string()),
        ]))
        .await?;

        Ok(page.results)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn envelope(data: serde_json::Value) -> serde_json::Value {
        json!({
            "success": true,
            "message": "Request successful",
            "data": data,
            "timestamp": "2024-05-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_get_movie_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/42/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "id": 42,
                "title": "Arrival",
                "avg_rating": "4.20",
                "genres": [{"id": 3, "name": "Sci-Fi", "slug": "sci-fi"}]
            }))))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let movie = backend.get_movie(42).await.unwrap();

        assert_eq!(movie.title, "Arrival");
        assert_eq!(movie.avg_rating, 4.2);
    }

    #[tokio::test]
    async fn test_malformed_data_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommendations/for-you/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "recommendations": "not-a-list",
                "preferences_applied": true
            }))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/genres/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"preferred_genre_ids": "12,7"}})),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let token = AccessToken::new("tok");

        let personalized = backend.personalized(&token, 5, Algorithm::Hybrid).await;
        assert!(matches!(personalized, Err(AppError::ExternalApi(_))));

        let genres = backend.preferred_genres(&token).await;
        assert!(matches!(genres, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_bare_payload_without_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/profile/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 31, "username": "maria"})),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let profile = backend.current_user(&AccessToken::new("tok")).await.unwrap();

        assert_eq!(profile.username, "maria");
    }

    #[tokio::test]
    async fn test_list_movies_sends_genre_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/"))
            .and(query_param("genres", "12,7"))
            .and(query_param("page_size", "10"))
            .and(query_param("ordering", "-avg_rating,-created_at"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{"id": 1, "title": "Amélie", "avg_rating": 4.4}]
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let page = backend
            .list_movies(&MovieQuery::by_genres(vec![12, 7], 10))
            .await
            .unwrap();

        assert_eq!(page.results.len(), 1);
    }

    #[tokio::test]
    async fn test_feed_accepts_bare_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommendations/top-rated/"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                {"id": 1, "title": "The Godfather", "avg_rating": 4.9},
                {"id": 2, "title": "Parasite", "avg_rating": 4.8}
            ]))))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(format!("{}/", server.uri()));
        let movies = backend.feed(Feed::TopRated, 2).await.unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[1].title, "Parasite");
    }

    #[tokio::test]
    async fn test_personalized_forwards_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommendations/for-you/"))
            .and(header("authorization", "Bearer tok-123"))
            .and(query_param("algorithm", "content"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "recommendations": [{"movie_id": 8, "rank": 1}],
                "cached": false,
                "algorithm": "content",
                "preferences_applied": true,
                "preferred_genre_ids": [12],
                "preferred_genres": [{"id": 12, "name": "Drama", "slug": "drama"}]
            }))))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let response = backend
            .personalized(&AccessToken::new("tok-123"), 5, Algorithm::Content)
            .await
            .unwrap();

        assert!(response.preferences_applied);
        assert_eq!(response.recommendations[0].target_id(), Some(8));
    }

    #[tokio::test]
    async fn test_unauthorized_status_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/genres/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Given token not valid for any token type"
            })))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let error = backend
            .preferred_genres(&AccessToken::new("expired"))
            .await
            .unwrap_err();

        match error {
            AppError::Unauthorized(message) => {
                assert_eq!(message, "Given token not valid for any token type")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_external_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommendations/trending/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let error = backend.feed(Feed::Trending, 10).await.unwrap_err();

        assert!(matches!(error, AppError::ExternalApi(_)));
    }

    #[tokio::test]
    async fn test_update_preferred_genres_posts_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/genres/"))
            .and(wiremock::matchers::body_json(json!({"preferred_genre_ids": [4, 9]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "preferred_genres": [
                    {"id": 4, "name": "Horror", "slug": "horror"},
                    {"id": 9, "name": "Western", "slug": "western"}
                ],
                "preferred_genre_ids": [4, 9],
                "cooldown_active": true,
                "days_until_next_update": 7
            }))))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let prefs = backend
            .update_preferred_genres(&AccessToken::new("tok"), vec![4, 9])
            .await
            .unwrap();

        assert_eq!(prefs.genre_ids(), vec![4, 9]);
        assert!(prefs.cooldown_active);
    }

    #[tokio::test]
    async fn test_user_reviews_reads_results_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reviews/"))
            .and(query_param("user", "maria"))
            .and(query_param("page_size", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "count": 1,
                "results": [{
                    "id": 5,
                    "user": "maria",
                    "movie": {"id": 2, "title": "Heat", "genres": [{"id": 1, "name": "Crime"}]},
                    "content": "Great",
                    "rating": 5
                }]
            }))))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let reviews = backend
            .user_reviews(&AccessToken::new("tok"), "maria")
            .await
            .unwrap();

        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].author().username, "maria");
    }
}
