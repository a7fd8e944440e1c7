//! `MovieService` - failure policy over the strict backend API.
//!
//! Informational reads degrade to an empty value with a warning; mutations
//! and the movie detail propagate errors. Each degrading read also has a
//! strict `try_*` variant for callers that must tell "empty" from "failed".
#![allow(clippy::future_not_send)]

use tracing::instrument;

use crate::api::LocalMovieApi;
use crate::error::{ClientError, Result};
use crate::query::ListQuery;
use crate::types::{
    FavoriteRecord, HistoryEntry, MovieDetail, MovieId, MovieListResponse, ProvidersResponse,
    VideosResponse,
};

/// Replaces a failed informational read with its empty value.
fn degrade<T: Default>(operation: &'static str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(operation, error = %e, "Backend read failed, using empty result");
        T::default()
    })
}

/// Data-access facade used by the view controllers and the CLI.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieService<A> {
    api: A,
}

impl<A: LocalMovieApi> MovieService<A> {
    /// Wraps a strict API implementation.
    pub const fn new(api: A) -> Self {
        Self { api }
    }

    /// Underlying strict API.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Fetches a listing; `{results: []}` on failure.
    pub async fn list_movies(&self, query: &ListQuery) -> MovieListResponse {
        degrade("list_movies", self.try_list_movies(query).await)
    }

    /// Fetches a listing.
    ///
    /// # Errors
    ///
    /// Propagates any backend failure.
    pub async fn try_list_movies(&self, query: &ListQuery) -> Result<MovieListResponse> {
        self.api.list_movies(query).await
    }

    /// Best-effort section loader: retries once when the first page comes
    /// back empty, then settles for whatever the second attempt returns.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn load_section(&self, query: &ListQuery) -> MovieListResponse {
        let first = self.list_movies(query).await;
        if !first.results.is_empty() {
            return first;
        }
        tracing::debug!("Empty section, retrying once");
        self.list_movies(query).await
    }

    /// Fetches the full detail.
    ///
    /// # Errors
    ///
    /// `ClientError::NotFound` for an unknown movie; any other backend
    /// failure as-is.
    pub async fn get_movie_detail(&self, movie_id: MovieId) -> Result<MovieDetail> {
        self.api.movie_detail(movie_id).await
    }

    /// Fetches videos; `{results: []}` on failure.
    pub async fn get_movie_videos(&self, movie_id: MovieId) -> VideosResponse {
        degrade("get_movie_videos", self.try_get_movie_videos(movie_id).await)
    }

    /// # Errors
    ///
    /// Propagates any backend failure.
    pub async fn try_get_movie_videos(&self, movie_id: MovieId) -> Result<VideosResponse> {
        self.api.movie_videos(movie_id).await
    }

    /// Fetches watch providers; `{results: {}}` on failure.
    pub async fn get_movie_providers(&self, movie_id: MovieId) -> ProvidersResponse {
        degrade(
            "get_movie_providers",
            self.try_get_movie_providers(movie_id).await,
        )
    }

    /// # Errors
    ///
    /// Propagates any backend failure.
    pub async fn try_get_movie_providers(&self, movie_id: MovieId) -> Result<ProvidersResponse> {
        self.api.movie_providers(movie_id).await
    }

    /// Fetches favorites; `[]` on failure.
    pub async fn list_favorites(&self) -> Vec<FavoriteRecord> {
        degrade("list_favorites", self.try_list_favorites().await)
    }

    /// # Errors
    ///
    /// Propagates any backend failure.
    pub async fn try_list_favorites(&self) -> Result<Vec<FavoriteRecord>> {
        self.api.favorites().await
    }

    /// Fetches history (server order); `[]` on failure.
    pub async fn list_history(&self) -> Vec<HistoryEntry> {
        degrade("list_history", self.try_list_history().await)
    }

    /// # Errors
    ///
    /// Propagates any backend failure.
    pub async fn try_list_history(&self) -> Result<Vec<HistoryEntry>> {
        self.api.history().await
    }

    /// Flips favorite membership.
    ///
    /// # Errors
    ///
    /// Propagates any backend failure.
    pub async fn toggle_favorite(&self, movie_id: MovieId) -> Result<()> {
        self.api.toggle_favorite(movie_id).await
    }

    /// Records a view.
    ///
    /// # Errors
    ///
    /// Propagates any backend failure.
    pub async fn add_history(&self, movie_id: MovieId) -> Result<()> {
        self.api.add_history(movie_id).await
    }

    /// Removes all history entries of a movie.
    ///
    /// # Errors
    ///
    /// Propagates any backend failure.
    pub async fn remove_history(&self, movie_id: MovieId) -> Result<()> {
        self.api.remove_history(movie_id).await
    }

    /// Removes the whole history.
    ///
    /// # Errors
    ///
    /// Propagates any backend failure.
    pub async fn clear_history(&self) -> Result<()> {
        self.api.clear_history().await
    }

    /// Whether `movie_id` is among the favorites; `false` when they cannot
    /// be fetched.
    pub async fn is_favorite(&self, movie_id: MovieId) -> bool {
        self.list_favorites()
            .await
            .iter()
            .any(|f| f.movie_id == movie_id)
    }
}

/// Rejects the zero movie ID, which never names a real movie.
///
/// # Errors
///
/// `ClientError::Validation` for ID `0`.
pub fn validate_movie_id(movie_id: MovieId) -> Result<MovieId> {
    if movie_id == 0 {
        return Err(ClientError::Validation(String::from("Invalid movie ID")));
    }
    Ok(movie_id)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};

    use super::*;
    use crate::fake::{FakeBackend, Op, summary};

    #[test]
    fn test_degrade_warns_and_returns_empty() {
        // Arrange
        let (subscriber, handle) = subscriber::mock()
            .event(
                expect::event()
                    .with_target("cinerec_api::service")
                    .at_level(tracing::Level::WARN),
            )
            .only()
            .run_with_handle();

        // Act
        let value: Vec<u32> = with_default(subscriber, || {
            degrade(
                "list_history",
                Err(ClientError::Network(String::from("down"))),
            )
        });

        // Assert
        assert!(value.is_empty());
        handle.assert_finished();
    }

    #[test]
    fn test_degrade_passes_success_through_silently() {
        // Arrange
        let (subscriber, handle) = subscriber::mock().only().run_with_handle();

        // Act
        let value = with_default(subscriber, || degrade("list_history", Ok(vec![1_u32, 2])));

        // Assert
        assert_eq!(value, vec![1, 2]);
        handle.assert_finished();
    }

    #[tokio::test]
    async fn test_list_movies_degrades_on_failure() {
        // Arrange
        let service = MovieService::new(FakeBackend::new());
        let backend = service.api();
        backend.fail(Op::List);

        // Act
        let response = service.list_movies(&ListQuery::new("movie/top_rated")).await;

        // Assert
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_try_list_movies_propagates_failure() {
        // Arrange
        let service = MovieService::new(FakeBackend::new());
        let backend = service.api();
        backend.fail(Op::List);

        // Act
        let result = service
            .try_list_movies(&ListQuery::new("movie/top_rated"))
            .await;

        // Assert
        assert!(matches!(result, Err(ClientError::Network(_))));
    }

    #[tokio::test]
    async fn test_informational_reads_degrade() {
        // Arrange
        let service = MovieService::new(FakeBackend::new());
        let backend = service.api();
        for op in [Op::Videos, Op::Providers, Op::Favorites, Op::History] {
            backend.fail(op);
        }

        // Act & Assert
        assert!(service.get_movie_videos(1).await.results.is_empty());
        assert!(service.get_movie_providers(1).await.results.is_empty());
        assert!(service.list_favorites().await.is_empty());
        assert!(service.list_history().await.is_empty());
        assert!(!service.is_favorite(1).await);
    }

    #[tokio::test]
    async fn test_detail_and_mutations_propagate() {
        // Arrange
        let service = MovieService::new(FakeBackend::new());
        let backend = service.api();
        for op in [
            Op::Toggle,
            Op::AddHistory,
            Op::RemoveHistory,
            Op::ClearHistory,
        ] {
            backend.fail(op);
        }

        // Act & Assert
        assert!(matches!(
            service.get_movie_detail(42).await,
            Err(ClientError::NotFound(_))
        ));
        assert!(service.toggle_favorite(1).await.is_err());
        assert!(service.add_history(1).await.is_err());
        assert!(service.remove_history(1).await.is_err());
        assert!(service.clear_history().await.is_err());
    }

    #[tokio::test]
    async fn test_load_section_retries_once_when_empty() {
        // Arrange
        let service = MovieService::new(FakeBackend::new());
        let backend = service.api();
        let query = ListQuery::new("movie/now_playing");
        backend.push_listing(&query, Vec::new());
        backend.push_listing(&query, vec![summary(1, "One")]);

        // Act
        let response = service.load_section(&query).await;

        // Assert
        assert_eq!(response.results.len(), 1);
        assert_eq!(backend.calls(Op::List), 2);
    }

    #[tokio::test]
    async fn test_load_section_gives_up_after_second_empty() {
        // Arrange
        let service = MovieService::new(FakeBackend::new());
        let backend = service.api();
        let query = ListQuery::new("movie/now_playing");

        // Act
        let response = service.load_section(&query).await;

        // Assert
        assert!(response.results.is_empty());
        assert_eq!(backend.calls(Op::List), 2);
    }

    #[tokio::test]
    async fn test_load_section_no_retry_when_populated() {
        // Arrange
        let service = MovieService::new(FakeBackend::new());
        let backend = service.api();
        let query = ListQuery::new("movie/now_playing");
        backend.push_listing(&query, vec![summary(1, "One")]);

        // Act
        let response = service.load_section(&query).await;

        // Assert
        assert_eq!(response.results[0].id, 1);
        assert_eq!(backend.calls(Op::List), 1);
    }

    #[test]
    fn test_validate_movie_id_rejects_zero() {
        // Arrange & Act & Assert
        assert!(matches!(
            validate_movie_id(0),
            Err(ClientError::Validation(_))
        ));
        assert_eq!(validate_movie_id(550).unwrap(), 550);
    }
}
