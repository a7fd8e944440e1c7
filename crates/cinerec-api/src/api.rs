//! `AuthApi` / `MovieApi` trait definitions.
//!
//! These are the strict backend operations: every transport, status or
//! decode failure is returned as an error. The degrade-to-empty policy for
//! informational reads lives one layer up, in [`crate::service`].
#![allow(clippy::future_not_send)]

use crate::error::Result;
use crate::query::ListQuery;
use crate::types::{
    AuthResponse, FavoriteRecord, HistoryEntry, MovieDetail, MovieId, MovieListResponse,
    ProvidersResponse, VideosResponse,
};

/// Authentication endpoints.
///
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(AuthApi: Send)]
pub trait LocalAuthApi {
    /// Exchanges credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// `ClientError::Auth` if the backend rejects the credentials,
    /// `ClientError::Network` on transport failure.
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse>;

    /// Creates an account and signs it in.
    ///
    /// # Errors
    ///
    /// `ClientError::Auth` if the backend rejects the account,
    /// `ClientError::Network` on transport failure.
    async fn signup(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse>;
}

/// Movie and user-record endpoints.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MovieApi: Send)]
pub trait LocalMovieApi {
    /// Fetches one upstream listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn list_movies(&self, query: &ListQuery) -> Result<MovieListResponse>;

    /// Fetches movie detail with credits.
    ///
    /// # Errors
    ///
    /// `ClientError::NotFound` for an unknown ID; otherwise as above.
    async fn movie_detail(&self, movie_id: MovieId) -> Result<MovieDetail>;

    /// Fetches videos (trailers, teasers).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_videos(&self, movie_id: MovieId) -> Result<VideosResponse>;

    /// Fetches watch providers keyed by region.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_providers(&self, movie_id: MovieId) -> Result<ProvidersResponse>;

    /// Fetches the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn favorites(&self) -> Result<Vec<FavoriteRecord>>;

    /// Flips favorite membership of a movie on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn toggle_favorite(&self, movie_id: MovieId) -> Result<()>;

    /// Fetches the user's watch history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn history(&self) -> Result<Vec<HistoryEntry>>;

    /// Records a view of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn add_history(&self, movie_id: MovieId) -> Result<()>;

    /// Removes every history entry of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn remove_history(&self, movie_id: MovieId) -> Result<()>;

    /// Removes the whole history.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn clear_history(&self) -> Result<()>;
}
