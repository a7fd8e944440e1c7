//! Backend response types and request bodies.
//!
//! Movie payloads are proxied verbatim from the upstream metadata API and
//! use `snake_case` keys. User-scoped records (favorites, history, auth)
//! are produced by the backend itself and use `camelCase` keys.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Upstream movie identifier.
pub type MovieId = u64;

// --- Movies ---

/// Minimal movie shape used in every list and card context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Movie ID.
    pub id: MovieId,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Poster image path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date (YYYY-MM-DD), may be empty.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average (0-10).
    #[serde(default)]
    pub vote_average: f64,
}

/// Response from `movies/{endpoint}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieListResponse {
    /// Current page number, when the listing is paginated.
    #[serde(default)]
    pub page: Option<u32>,
    /// Movies on this page.
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// Total number of results.
    #[serde(default)]
    pub total_results: Option<u32>,
}

impl MovieListResponse {
    /// Returns the degenerate `{results: []}` listing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A genre tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

/// A cast member from the appended credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    /// Person ID.
    pub id: u64,
    /// Person name.
    pub name: String,
    /// Character played.
    #[serde(default)]
    pub character: Option<String>,
    /// Profile image path fragment.
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Credits appended to a movie detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    /// Billed cast, in billing order.
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

/// A production company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompany {
    /// Company ID.
    pub id: u64,
    /// Company name.
    pub name: String,
    /// Logo image path fragment.
    #[serde(default)]
    pub logo_path: Option<String>,
}

/// Full movie detail (summary plus descriptive fields and credits).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    /// Movie ID.
    pub id: MovieId,
    /// Localized title.
    pub title: String,
    /// Poster image path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average (0-10).
    #[serde(default)]
    pub vote_average: f64,
    /// Plot overview.
    #[serde(default)]
    pub overview: Option<String>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Tagline.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Backdrop image path fragment.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: Option<String>,
    /// Appended credits.
    #[serde(default)]
    pub credits: Credits,
    /// Production companies.
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
}

impl MovieDetail {
    /// Projects the detail down to its summary fields.
    #[must_use]
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            release_date: self.release_date.clone(),
            vote_average: self.vote_average,
        }
    }

    /// Release year parsed from `release_date`.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }
}

// --- Videos ---

/// A video attached to a movie (trailer, teaser, clip).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Site-specific key (e.g. the `YouTube` video ID).
    pub key: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Hosting site (e.g. `YouTube`).
    #[serde(default)]
    pub site: String,
    /// Video type (e.g. `Trailer`).
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl Video {
    /// Watch URL when the video is hosted on `YouTube`.
    #[must_use]
    pub fn youtube_url(&self) -> Option<String> {
        (self.site == "YouTube").then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }
}

/// Response from `movies/{id}/videos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideosResponse {
    /// Videos.
    #[serde(default)]
    pub results: Vec<Video>,
}

// --- Watch providers ---

/// A streaming/rental/purchase provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Provider ID.
    pub provider_id: u64,
    /// Provider name.
    pub provider_name: String,
    /// Logo image path fragment.
    #[serde(default)]
    pub logo_path: Option<String>,
}

/// Providers available in one region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBlock {
    /// Upstream landing page for the region.
    #[serde(default)]
    pub link: Option<String>,
    /// Subscription providers.
    #[serde(default)]
    pub flatrate: Vec<Provider>,
    /// Rental providers.
    #[serde(default)]
    pub rent: Vec<Provider>,
    /// Purchase providers.
    #[serde(default)]
    pub buy: Vec<Provider>,
}

impl ProviderBlock {
    /// Whether the block lists no provider at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flatrate.is_empty() && self.rent.is_empty() && self.buy.is_empty()
    }
}

/// Response from `movies/{id}/watch/providers`, keyed by region code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersResponse {
    /// Region code (ISO 3166-1) to providers.
    #[serde(default)]
    pub results: BTreeMap<String, ProviderBlock>,
}

impl ProvidersResponse {
    /// Providers for `region`, if the region is listed.
    #[must_use]
    pub fn region(&self, region: &str) -> Option<&ProviderBlock> {
        self.results.get(region)
    }
}

// --- User records ---

/// A favorited movie, owned by the backend per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    /// Movie ID.
    pub movie_id: MovieId,
    /// Title at the time of favoriting.
    #[serde(default)]
    pub title: String,
    /// Poster image path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
}

/// One watch-history entry. Served most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Entry ID.
    pub id: u64,
    /// Movie ID.
    pub movie_id: MovieId,
    /// Title at the time of viewing.
    #[serde(default)]
    pub title: String,
    /// Poster image path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// View timestamp (ISO 8601, no offset).
    pub viewed_at: String,
}

impl HistoryEntry {
    /// Parses `viewed_at`.
    #[must_use]
    pub fn viewed_at_time(&self) -> Option<NaiveDateTime> {
        parse_viewed_at(&self.viewed_at)
    }
}

/// Parses a history timestamp; accepts fractional seconds and the SQL
/// `YYYY-MM-DD HH:MM:SS` form.
#[must_use]
pub fn parse_viewed_at(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Request body carrying a single movie ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieIdBody {
    /// Movie ID.
    pub movie_id: MovieId,
}

// --- Auth ---

/// Authenticated user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User ID.
    pub id: u64,
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
}

/// Response from `auth/login` and `auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer credential.
    pub token: String,
    /// Signed-in user.
    pub user: UserInfo,
}

/// Body of `auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Email address.
    pub email: &'a str,
    /// Password.
    pub password: &'a str,
}

/// Body of `auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    /// Display name.
    pub username: &'a str,
    /// Email address.
    pub email: &'a str,
    /// Password.
    pub password: &'a str,
}

/// `{"message": ...}` body the backend sends with errors and acknowledgements.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

/// Extracts the year from a `YYYY-MM-DD` date.
#[must_use]
pub fn release_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_parse_movie_list_with_nulls() {
        // Arrange
        let json = r#"{"page":1,"results":[{"id":550,"title":"Fight Club","poster_path":null,"release_date":"1999-10-15","vote_average":8.4,"adult":false}],"total_pages":1,"total_results":1}"#;

        // Act
        let response: MovieListResponse = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(response.page, Some(1));
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, 550);
        assert!(response.results[0].poster_path.is_none());
    }

    #[test]
    fn test_parse_movie_list_without_results_key() {
        // Arrange
        let json = r#"{"page":1}"#;

        // Act
        let response: MovieListResponse = serde_json::from_str(json).unwrap();

        // Assert
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_parse_movie_detail_with_credits() {
        // Arrange
        let json = r#"{
            "id": 27205, "title": "Inception", "runtime": 148,
            "genres": [{"id": 28, "name": "Action"}],
            "tagline": "Your mind is the scene of the crime.",
            "original_language": "en",
            "credits": {"cast": [{"id": 6193, "name": "Leonardo DiCaprio", "character": "Cobb", "profile_path": "/a.jpg"}]},
            "production_companies": [{"id": 923, "name": "Legendary Pictures", "logo_path": null}],
            "release_date": "2010-07-15", "vote_average": 8.4
        }"#;

        // Act
        let detail: MovieDetail = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(detail.runtime, Some(148));
        assert_eq!(detail.genres[0].name, "Action");
        assert_eq!(detail.credits.cast[0].name, "Leonardo DiCaprio");
        assert_eq!(detail.release_year(), Some(2010));
        assert_eq!(detail.summary().title, "Inception");
    }

    #[test]
    fn test_parse_favorites_camel_case() {
        // Arrange
        let json = r#"[{"id":3,"movieId":27205,"title":"Inception","posterPath":"/p.jpg","releaseDate":"2010-07-15","voteAverage":8.4}]"#;

        // Act
        let favorites: Vec<FavoriteRecord> = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(favorites[0].movie_id, 27205);
        assert_eq!(favorites[0].poster_path.as_deref(), Some("/p.jpg"));
    }

    #[test]
    fn test_history_viewed_at_parses_isoformat() {
        // Arrange
        let entry = HistoryEntry {
            id: 1,
            movie_id: 5,
            title: String::from("Five"),
            poster_path: None,
            viewed_at: String::from("2024-03-01T12:34:56.789012"),
        };

        // Act
        let viewed = entry.viewed_at_time();

        // Assert
        assert_eq!(
            viewed.map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            Some(String::from("2024-03-01 12:34"))
        );
    }

    #[test]
    fn test_providers_region_lookup() {
        // Arrange
        let json = r#"{"id":1,"results":{"US":{"link":"https://x","flatrate":[{"provider_id":8,"provider_name":"Netflix","logo_path":"/n.jpg"}]}}}"#;

        // Act
        let providers: ProvidersResponse = serde_json::from_str(json).unwrap();

        // Assert
        let us = providers.region("US").unwrap();
        assert_eq!(us.flatrate[0].provider_name, "Netflix");
        assert!(us.rent.is_empty());
        assert!(providers.region("JP").is_none());
    }

    #[test]
    fn test_movie_id_body_serializes_camel_case() {
        // Arrange
        let body = MovieIdBody { movie_id: 5 };

        // Act
        let json = serde_json::to_string(&body).unwrap();

        // Assert
        assert_eq!(json, r#"{"movieId":5}"#);
    }

    #[test]
    fn test_release_year_handles_empty_date() {
        // Arrange & Act & Assert
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(None), None);
        assert_eq!(release_year(Some("1999-10-15")), Some(1999));
    }
}
