//! Listing query identities.
//!
//! A [`ListQuery`] names one upstream listing: an endpoint path under
//! `movies/` plus its query parameters. Two queries are the same fetch unit
//! iff both parts are value-equal; parameters live in an ordered map so
//! insertion order never affects equality.

use std::collections::BTreeMap;

/// Genre ID for action movies.
pub const GENRE_ACTION: u32 = 28;

/// Genre ID for comedies.
pub const GENRE_COMEDY: u32 = 35;

/// Endpoint + parameter mapping identifying one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListQuery {
    endpoint: String,
    params: BTreeMap<String, String>,
}

impl ListQuery {
    /// Creates a query for `endpoint` with no parameters.
    ///
    /// Leading and trailing slashes are stripped so `"/movie/top_rated/"`
    /// and `"movie/top_rated"` are the same identity.
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        Self {
            endpoint: endpoint.as_ref().trim_matches('/').to_owned(),
            params: BTreeMap::new(),
        }
    }

    /// Adds or replaces a parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Applies discovery filters (language, original languages, release window).
    #[must_use]
    pub fn filtered(mut self, filters: &DiscoverFilters, with_release_window: bool) -> Self {
        self.params
            .insert(String::from("language"), filters.language.clone());
        if !filters.original_languages.is_empty() {
            self.params.insert(
                String::from("with_original_language"),
                filters.original_languages.join("|"),
            );
        }
        if with_release_window && let Some((from, to)) = filters.release_years {
            self.params.insert(
                String::from("primary_release_date.gte"),
                format!("{from}-01-01"),
            );
            self.params.insert(
                String::from("primary_release_date.lte"),
                format!("{to}-12-31"),
            );
        }
        self
    }

    /// Endpoint path relative to `movies/`.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parameter mapping.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Parameters as query pairs, in key order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Personalized recommendations computed by the backend.
    #[must_use]
    pub fn recommendations(filters: &DiscoverFilters) -> Self {
        Self::new("recommendations").filtered(filters, true)
    }

    /// Movies trending today.
    #[must_use]
    pub fn trending(filters: &DiscoverFilters) -> Self {
        Self::new("trending/movie/day").filtered(filters, false)
    }

    /// Top rated movies.
    #[must_use]
    pub fn top_rated(filters: &DiscoverFilters) -> Self {
        Self::new("movie/top_rated").filtered(filters, true)
    }

    /// Movies now playing in theaters.
    #[must_use]
    pub fn now_playing(filters: &DiscoverFilters) -> Self {
        Self::new("movie/now_playing").filtered(filters, false)
    }

    /// Movies of one genre.
    #[must_use]
    pub fn by_genre(genre_id: u32, filters: &DiscoverFilters) -> Self {
        Self::new("discover/movie")
            .param("with_genres", genre_id.to_string())
            .filtered(filters, true)
    }

    /// Free-text title search.
    #[must_use]
    pub fn search(text: impl Into<String>, filters: &DiscoverFilters) -> Self {
        Self::new("search/movie")
            .param("query", text)
            .param("include_adult", "false")
            .filtered(filters, true)
    }
}

impl std::fmt::Display for ListQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.endpoint)?;
        let mut sep = '?';
        for (k, v) in &self.params {
            write!(f, "{sep}{k}={v}")?;
            sep = '&';
        }
        Ok(())
    }
}

/// User-selected discovery filters shared by the home sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverFilters {
    /// Response language.
    pub language: String,
    /// Original languages to include (ISO 639-1). Empty means any.
    pub original_languages: Vec<String>,
    /// Inclusive release year window.
    pub release_years: Option<(u16, u16)>,
}

impl Default for DiscoverFilters {
    fn default() -> Self {
        Self {
            language: String::from("en-US"),
            original_languages: vec![String::from("en")],
            release_years: Some((1980, 2025)),
        }
    }
}

/// A titled listing shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section heading.
    pub title: &'static str,
    /// Listing to fetch.
    pub query: ListQuery,
}

/// The home page sections, in display order.
#[must_use]
pub fn home_sections(filters: &DiscoverFilters) -> Vec<Section> {
    vec![
        Section {
            title: "Recommended for You",
            query: ListQuery::recommendations(filters),
        },
        Section {
            title: "Trending Now",
            query: ListQuery::trending(filters),
        },
        Section {
            title: "Top Rated",
            query: ListQuery::top_rated(filters),
        },
        Section {
            title: "New Releases",
            query: ListQuery::now_playing(filters),
        },
        Section {
            title: "Action Movies",
            query: ListQuery::by_genre(GENRE_ACTION, filters),
        },
        Section {
            title: "Comedy Movies",
            query: ListQuery::by_genre(GENRE_COMEDY, filters),
        },
    ]
}
