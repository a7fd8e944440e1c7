//! Image CDN URLs for posters, backdrops, profiles and logos.

/// Image CDN base URL.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Substituted when a poster path is absent.
pub const PLACEHOLDER_URL: &str = "https://via.placeholder.com/500x750?text=No+Poster";

/// Size variants served by the CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// 92px wide (logos).
    W92,
    /// 185px wide (profiles).
    W185,
    /// 500px wide (posters).
    W500,
    /// Original resolution (backdrops, provider logos).
    Original,
}

impl ImageSize {
    /// Path segment for this size.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::W92 => "w92",
            Self::W185 => "w185",
            Self::W500 => "w500",
            Self::Original => "original",
        }
    }
}

/// Builds the CDN URL for `path`, or `None` when the path is absent or empty.
#[must_use]
pub fn image_url(path: Option<&str>, size: ImageSize) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE_URL}/{}{p}", size.as_str()))
}

/// Poster URL at `w500`, falling back to the placeholder.
#[must_use]
pub fn poster_url(path: Option<&str>) -> String {
    image_url(path, ImageSize::W500).unwrap_or_else(|| String::from(PLACEHOLDER_URL))
}
