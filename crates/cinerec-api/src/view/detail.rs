//! Detail surface: one movie with its videos, providers and favorite flag.
#![allow(clippy::future_not_send)]

use tracing::instrument;

use super::RenderStatus;
use crate::api::LocalMovieApi;
use crate::error::{ClientError, Result};
use crate::images::{ImageSize, image_url, poster_url};
use crate::service::{MovieService, validate_movie_id};
use crate::types::{CastMember, MovieDetail, MovieId, ProviderBlock, ProvidersResponse, Video};

/// Region whose providers are highlighted by default.
pub const DEFAULT_REGION: &str = "US";

/// Billed cast shown on the detail surface.
const CAST_LIMIT: usize = 8;

/// Picks the trailer: the first YouTube "Trailer", else the first YouTube
/// video of any kind.
#[must_use]
pub fn select_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.kind == "Trailer" && v.site == "YouTube")
        .or_else(|| videos.iter().find(|v| v.site == "YouTube"))
}

/// Formats minutes as `Hh Mm`.
#[must_use]
pub fn format_runtime(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Everything the detail surface shows once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieView {
    /// Authoritative movie detail.
    pub detail: MovieDetail,
    /// Videos; empty when they could not be fetched.
    pub videos: Vec<Video>,
    /// Providers by region; empty when they could not be fetched.
    pub providers: ProvidersResponse,
    /// Favorite membership; `false` when unknown.
    pub is_favorite: bool,
}

impl MovieView {
    /// Selected trailer.
    #[must_use]
    pub fn trailer(&self) -> Option<&Video> {
        select_trailer(&self.videos)
    }

    /// Runtime as `Hh Mm`, when known and non-zero.
    #[must_use]
    pub fn runtime_label(&self) -> Option<String> {
        self.detail
            .runtime
            .filter(|m| *m > 0)
            .map(format_runtime)
    }

    /// Providers for `region`, when the region has any.
    #[must_use]
    pub fn providers_in(&self, region: &str) -> Option<&ProviderBlock> {
        self.providers.region(region).filter(|b| !b.is_empty())
    }

    /// Top billed cast.
    #[must_use]
    pub fn top_cast(&self) -> &[CastMember] {
        let cast = &self.detail.credits.cast;
        cast.get(..CAST_LIMIT).unwrap_or(cast)
    }

    /// Poster URL, or the placeholder.
    #[must_use]
    pub fn poster_url(&self) -> String {
        poster_url(self.detail.poster_path.as_deref())
    }

    /// Full-size backdrop URL.
    #[must_use]
    pub fn backdrop_url(&self) -> Option<String> {
        image_url(self.detail.backdrop_path.as_deref(), ImageSize::Original)
    }

    /// Genre names, comma separated.
    #[must_use]
    pub fn genre_line(&self) -> String {
        self.detail
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Detail lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    /// Not loaded yet.
    #[default]
    Idle,
    /// Fetches in flight.
    Loading,
    /// Detail available.
    Loaded(Box<MovieView>),
    /// Detail unavailable (`NotFound` for an unknown movie).
    Error(ClientError),
}

/// Controller for a single movie.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct DetailController {
    movie_id: MovieId,
    state: DetailState,
}

impl DetailController {
    /// Creates an idle controller for `movie_id`.
    #[must_use]
    pub fn new(movie_id: MovieId) -> Self {
        Self {
            movie_id,
            state: DetailState::Idle,
        }
    }

    /// Movie this controller shows.
    #[must_use]
    pub const fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &DetailState {
        &self.state
    }

    /// Loaded view, if any.
    #[must_use]
    pub fn view(&self) -> Option<&MovieView> {
        match &self.state {
            DetailState::Loaded(view) => Some(view.as_ref()),
            _ => None,
        }
    }

    /// Coarse status for renderers.
    #[must_use]
    pub const fn status(&self) -> RenderStatus {
        match self.state {
            DetailState::Idle => RenderStatus::Idle,
            DetailState::Loading => RenderStatus::Loading,
            DetailState::Loaded(_) => RenderStatus::Ready,
            DetailState::Error(_) => RenderStatus::Error,
        }
    }

    /// Records the view and fetches detail, videos, providers and favorite
    /// membership concurrently.
    ///
    /// Only the detail fetch decides between loaded and error; the others
    /// degrade. The zero ID is rejected without contacting the backend.
    #[instrument(skip_all, fields(movie_id = self.movie_id))]
    pub async fn load<A: LocalMovieApi>(&mut self, service: &MovieService<A>) {
        let movie_id = match validate_movie_id(self.movie_id) {
            Ok(id) => id,
            Err(e) => {
                self.state = DetailState::Error(e);
                return;
            }
        };
        self.state = DetailState::Loading;

        let (recorded, detail, videos, providers, is_favorite) = futures::join!(
            service.add_history(movie_id),
            service.get_movie_detail(movie_id),
            service.get_movie_videos(movie_id),
            service.get_movie_providers(movie_id),
            service.is_favorite(movie_id),
        );

        if let Err(e) = recorded {
            tracing::warn!(error = %e, "Failed to record view");
        }

        self.state = match detail {
            Ok(detail) => {
                tracing::debug!(title = %detail.title, "Movie loaded");
                DetailState::Loaded(Box::new(MovieView {
                    detail,
                    videos: videos.results,
                    providers,
                    is_favorite,
                }))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Movie detail unavailable");
                DetailState::Error(e)
            }
        };
    }

    /// Flips the favorite flag optimistically and confirms with the
    /// backend, rolling back on failure.
    ///
    /// # Errors
    ///
    /// `ClientError::Validation` when nothing is loaded; otherwise the
    /// backend error after rolling back.
    #[instrument(skip_all, fields(movie_id = self.movie_id))]
    pub async fn toggle_favorite<A: LocalMovieApi>(
        &mut self,
        service: &MovieService<A>,
    ) -> Result<bool> {
        let DetailState::Loaded(view) = &mut self.state else {
            return Err(ClientError::Validation(String::from("Movie is not loaded")));
        };
        let previous = view.is_favorite;
        view.is_favorite = !previous;

        if let Err(e) = service.toggle_favorite(self.movie_id).await {
            tracing::warn!(error = %e, "Favorite toggle failed, rolling back");
            if let DetailState::Loaded(view) = &mut self.state {
                view.is_favorite = previous;
            }
            return Err(e);
        }
        Ok(!previous)
    }

    /// Returns an error state to idle.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, DetailState::Error(_)) {
            self.state = DetailState::Idle;
        }
    }
}
