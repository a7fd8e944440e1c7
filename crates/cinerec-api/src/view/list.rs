//! One controller for every listing surface.
#![allow(clippy::future_not_send)]

use std::collections::HashSet;

use chrono::NaiveDateTime;

use tracing::instrument;

use super::RenderStatus;
use crate::api::LocalMovieApi;
use crate::error::Result;
use crate::images::poster_url;
use crate::query::ListQuery;
use crate::service::MovieService;
use crate::types::{
    FavoriteRecord, HistoryEntry, MovieId, MovieSummary, parse_viewed_at, release_year,
};

/// What a listing shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListSource {
    /// An upstream listing.
    Movies(ListQuery),
    /// The user's favorites.
    Favorites,
    /// The user's watch history, most recent first.
    History,
}

impl std::fmt::Display for ListSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movies(query) => write!(f, "movies/{query}"),
            Self::Favorites => f.write_str("favorites"),
            Self::History => f.write_str("history"),
        }
    }
}

/// Card projection shared by all sources.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem {
    /// Movie ID.
    pub movie_id: MovieId,
    /// Title.
    pub title: String,
    /// Poster path fragment.
    pub poster_path: Option<String>,
    /// Release date (YYYY-MM-DD).
    pub release_date: Option<String>,
    /// Vote average; history entries carry none.
    pub vote_average: Option<f64>,
    /// View timestamp, for history entries.
    pub viewed_at: Option<String>,
}

impl ListingItem {
    /// Poster URL, or the placeholder.
    #[must_use]
    pub fn poster_url(&self) -> String {
        poster_url(self.poster_path.as_deref())
    }

    /// Release year, if the date is present.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    /// Parsed view timestamp of a history card.
    #[must_use]
    pub fn viewed_at_time(&self) -> Option<NaiveDateTime> {
        self.viewed_at.as_deref().and_then(parse_viewed_at)
    }
}

impl From<MovieSummary> for ListingItem {
    fn from(movie: MovieSummary) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title,
            poster_path: movie.poster_path,
            release_date: movie.release_date,
            vote_average: Some(movie.vote_average),
            viewed_at: None,
        }
    }
}

impl From<FavoriteRecord> for ListingItem {
    fn from(record: FavoriteRecord) -> Self {
        Self {
            movie_id: record.movie_id,
            title: record.title,
            poster_path: record.poster_path,
            release_date: record.release_date,
            vote_average: Some(record.vote_average),
            viewed_at: None,
        }
    }
}

impl From<HistoryEntry> for ListingItem {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            movie_id: entry.movie_id,
            title: entry.title,
            poster_path: entry.poster_path,
            release_date: None,
            vote_average: None,
            viewed_at: Some(entry.viewed_at),
        }
    }
}

/// Listing lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListState {
    /// No source yet, or an error was dismissed.
    #[default]
    Idle,
    /// Waiting for the latest fetch.
    Loading,
    /// Items of the latest fetch.
    Loaded(Vec<ListingItem>),
    /// The latest fetch failed.
    Error(String),
}

/// A prepared fetch, tagged with the generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a ticket does nothing until it is run and applied"]
pub struct FetchTicket {
    generation: u64,
    source: ListSource,
}

impl FetchTicket {
    /// Generation this ticket belongs to.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Source being fetched.
    pub const fn source(&self) -> &ListSource {
        &self.source
    }

    /// Performs the fetch. The favorited-id set is derived afterwards with
    /// the degrading favorites read, so its failure never fails the fetch.
    #[instrument(skip_all, fields(generation = self.generation, source = %self.source))]
    pub async fn run<A: LocalMovieApi>(self, service: &MovieService<A>) -> FetchOutcome {
        let items: Result<Vec<ListingItem>> = match &self.source {
            ListSource::Movies(query) => service
                .try_list_movies(query)
                .await
                .map(|r| r.results.into_iter().map(ListingItem::from).collect()),
            ListSource::Favorites => service
                .try_list_favorites()
                .await
                .map(|v| v.into_iter().map(ListingItem::from).collect()),
            ListSource::History => service
                .try_list_history()
                .await
                .map(|v| v.into_iter().map(ListingItem::from).collect()),
        };

        let result = match items {
            Ok(items) => {
                let favorited = if self.source == ListSource::Favorites {
                    items.iter().map(|i| i.movie_id).collect()
                } else {
                    service
                        .list_favorites()
                        .await
                        .into_iter()
                        .map(|f| f.movie_id)
                        .collect()
                };
                Ok((items, favorited))
            }
            Err(e) => Err(e),
        };

        FetchOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// Result of a [`FetchTicket`], to be handed back to the controller.
#[derive(Debug)]
pub struct FetchOutcome {
    generation: u64,
    result: Result<(Vec<ListingItem>, HashSet<MovieId>)>,
}

impl FetchOutcome {
    /// Generation of the ticket that produced this outcome.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// An optimistic favorite flip awaiting backend confirmation.
#[derive(Debug)]
#[must_use = "an unsettled toggle leaves the optimistic change in place"]
pub struct FavoriteToggle {
    movie_id: MovieId,
    generation: u64,
    was_favorite: bool,
    removed_card: Option<(usize, ListingItem)>,
}

impl FavoriteToggle {
    /// Movie being toggled.
    pub const fn movie_id(&self) -> MovieId {
        self.movie_id
    }
}

/// Generic listing controller.
///
/// Every fetch carries a generation; only the outcome of the latest one is
/// applied, so a slow response for an old source can never overwrite the
/// current one.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct ListController {
    source: Option<ListSource>,
    state: ListState,
    favorited: HashSet<MovieId>,
    generation: u64,
}

impl ListController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ListState {
        &self.state
    }

    /// Current source.
    #[must_use]
    pub const fn source(&self) -> Option<&ListSource> {
        self.source.as_ref()
    }

    /// Latest issued generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Loaded items; empty unless loaded.
    #[must_use]
    pub fn items(&self) -> &[ListingItem] {
        match &self.state {
            ListState::Loaded(items) => items,
            _ => &[],
        }
    }

    /// Error message of a failed fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ListState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Whether `movie_id` is favorited.
    #[must_use]
    pub fn is_favorite(&self, movie_id: MovieId) -> bool {
        self.favorited.contains(&movie_id)
    }

    /// Favorited IDs known to this controller.
    #[must_use]
    pub const fn favorited(&self) -> &HashSet<MovieId> {
        &self.favorited
    }

    /// Coarse status for renderers.
    #[must_use]
    pub fn status(&self) -> RenderStatus {
        match &self.state {
            ListState::Idle => RenderStatus::Idle,
            ListState::Loading => RenderStatus::Loading,
            ListState::Error(_) => RenderStatus::Error,
            ListState::Loaded(items) if items.is_empty() => RenderStatus::Empty,
            ListState::Loaded(_) => RenderStatus::Ready,
        }
    }

    /// Points the controller at `source`.
    ///
    /// Returns a ticket when the source differs by value from the current
    /// one; an equal source keeps the current state and returns `None`.
    pub fn set_source(&mut self, source: ListSource) -> Option<FetchTicket> {
        if self.source.as_ref() == Some(&source) {
            tracing::trace!(%source, "Source unchanged, not refetching");
            return None;
        }
        self.source = Some(source);
        self.start()
    }

    /// Refetches the current source, if any.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.start()
    }

    fn start(&mut self) -> Option<FetchTicket> {
        let source = self.source.clone()?;
        self.generation = self.generation.wrapping_add(1);
        self.state = ListState::Loading;
        tracing::debug!(generation = self.generation, %source, "Fetch issued");
        Some(FetchTicket {
            generation: self.generation,
            source,
        })
    }

    /// Applies a fetch outcome. Returns `false` and leaves the state
    /// untouched when the outcome is stale.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                stale = outcome.generation,
                latest = self.generation,
                "Discarding stale fetch"
            );
            return false;
        }
        match outcome.result {
            Ok((items, favorited)) => {
                tracing::debug!(count = items.len(), "Listing loaded");
                self.favorited = favorited;
                self.state = ListState::Loaded(items);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Listing failed");
                self.state = ListState::Error(e.to_string());
            }
        }
        true
    }

    /// Sets the source and, when that issues a fetch, runs and applies it.
    pub async fn load<A: LocalMovieApi>(&mut self, service: &MovieService<A>, source: ListSource) {
        if let Some(ticket) = self.set_source(source) {
            let outcome = ticket.run(service).await;
            self.apply(outcome);
        }
    }

    /// Refetches the current source and applies the result.
    pub async fn reload<A: LocalMovieApi>(&mut self, service: &MovieService<A>) {
        if let Some(ticket) = self.refresh() {
            let outcome = ticket.run(service).await;
            self.apply(outcome);
        }
    }

    /// Returns an error state to idle.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, ListState::Error(_)) {
            self.state = ListState::Idle;
        }
    }

    /// Flips favorite membership locally before any backend call. On the
    /// favorites surface, un-favoriting also removes the card.
    pub fn begin_toggle(&mut self, movie_id: MovieId) -> FavoriteToggle {
        let was_favorite = !self.favorited.insert(movie_id);
        let mut removed_card = None;
        if was_favorite {
            self.favorited.remove(&movie_id);
            if self.source == Some(ListSource::Favorites)
                && let ListState::Loaded(items) = &mut self.state
                && let Some(index) = items.iter().position(|i| i.movie_id == movie_id)
            {
                removed_card = Some((index, items.remove(index)));
            }
        }
        FavoriteToggle {
            movie_id,
            generation: self.generation,
            was_favorite,
            removed_card,
        }
    }

    /// Settles an optimistic flip with the backend result, rolling the
    /// local change back on failure.
    ///
    /// A fetch issued after the flip owns the local state, so the rollback
    /// is skipped when the generation has moved on.
    ///
    /// # Errors
    ///
    /// Returns the backend error after rolling back.
    pub fn settle_toggle(&mut self, toggle: FavoriteToggle, result: Result<()>) -> Result<()> {
        let Err(e) = result else {
            return Ok(());
        };
        if toggle.generation != self.generation {
            tracing::warn!(
                movie_id = toggle.movie_id,
                error = %e,
                "Favorite toggle failed after the listing changed, not rolling back"
            );
            return Err(e);
        }
        tracing::warn!(movie_id = toggle.movie_id, error = %e, "Favorite toggle failed, rolling back");
        if toggle.was_favorite {
            self.favorited.insert(toggle.movie_id);
        } else {
            self.favorited.remove(&toggle.movie_id);
        }
        if let Some((index, item)) = toggle.removed_card
            && let ListState::Loaded(items) = &mut self.state
        {
            let index = index.min(items.len());
            items.insert(index, item);
        }
        Err(e)
    }

    /// Optimistically toggles a favorite and confirms it with the backend.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the local change has been rolled back.
    #[instrument(skip(self, service))]
    pub async fn toggle_favorite<A: LocalMovieApi>(
        &mut self,
        service: &MovieService<A>,
        movie_id: MovieId,
    ) -> Result<()> {
        let toggle = self.begin_toggle(movie_id);
        let result = service.toggle_favorite(movie_id).await;
        self.settle_toggle(toggle, result)
    }

    /// Removes a movie from the history; the local list is patched only
    /// after the backend confirms.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged.
    pub async fn remove_history<A: LocalMovieApi>(
        &mut self,
        service: &MovieService<A>,
        movie_id: MovieId,
    ) -> Result<()> {
        service.remove_history(movie_id).await?;
        if self.source == Some(ListSource::History)
            && let ListState::Loaded(items) = &mut self.state
        {
            items.retain(|i| i.movie_id != movie_id);
        }
        Ok(())
    }

    /// Clears the history; the local list is emptied only after the
    /// backend confirms.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged.
    pub async fn clear_history<A: LocalMovieApi>(
        &mut self,
        service: &MovieService<A>,
    ) -> Result<()> {
        service.clear_history().await?;
        if self.source == Some(ListSource::History) && matches!(self.state, ListState::Loaded(_)) {
            self.state = ListState::Loaded(Vec::new());
        }
        Ok(())
    }
}
