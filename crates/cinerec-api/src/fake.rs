//! In-memory backend for unit tests.
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::api::{LocalAuthApi, LocalMovieApi};
use crate::error::{ClientError, Result};
use crate::query::ListQuery;
use crate::types::{
    AuthResponse, FavoriteRecord, HistoryEntry, MovieDetail, MovieId, MovieListResponse,
    MovieSummary, ProviderBlock, ProvidersResponse, UserInfo, Video, VideosResponse,
};

/// Backend operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Auth,
    List,
    Detail,
    Videos,
    Providers,
    Favorites,
    Toggle,
    History,
    AddHistory,
    RemoveHistory,
    ClearHistory,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<(UserInfo, String)>,
    listings: HashMap<ListQuery, VecDeque<Vec<MovieSummary>>>,
    details: BTreeMap<MovieId, MovieDetail>,
    videos: HashMap<MovieId, Vec<Video>>,
    providers: HashMap<MovieId, BTreeMap<String, ProviderBlock>>,
    favorites: Vec<FavoriteRecord>,
    history: Vec<HistoryEntry>,
    failing: HashSet<Op>,
    calls: HashMap<Op, usize>,
}

/// Stateful fake of the cinerec backend.
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    auth_calls: AtomicUsize,
    next_id: AtomicU64,
}

/// Builds a summary with a poster and a 2001 release date.
pub fn summary(id: MovieId, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: String::from(title),
        poster_path: Some(format!("/{id}.jpg")),
        release_date: Some(String::from("2001-01-01")),
        vote_average: 7.5,
    }
}

/// Builds a detail record for `id`.
pub fn detail(id: MovieId, title: &str) -> MovieDetail {
    MovieDetail {
        id,
        title: String::from(title),
        poster_path: Some(format!("/{id}.jpg")),
        release_date: Some(String::from("2001-01-01")),
        vote_average: 7.5,
        overview: Some(String::from("An overview.")),
        runtime: Some(125),
        genres: Vec::new(),
        tagline: None,
        backdrop_path: None,
        original_language: Some(String::from("en")),
        credits: crate::types::Credits::default(),
        production_companies: Vec::new(),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Counts the call and returns the injected failure, if any.
    fn enter(&self, op: Op) -> Result<()> {
        let mut state = self.state();
        *state.calls.entry(op).or_default() += 1;
        if state.failing.contains(&op) {
            return Err(ClientError::Network(format!("{op:?} unavailable")));
        }
        Ok(())
    }

    pub fn add_user(&self, username: &str, email: &str, password: &str) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.state().users.push((
            UserInfo {
                id,
                username: String::from(username),
                email: String::from(email),
            },
            String::from(password),
        ));
    }

    /// Queues one response for `query`; the last queued response repeats.
    pub fn push_listing(&self, query: &ListQuery, results: Vec<MovieSummary>) {
        self.state()
            .listings
            .entry(query.clone())
            .or_default()
            .push_back(results);
    }

    pub fn add_movie(&self, movie: MovieDetail) {
        self.state().details.insert(movie.id, movie);
    }

    pub fn set_videos(&self, movie_id: MovieId, videos: Vec<Video>) {
        self.state().videos.insert(movie_id, videos);
    }

    pub fn set_providers(&self, movie_id: MovieId, region: &str, block: ProviderBlock) {
        self.state()
            .providers
            .entry(movie_id)
            .or_default()
            .insert(String::from(region), block);
    }

    pub fn add_favorite(&self, movie: &MovieSummary) {
        self.state().favorites.push(FavoriteRecord {
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
        });
    }

    pub fn favorite_ids(&self) -> Vec<MovieId> {
        self.state().favorites.iter().map(|f| f.movie_id).collect()
    }

    pub fn history_ids(&self) -> Vec<MovieId> {
        self.state().history.iter().map(|h| h.movie_id).collect()
    }

    pub fn fail(&self, op: Op) {
        self.state().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.state().failing.remove(&op);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    fn known_summary(state: &State, movie_id: MovieId) -> Option<MovieSummary> {
        state.details.get(&movie_id).map(MovieDetail::summary).or_else(|| {
            state
                .listings
                .values()
                .flat_map(|queue| queue.iter().flatten())
                .find(|m| m.id == movie_id)
                .cloned()
        })
    }
}

impl LocalAuthApi for FakeBackend {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(Op::Auth)?;
        let state = self.state();
        state
            .users
            .iter()
            .find(|(user, secret)| user.email == email && secret == password)
            .map(|(user, _)| AuthResponse {
                token: format!("token-{}", user.id),
                user: user.clone(),
            })
            .ok_or_else(|| ClientError::Auth(String::from("Invalid email or password")))
    }

    async fn signup(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(Op::Auth)?;
        if self.state().users.iter().any(|(user, _)| user.email == email) {
            return Err(ClientError::Auth(String::from("Email already registered")));
        }
        self.add_user(username, email, password);
        let state = self.state();
        let (user, _) = state.users.last().unwrap();
        Ok(AuthResponse {
            token: format!("token-{}", user.id),
            user: user.clone(),
        })
    }
}

impl LocalMovieApi for FakeBackend {
    async fn list_movies(&self, query: &ListQuery) -> Result<MovieListResponse> {
        self.enter(Op::List)?;
        let mut state = self.state();
        let results = match state.listings.get_mut(query) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => Vec::new(),
        };
        Ok(MovieListResponse {
            page: Some(1),
            total_pages: Some(1),
            total_results: u32::try_from(results.len()).ok(),
            results,
        })
    }

    async fn movie_detail(&self, movie_id: MovieId) -> Result<MovieDetail> {
        self.enter(Op::Detail)?;
        self.state()
            .details
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("movies/{movie_id}")))
    }

    async fn movie_videos(&self, movie_id: MovieId) -> Result<VideosResponse> {
        self.enter(Op::Videos)?;
        Ok(VideosResponse {
            results: self
                .state()
                .videos
                .get(&movie_id)
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn movie_providers(&self, movie_id: MovieId) -> Result<ProvidersResponse> {
        self.enter(Op::Providers)?;
        Ok(ProvidersResponse {
            results: self
                .state()
                .providers
                .get(&movie_id)
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn favorites(&self) -> Result<Vec<FavoriteRecord>> {
        self.enter(Op::Favorites)?;
        Ok(self.state().favorites.clone())
    }

    async fn toggle_favorite(&self, movie_id: MovieId) -> Result<()> {
        self.enter(Op::Toggle)?;
        let mut state = self.state();
        if let Some(pos) = state.favorites.iter().position(|f| f.movie_id == movie_id) {
            state.favorites.remove(pos);
        } else {
            let movie = Self::known_summary(&state, movie_id)
                .unwrap_or_else(|| summary(movie_id, "Unknown"));
            state.favorites.push(FavoriteRecord {
                movie_id,
                title: movie.title,
                poster_path: movie.poster_path,
                release_date: movie.release_date,
                vote_average: movie.vote_average,
            });
        }
        Ok(())
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.enter(Op::History)?;
        Ok(self.state().history.clone())
    }

    async fn add_history(&self, movie_id: MovieId) -> Result<()> {
        self.enter(Op::AddHistory)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        let movie =
            Self::known_summary(&state, movie_id).unwrap_or_else(|| summary(movie_id, "Unknown"));
        state.history.insert(
            0,
            HistoryEntry {
                id,
                movie_id,
                title: movie.title,
                poster_path: movie.poster_path,
                viewed_at: format!("2024-01-01T00:00:{:02}", id % 60),
            },
        );
        Ok(())
    }

    async fn remove_history(&self, movie_id: MovieId) -> Result<()> {
        self.enter(Op::RemoveHistory)?;
        self.state().history.retain(|h| h.movie_id != movie_id);
        Ok(())
    }

    async fn clear_history(&self) -> Result<()> {
        self.enter(Op::ClearHistory)?;
        self.state().history.clear();
        Ok(())
    }
}
