//! `CinerecClient` - HTTP client for the cinerec backend.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::api::{LocalAuthApi, LocalMovieApi};
use crate::error::{ClientError, Result};
use crate::query::ListQuery;
use crate::session::SessionHandle;
use crate::types::{
    AuthResponse, FavoriteRecord, HistoryEntry, LoginRequest, MessageResponse, MovieDetail,
    MovieId, MovieIdBody, MovieListResponse, ProvidersResponse, SignupRequest, VideosResponse,
};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend client. Attaches the current bearer credential to every call.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CinerecClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests (always ends with `/`).
    base_url: Url,
    /// Read view of the session; never written here.
    session: SessionHandle,
}

/// Builder for `CinerecClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CinerecClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    session: Option<SessionHandle>,
    timeout: Option<Duration>,
}

impl CinerecClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            session: None,
            timeout: None,
        }
    }

    /// Overrides the base URL (config, or wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the session the credential is read from (default: signed out).
    #[must_use]
    pub fn session(mut self, session: SessionHandle) -> Self {
        self.session = Some(session);
        self
    }

    /// Sets the per-request timeout (default: 30s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - the default base URL is invalid.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<CinerecClient> {
        let user_agent = self
            .user_agent
            .ok_or_else(|| ClientError::Network(String::from("user_agent is required")))?;

        let mut base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| ClientError::Network(format!("invalid default base URL: {e}")))?
        };
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(CinerecClient {
            http_client,
            base_url,
            session: self.session.unwrap_or_default(),
        })
    }
}

impl CinerecClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> CinerecClientBuilder {
        CinerecClientBuilder::new()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Network(format!("failed to join URL path {path}: {e}")))
    }

    /// Sends a request with the bearer credential attached, returning the
    /// status and the raw body. Only transport failures are errors here.
    #[instrument(skip_all, fields(path = %path))]
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<(StatusCode, String)> {
        let request = match self.session.credential().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let request = request.build()?;

        tracing::debug!(method = %request.method(), url = %request.url(), "Backend request");

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::trace!(%status, len = body.len(), "Backend response");
        Ok((status, body))
    }

    /// Maps a non-2xx status on a protected call to the error taxonomy.
    fn status_error(status: StatusCode, path: &str, body: &str) -> ClientError {
        let message = serde_json::from_str::<MessageResponse>(body)
            .map_or_else(|_| format!("HTTP {status}"), |m| m.message);
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthenticated,
            StatusCode::NOT_FOUND => ClientError::NotFound(format!("{path}: {message}")),
            _ => ClientError::Network(format!("HTTP {status} from {path}: {message}")),
        }
    }

    /// Decodes a proxied payload.
    ///
    /// The backend relays upstream failures as `{"error": "..."}` with a
    /// 200 status; those are surfaced as errors instead of decoding into an
    /// empty value.
    fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        if let Some(upstream) = value.get("error").and_then(serde_json::Value::as_str) {
            return Err(if upstream.contains("404") {
                ClientError::NotFound(format!("{path}: {upstream}"))
            } else {
                ClientError::Network(format!("{path}: {upstream}"))
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path)?;
        let (status, body) = self
            .send(self.http_client.get(url).query(query), path)
            .await?;
        if !status.is_success() {
            return Err(Self::status_error(status, path, &body));
        }
        Self::decode(path, &body)
    }

    async fn post_movie_id(&self, path: &str, movie_id: MovieId) -> Result<()> {
        let url = self.url(path)?;
        let (status, body) = self
            .send(
                self.http_client.post(url).json(&MovieIdBody { movie_id }),
                path,
            )
            .await?;
        Self::acknowledge(status, path, &body)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        let (status, body) = self.send(self.http_client.delete(url), path).await?;
        Self::acknowledge(status, path, &body)
    }

    fn acknowledge(status: StatusCode, path: &str, body: &str) -> Result<()> {
        if !status.is_success() {
            return Err(Self::status_error(status, path, body));
        }
        if let Ok(ack) = serde_json::from_str::<MessageResponse>(body) {
            tracing::debug!(%path, message = %ack.message, "Backend acknowledged");
        }
        Ok(())
    }

    async fn authenticate<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<AuthResponse> {
        let url = self.url(path)?;
        let (status, raw) = self
            .send(self.http_client.post(url).json(body), path)
            .await?;
        if status.is_success() {
            return Ok(serde_json::from_str(&raw)?);
        }
        if status.is_client_error() {
            let message = serde_json::from_str::<MessageResponse>(&raw)
                .map_or_else(|_| format!("HTTP {status}"), |m| m.message);
            return Err(ClientError::Auth(message));
        }
        Err(ClientError::Network(format!("HTTP {status} from {path}")))
    }
}

impl LocalAuthApi for CinerecClient {
    #[instrument(skip_all)]
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.authenticate("auth/login", &LoginRequest { email, password })
            .await
    }

    #[instrument(skip_all)]
    async fn signup(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        self.authenticate(
            "auth/signup",
            &SignupRequest {
                username,
                email,
                password,
            },
        )
        .await
    }
}

impl LocalMovieApi for CinerecClient {
    #[instrument(skip_all, fields(query = %query))]
    async fn list_movies(&self, query: &ListQuery) -> Result<MovieListResponse> {
        let path = format!("movies/{}", query.endpoint());
        self.get_json(&path, &query.query_pairs()).await
    }

    #[instrument(skip_all)]
    async fn movie_detail(&self, movie_id: MovieId) -> Result<MovieDetail> {
        self.get_json(&format!("movies/{movie_id}"), &[]).await
    }

    #[instrument(skip_all)]
    async fn movie_videos(&self, movie_id: MovieId) -> Result<VideosResponse> {
        self.get_json(&format!("movies/{movie_id}/videos"), &[])
            .await
    }

    #[instrument(skip_all)]
    async fn movie_providers(&self, movie_id: MovieId) -> Result<ProvidersResponse> {
        self.get_json(&format!("movies/{movie_id}/watch/providers"), &[])
            .await
    }

    #[instrument(skip_all)]
    async fn favorites(&self) -> Result<Vec<FavoriteRecord>> {
        self.get_json("user/favorites", &[]).await
    }

    #[instrument(skip_all)]
    async fn toggle_favorite(&self, movie_id: MovieId) -> Result<()> {
        self.post_movie_id("user/favorites/toggle", movie_id).await
    }

    #[instrument(skip_all)]
    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.get_json("user/history", &[]).await
    }

    #[instrument(skip_all)]
    async fn add_history(&self, movie_id: MovieId) -> Result<()> {
        self.post_movie_id("user/history/add", movie_id).await
    }

    #[instrument(skip_all)]
    async fn remove_history(&self, movie_id: MovieId) -> Result<()> {
        self.delete(&format!("user/history/{movie_id}")).await
    }

    #[instrument(skip_all)]
    async fn clear_history(&self) -> Result<()> {
        self.delete("user/history").await
    }
}
