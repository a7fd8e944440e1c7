//! `SessionStore` - login, signup, logout and persistence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::instrument;

use super::storage::{LocalStorage, SESSION_KEY};
use super::validation::validate_signup;
use crate::api::LocalAuthApi;
use crate::error::Result;
use crate::types::AuthResponse;

/// The signed-in identity and its opaque bearer credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// User ID.
    pub user_id: u64,
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Bearer credential, forwarded verbatim.
    pub credential: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("credential", &"<redacted>")
            .finish()
    }
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            user_id: response.user.id,
            username: response.user.username,
            email: response.user.email,
            credential: response.token,
        }
    }
}

/// Shared read view of the current session.
///
/// Cloning is cheap; all clones observe the same session. Only
/// [`SessionStore`] writes through it.
#[derive(Debug, Clone, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    /// Creates a handle with no session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_session(session: Option<Session>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Current bearer credential, if signed in.
    pub async fn credential(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| s.credential.clone())
    }

    /// Current session, if signed in.
    pub async fn current(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    async fn replace(&self, session: Option<Session>) {
        *self.inner.write().await = session;
    }
}

/// Owns the session lifecycle and its durable copy.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SessionStore<S> {
    storage: S,
    handle: SessionHandle,
}

impl<S: LocalStorage> SessionStore<S> {
    /// Creates a store, restoring a previously persisted session.
    ///
    /// An unreadable or corrupt persisted record is discarded with a warning
    /// and the store starts signed out.
    pub fn restore(storage: S) -> Self {
        let session = match storage.get_item(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    tracing::debug!(user_id = session.user_id, "Restored persisted session");
                    Some(session)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding corrupt persisted session");
                    if let Err(e) = storage.remove_item(SESSION_KEY) {
                        tracing::warn!(error = %e, "Failed to remove corrupt session");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted session");
                None
            }
        };

        Self {
            storage,
            handle: SessionHandle::with_session(session),
        }
    }

    /// Read handle to inject into the backend client and guarded views.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Returns the active session, if any.
    pub async fn current_session(&self) -> Option<Session> {
        self.handle.current().await
    }

    /// Signs in and makes the session current.
    ///
    /// # Errors
    ///
    /// `ClientError::Auth` for rejected credentials, `ClientError::Network`
    /// on transport failure. Never retried.
    #[instrument(skip_all)]
    pub async fn login<A: LocalAuthApi>(
        &self,
        api: &A,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        let response = api.login(email, password).await?;
        Ok(self.activate(response).await)
    }

    /// Validates the form locally, then creates the account and signs in.
    ///
    /// # Errors
    ///
    /// `ClientError::Validation` without contacting the backend when the
    /// password is too short or the confirmation differs; otherwise as
    /// [`Self::login`].
    #[instrument(skip_all)]
    pub async fn signup<A: LocalAuthApi>(
        &self,
        api: &A,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Session> {
        validate_signup(password, confirm_password)?;
        let response = api.signup(username, email, password).await?;
        Ok(self.activate(response).await)
    }

    /// Clears the current session and its durable copy. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the durable copy cannot be removed;
    /// the in-memory session is cleared regardless.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<()> {
        let previous = self.handle.current().await;
        self.handle.replace(None).await;
        self.storage.remove_item(SESSION_KEY)?;
        if let Some(session) = previous {
            tracing::info!(user_id = session.user_id, "Signed out");
        }
        Ok(())
    }

    async fn activate(&self, response: AuthResponse) -> Session {
        let session = Session::from(response);
        match serde_json::to_string(&session) {
            Ok(raw) => {
                if let Err(e) = self.storage.set_item(SESSION_KEY, &raw) {
                    tracing::warn!(error = %e, "Session will not survive restart");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode session"),
        }
        self.handle.replace(Some(session.clone())).await;
        tracing::info!(user_id = session.user_id, username = %session.username, "Signed in");
        session
    }
}
