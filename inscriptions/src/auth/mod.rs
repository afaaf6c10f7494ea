//! Authentication: login, logout and session restore
//!
//! The session lives in [`AuthState`]. Restoring, logging in and logging out
//! touch the backend and the [`CredentialStore`], so they run as effects.
//! Credential store calls are blocking and go through the blocking pool.

use std::sync::Arc;

use inscripciones_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};

use crate::api::{ApiClient, Credentials};
use crate::types::UserSession;

pub mod credentials;

pub use credentials::{CredentialError, CredentialStore, FileCredentialStore};

/// Authentication state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    /// The active session, if logged in
    pub session: Option<UserSession>,
    /// Whether a login request is in flight
    pub pending: bool,
    /// Last error (for display)
    pub last_error: Option<String>,
}

impl AuthState {
    /// The logged-in session, when it carries a token
    #[must_use]
    pub fn principal(&self) -> Option<&UserSession> {
        self.session.as_ref().filter(|s| s.has_token())
    }

    /// Whether a user is logged in
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}

/// Authentication actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthAction {
    /// Load a previously stored session
    Restore,
    /// Stored session loaded (or absent)
    Restored {
        /// The stored session
        session: Option<UserSession>,
    },
    /// Log in with credentials
    Login {
        /// Username and password
        credentials: Credentials,
    },
    /// Login succeeded
    LoggedIn {
        /// The new session
        session: UserSession,
    },
    /// Login was rejected or the backend was unreachable
    LoginFailed {
        /// Error description
        error: String,
    },
    /// End the session
    Logout,
    /// Stored session removed
    LoggedOut,
}

/// Dependencies of the authentication reducer
#[derive(Clone)]
pub struct AuthEnvironment {
    /// Backend client; receives the token of the active session
    pub api: Arc<dyn ApiClient>,
    /// Where the session is persisted
    pub credentials: Arc<dyn CredentialStore>,
}

impl AuthEnvironment {
    /// Creates a new `AuthEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn ApiClient>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { api, credentials }
    }
}

/// Run a credential store call on the blocking pool
async fn with_store<T, F>(store: Arc<dyn CredentialStore>, op: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&dyn CredentialStore) -> Result<T, CredentialError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || op(store.as_ref())).await {
        Ok(result) => result.map_err(|error| error.to_string()),
        Err(error) => Err(error.to_string()),
    }
}

/// Reducer for [`AuthState`]
#[derive(Clone, Debug, Default)]
pub struct AuthReducer;

impl AuthReducer {
    /// Creates a new `AuthReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_login(credentials: &Credentials) -> Result<(), String> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err("username and password are required".to_string());
        }
        Ok(())
    }
}

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AuthAction::Restore => {
                let api = Arc::clone(&env.api);
                let store = Arc::clone(&env.credentials);
                smallvec![Effect::future(async move {
                    let session = with_store(store, |s| s.load())
                        .await
                        .unwrap_or_else(|error| {
                            tracing::warn!(%error, "Ignoring unreadable stored session");
                            None
                        });
                    api.set_token(session.as_ref().map(|s| s.token.clone()));
                    Some(AuthAction::Restored { session })
                })]
            },

            AuthAction::Restored { session } => {
                tracing::debug!(restored = session.is_some(), "Session restore finished");
                state.session = session;
                SmallVec::new()
            },

            AuthAction::Login { credentials } => {
                if state.pending {
                    return SmallVec::new();
                }
                if let Err(error) = Self::validate_login(&credentials) {
                    state.last_error = Some(error);
                    return SmallVec::new();
                }

                state.pending = true;
                state.last_error = None;

                let api = Arc::clone(&env.api);
                let store = Arc::clone(&env.credentials);
                smallvec![Effect::future(async move {
                    match api.login(&credentials).await {
                        Ok(session) => {
                            let stored = session.clone();
                            if let Err(error) = with_store(store, move |s| s.save(&stored)).await {
                                tracing::warn!(%error, "Session could not be stored");
                            }
                            api.set_token(Some(session.token.clone()));
                            Some(AuthAction::LoggedIn { session })
                        },
                        Err(error) => Some(AuthAction::LoginFailed {
                            error: error.to_string(),
                        }),
                    }
                })]
            },

            AuthAction::LoggedIn { session } => {
                tracing::info!(user = %session.user.username, "Logged in");
                state.pending = false;
                state.last_error = None;
                state.session = Some(session);
                SmallVec::new()
            },

            AuthAction::LoginFailed { error } => {
                tracing::warn!(%error, "Login failed");
                state.pending = false;
                state.last_error = Some(error);
                SmallVec::new()
            },

            AuthAction::Logout => {
                state.session = None;
                state.last_error = None;

                let api = Arc::clone(&env.api);
                let store = Arc::clone(&env.credentials);
                smallvec![Effect::future(async move {
                    api.set_token(None);
                    if let Err(error) = with_store(store, |s| s.clear()).await {
                        tracing::warn!(%error, "Stored session could not be removed");
                    }
                    Some(AuthAction::LoggedOut)
                })]
            },

            AuthAction::LoggedOut => {
                tracing::info!("Logged out");
                SmallVec::new()
            },
        }
    }
}
