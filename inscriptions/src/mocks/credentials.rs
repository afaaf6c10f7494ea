//! In-memory credential store

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::auth::{CredentialError, CredentialStore};
use crate::types::UserSession;

/// Credential store that keeps the session in memory
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    session: Mutex<Option<UserSession>>,
}

impl InMemoryCredentialStore {
    /// An empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `session`
    #[must_use]
    pub fn with_session(session: UserSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<UserSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<UserSession>, CredentialError> {
        Ok(self.lock().clone())
    }

    fn save(&self, session: &UserSession) -> Result<(), CredentialError> {
        *self.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.lock() = None;
        Ok(())
    }
}
