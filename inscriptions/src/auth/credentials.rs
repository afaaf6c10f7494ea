//! Persistence of the authenticated session between runs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::UserSession;

/// Errors raised by a [`CredentialStore`]
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Reading or writing the backing storage failed
    #[error("credential storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored session could not be encoded or decoded
    #[error("stored session is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Storage for the session of the logged-in user
pub trait CredentialStore: Send + Sync {
    /// Load the stored session, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or holds garbage.
    fn load(&self) -> Result<Option<UserSession>, CredentialError>;

    /// Persist `session`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn save(&self, session: &UserSession) -> Result<(), CredentialError>;

    /// Forget the stored session
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be cleared.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// Session stored as JSON in a single file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store the session at `path`; parent directories are created on save
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the session is written to
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<UserSession>, CredentialError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session: UserSession = serde_json::from_str(&raw)?;
        // A session without token cannot authorize anything.
        Ok(session.has_token().then_some(session))
    }

    fn save(&self, session: &UserSession) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        tracing::debug!(path = %self.path.display(), "Session stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
