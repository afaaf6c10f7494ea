//! Application-level errors

use inscripciones_runtime::StoreError;
use thiserror::Error;

use crate::api::ApiError;
use crate::export::ExportError;
use crate::navigation::NavigationError;
use crate::registration::RegistrationError;

/// Errors surfaced by [`crate::app::InscriptionsApp`]
#[derive(Error, Debug)]
pub enum AppError {
    /// A backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A store refused an action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Building or delivering an export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Navigation did not settle
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// The registration session refused an operation
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Login was rejected
    #[error("login failed: {0}")]
    Login(String),

    /// The operation needs a logged-in user
    #[error("not logged in")]
    NotAuthenticated,
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;
