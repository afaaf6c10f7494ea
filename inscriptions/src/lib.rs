//! # Inscripciones
//!
//! Client for an event registration backend. Visitors register attendees for
//! the active event and pay one fee for the whole group; administrators browse
//! and export the inscriptions.
//!
//! # Architecture
//!
//! ```text
//!  ┌────────────┐   ┌──────────────┐   ┌────────────────┐
//!  │ AuthStore  │   │ CatalogStore │   │ RegistrationSt.│
//!  └─────┬──────┘   └──────┬───────┘   └───────┬────────┘
//!        │ principal       │ active activity   │ attendees
//!        ▼                 ▼                   ▼
//!  ┌─────────────────────────────────────────────────────┐
//!  │              InscriptionsApp (router, export)       │
//!  └─────────────────────────┬───────────────────────────┘
//!                            │
//!                       ApiClient (HTTP)
//! ```
//!
//! - [`registration`]: the attendee list, its total and the submission
//! - [`navigation`]: route table, access guard and redirect handling
//! - [`export`]: the `.xlsx` inscription report
//! - [`auth`]: login, logout and the persisted session
//! - [`catalog`]: reference data offered by the registration form
//!
//! Every side effect goes through a trait ([`api::ApiClient`],
//! [`auth::CredentialStore`], [`export::DownloadTrigger`]) so the [`mocks`]
//! module can stand in for the backend in tests.

#![forbid(unsafe_code)]

pub mod api;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod mocks;
pub mod navigation;
pub mod registration;
pub mod types;

pub use app::{AppDependencies, InscriptionsApp};
pub use config::Config;
pub use error::{AppError, Result};
