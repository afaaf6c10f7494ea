//! Routes, access rules and the navigation pipeline

pub mod guard;
pub mod router;
pub mod routes;

pub use guard::{evaluate, AccessLevel, NavigationDecision, Notification, Severity};
pub use router::{MenuEntry, NavigationError, NavigationOutcome, Router};
pub use routes::Route;
