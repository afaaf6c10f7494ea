//! Registration session manager
//!
//! Holds the attendees being registered together, prices them with the
//! selected rate and submits them as one payment group.

pub mod reducer;
pub mod state;

pub use reducer::{RegistrationAction, RegistrationEnvironment, RegistrationReducer};
pub use state::{RegistrationError, RegistrationState};
