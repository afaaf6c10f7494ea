//! Registration session state
//!
//! The session is the list of attendees being registered together, plus the
//! rate that prices them. All operations here are synchronous and pure; the
//! reducer in [`super::reducer`] wraps them into actions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::RegistrationReceipt;
use crate::types::{AttendeeEntry, Money, Rate};

/// Errors a registration session can report
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationError {
    /// A required attendee field is blank
    #[error("attendee field `{field}` is required")]
    Validation {
        /// Name of the blank field
        field: String,
    },

    /// Remove was asked for a position that does not exist
    #[error("no attendee at position {index} (session holds {len})")]
    OutOfRange {
        /// Requested position
        index: usize,
        /// Attendees in the session
        len: usize,
    },

    /// The session holds no attendee
    #[error("add at least one attendee")]
    EmptySession,

    /// No rate has been selected
    #[error("select a rate before submitting")]
    MissingRate,

    /// A submission is already in flight
    #[error("a submission is already in progress")]
    SubmissionInProgress,

    /// The backend rejected or never received the submission
    #[error("registration could not be submitted: {0}")]
    Submission(String),
}

/// The attendees currently being registered
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationState {
    /// Attendees in insertion order
    pub attendees: Vec<AttendeeEntry>,
    /// Rate applied to every attendee
    pub rate: Option<Rate>,
    /// Whether a submission is waiting for the backend
    pub submitting: bool,
    /// Receipt of the last successful submission
    pub last_receipt: Option<RegistrationReceipt>,
    /// Last error (for display)
    pub last_error: Option<RegistrationError>,
}

impl RegistrationState {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attendees
    #[must_use]
    pub fn len(&self) -> usize {
        self.attendees.len()
    }

    /// Whether no attendee has been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty()
    }

    /// Append an attendee after checking its required fields
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Validation`] naming the first blank
    /// required field; the session is left unchanged.
    pub fn add_attendee(&mut self, entry: AttendeeEntry) -> Result<(), RegistrationError> {
        if let Some(field) = entry.missing_required_field() {
            return Err(RegistrationError::Validation {
                field: field.to_string(),
            });
        }
        self.attendees.push(entry);
        Ok(())
    }

    /// Remove the attendee at `index`, preserving the order of the rest
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::OutOfRange`] if `index` is past the end.
    pub fn remove_attendee(&mut self, index: usize) -> Result<AttendeeEntry, RegistrationError> {
        if index >= self.attendees.len() {
            return Err(RegistrationError::OutOfRange {
                index,
                len: self.attendees.len(),
            });
        }
        Ok(self.attendees.remove(index))
    }

    /// Price of the session under `rate`: price times attendee count
    ///
    /// No rate means a zero total.
    #[must_use]
    pub fn compute_total(&self, rate: Option<&Rate>) -> Money {
        rate.map_or(Money::ZERO, |rate| {
            rate.price.saturating_mul(self.attendees.len() as u64)
        })
    }

    /// Price of the session under the selected rate
    #[must_use]
    pub fn total(&self) -> Money {
        self.compute_total(self.rate.as_ref())
    }

    /// Drop every attendee; the selected rate stays
    pub fn clear(&mut self) {
        self.attendees.clear();
    }

    /// Fail unless at least one attendee is present
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::EmptySession`] when no attendee was added.
    pub fn require_non_empty(&self) -> Result<(), RegistrationError> {
        if self.attendees.is_empty() {
            Err(RegistrationError::EmptySession)
        } else {
            Ok(())
        }
    }

    /// Price the session with `rate`
    pub fn select_rate(&mut self, rate: Rate) {
        self.rate = Some(rate);
    }

    /// Forget the selected rate
    pub fn clear_rate(&mut self) {
        self.rate = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::RateId;

    fn rate(price: &str) -> Rate {
        Rate {
            id: RateId::new(1),
            description: "General".into(),
            price: price.parse().unwrap(),
            active: true,
            selected: false,
        }
    }

    fn attendee(doc: &str) -> AttendeeEntry {
        AttendeeEntry::new("Ana", "Rojas", doc)
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut state = RegistrationState::new();
        state.add_attendee(attendee("1")).unwrap();
        state.add_attendee(attendee("2")).unwrap();
        let docs: Vec<_> = state.attendees.iter().map(|a| a.doc_num.as_str()).collect();
        assert_eq!(docs, ["1", "2"]);
    }

    #[test]
    fn add_rejects_blank_required_field() {
        let mut state = RegistrationState::new();
        let err = state.add_attendee(AttendeeEntry::new("Ana", "Rojas", "")).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Validation {
                field: "doc_num".into()
            }
        );
        assert!(state.is_empty());
    }

    #[test]
    fn remove_returns_entry_and_shifts_rest() {
        let mut state = RegistrationState::new();
        for doc in ["a", "b", "c"] {
            state.add_attendee(attendee(doc)).unwrap();
        }
        let removed = state.remove_attendee(1).unwrap();
        assert_eq!(removed.doc_num, "b");
        assert_eq!(state.attendees[1].doc_num, "c");
    }

    #[test]
    fn remove_out_of_range_leaves_session_alone() {
        let mut state = RegistrationState::new();
        state.add_attendee(attendee("a")).unwrap();
        assert_eq!(
            state.remove_attendee(1),
            Err(RegistrationError::OutOfRange { index: 1, len: 1 })
        );
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn totals() {
        let mut state = RegistrationState::new();
        assert_eq!(state.compute_total(Some(&rate("150.00"))), Money::ZERO);

        state.add_attendee(attendee("1")).unwrap();
        state.add_attendee(attendee("2")).unwrap();
        assert_eq!(state.compute_total(None), Money::ZERO);
        assert_eq!(state.compute_total(Some(&rate("150.50"))).to_string(), "301.00");

        assert_eq!(state.total(), Money::ZERO);
        state.select_rate(rate("80"));
        assert_eq!(state.total().to_string(), "160.00");
        state.clear_rate();
        assert_eq!(state.total(), Money::ZERO);
    }

    #[test]
    fn clear_keeps_rate() {
        let mut state = RegistrationState::new();
        state.select_rate(rate("10"));
        state.add_attendee(attendee("1")).unwrap();
        state.clear();
        assert!(state.is_empty());
        assert!(state.rate.is_some());
        assert_eq!(state.require_non_empty(), Err(RegistrationError::EmptySession));
    }
}
