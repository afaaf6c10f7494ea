//! Reducer for the registration session.

use std::sync::Arc;

use inscripciones_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use serde::{Deserialize, Serialize};

use super::state::{RegistrationError, RegistrationState};
use crate::api::{ApiClient, RegistrationReceipt, RegistrationSubmission};
use crate::types::{ActivityId, AttendeeEntry, PaymentMethodId, Rate};

/// Everything that can happen to a registration session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationAction {
    // Commands
    /// Append an attendee
    AddAttendee {
        /// The attendee to add
        entry: AttendeeEntry,
    },
    /// Remove the attendee at a position
    RemoveAttendee {
        /// Zero-based position
        index: usize,
    },
    /// Price the session with a rate
    SelectRate {
        /// The chosen rate
        rate: Rate,
    },
    /// Forget the selected rate
    ClearRate,
    /// Drop every attendee
    ClearSession,
    /// Send the session to the backend
    Submit {
        /// How the group paid
        payment_method: PaymentMethodId,
        /// Voucher reference of the payment
        voucher: String,
        /// Activity registered for
        activity: Option<ActivityId>,
    },

    // Results
    /// The backend accepted the registration
    RegistrationSubmitted {
        /// Backend acknowledgement
        receipt: RegistrationReceipt,
    },
    /// The backend rejected the registration or could not be reached
    SubmissionFailed {
        /// Error description
        error: String,
    },
}

/// Dependencies of the registration reducer
#[derive(Clone)]
pub struct RegistrationEnvironment {
    /// Backend client
    pub api: Arc<dyn ApiClient>,
}

impl RegistrationEnvironment {
    /// Creates a new `RegistrationEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self { api }
    }
}

/// Reducer for [`RegistrationState`]
#[derive(Clone, Debug, Default)]
pub struct RegistrationReducer;

impl RegistrationReducer {
    /// Creates a new `RegistrationReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `Submit` command and builds the request body
    fn validate_submit(
        state: &RegistrationState,
        payment_method: PaymentMethodId,
        voucher: String,
        activity: Option<ActivityId>,
    ) -> Result<RegistrationSubmission, RegistrationError> {
        if state.submitting {
            return Err(RegistrationError::SubmissionInProgress);
        }
        state.require_non_empty()?;
        let rate = state.rate.as_ref().ok_or(RegistrationError::MissingRate)?;

        Ok(RegistrationSubmission {
            activity,
            tarifa: rate.id,
            paymentmethod: payment_method,
            vouchergroup: voucher,
            amount: state.total(),
            people: state.attendees.clone(),
        })
    }

    fn record(state: &mut RegistrationState, result: Result<(), RegistrationError>) {
        state.last_error = result.err();
    }
}

impl Reducer for RegistrationReducer {
    type State = RegistrationState;
    type Action = RegistrationAction;
    type Environment = RegistrationEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RegistrationAction::AddAttendee { entry } => {
                let result = state.add_attendee(entry);
                Self::record(state, result);
                SmallVec::new()
            },

            RegistrationAction::RemoveAttendee { index } => {
                let result = state.remove_attendee(index).map(|_| ());
                Self::record(state, result);
                SmallVec::new()
            },

            RegistrationAction::SelectRate { rate } => {
                state.select_rate(rate);
                state.last_error = None;
                SmallVec::new()
            },

            RegistrationAction::ClearRate => {
                state.clear_rate();
                SmallVec::new()
            },

            RegistrationAction::ClearSession => {
                state.clear();
                state.last_error = None;
                SmallVec::new()
            },

            RegistrationAction::Submit {
                payment_method,
                voucher,
                activity,
            } => {
                let submission =
                    match Self::validate_submit(state, payment_method, voucher, activity) {
                        Ok(submission) => submission,
                        Err(error) => {
                            tracing::debug!(%error, "Submission refused");
                            state.last_error = Some(error);
                            return SmallVec::new();
                        },
                    };

                state.submitting = true;
                state.last_error = None;
                tracing::info!(
                    attendees = submission.people.len(),
                    amount = %submission.amount,
                    "Submitting registration"
                );

                let api = Arc::clone(&env.api);
                smallvec![Effect::future(async move {
                    Some(match api.submit_registration(&submission).await {
                        Ok(receipt) => RegistrationAction::RegistrationSubmitted { receipt },
                        Err(error) => RegistrationAction::SubmissionFailed {
                            error: error.to_string(),
                        },
                    })
                })]
            },

            RegistrationAction::RegistrationSubmitted { receipt } => {
                tracing::info!(group = receipt.id, "Registration accepted");
                state.submitting = false;
                state.clear();
                state.last_receipt = Some(receipt);
                state.last_error = None;
                SmallVec::new()
            },

            RegistrationAction::SubmissionFailed { error } => {
                tracing::warn!(%error, "Registration failed");
                state.submitting = false;
                state.last_error = Some(RegistrationError::Submission(error));
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::InMemoryApi;
    use crate::types::{Money, RateId};
    use inscripciones_testing::{assertions, effects, ReducerTest};

    fn env() -> RegistrationEnvironment {
        RegistrationEnvironment::new(Arc::new(InMemoryApi::new()))
    }

    fn rate() -> Rate {
        Rate {
            id: RateId::new(4),
            description: "General".into(),
            price: Money::from_cents(15_000),
            active: true,
            selected: false,
        }
    }

    fn with_attendees(count: usize) -> RegistrationState {
        let mut state = RegistrationState::new();
        for i in 0..count {
            state
                .add_attendee(AttendeeEntry::new("Ana", "Rojas", i.to_string()))
                .unwrap();
        }
        state
    }

    fn submit() -> RegistrationAction {
        RegistrationAction::Submit {
            payment_method: PaymentMethodId::new(1),
            voucher: "V-001".into(),
            activity: Some(ActivityId::new(7)),
        }
    }

    #[test]
    fn add_attendee_success() {
        ReducerTest::new(RegistrationReducer::new())
            .with_env(env())
            .given_state(RegistrationState::new())
            .when_action(RegistrationAction::AddAttendee {
                entry: AttendeeEntry::new("Luis", "Paz", "44"),
            })
            .then_state(|state| {
                assert_eq!(state.len(), 1);
                assert_eq!(state.last_error, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn invalid_attendee_sets_error() {
        ReducerTest::new(RegistrationReducer::new())
            .with_env(env())
            .given_state(RegistrationState::new())
            .when_action(RegistrationAction::AddAttendee {
                entry: AttendeeEntry::new("", "Paz", "44"),
            })
            .then_state(|state| {
                assert!(state.is_empty());
                assert_eq!(
                    state.last_error,
                    Some(RegistrationError::Validation {
                        field: "names".into()
                    })
                );
            })
            .run();
    }

    #[test]
    fn successful_command_clears_previous_error() {
        ReducerTest::new(RegistrationReducer::new())
            .with_env(env())
            .given_state(with_attendees(1))
            .when_actions([
                RegistrationAction::RemoveAttendee { index: 3 },
                RegistrationAction::RemoveAttendee { index: 0 },
            ])
            .then_state(|state| {
                assert!(state.is_empty());
                assert_eq!(state.last_error, None);
            })
            .run();
    }

    #[test]
    fn submit_empty_session_is_refused_without_effects() {
        ReducerTest::new(RegistrationReducer::new())
            .with_env(env())
            .given_state(RegistrationState::new())
            .when_actions([RegistrationAction::SelectRate { rate: rate() }, submit()])
            .then_state(|state| {
                assert!(!state.submitting);
                assert_eq!(state.last_error, Some(RegistrationError::EmptySession));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn submit_without_rate_is_refused() {
        ReducerTest::new(RegistrationReducer::new())
            .with_env(env())
            .given_state(with_attendees(2))
            .when_action(submit())
            .then_state(|state| {
                assert_eq!(state.last_error, Some(RegistrationError::MissingRate));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn submit_starts_request() {
        let mut state = with_attendees(2);
        state.select_rate(rate());

        ReducerTest::new(RegistrationReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(submit())
            .then_state(|state| assert!(state.submitting))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn second_submit_while_in_flight_is_refused() {
        let mut state = with_attendees(1);
        state.select_rate(rate());
        state.submitting = true;

        ReducerTest::new(RegistrationReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(submit())
            .then_state(|state| {
                assert_eq!(
                    state.last_error,
                    Some(RegistrationError::SubmissionInProgress)
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn accepted_submission_clears_attendees_and_keeps_rate() {
        let mut state = with_attendees(3);
        state.select_rate(rate());
        state.submitting = true;

        ReducerTest::new(RegistrationReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(RegistrationAction::RegistrationSubmitted {
                receipt: RegistrationReceipt {
                    id: 12,
                    vouchergroup: "V-001".into(),
                },
            })
            .then_state(|state| {
                assert!(state.is_empty());
                assert!(!state.submitting);
                assert!(state.rate.is_some());
                assert_eq!(state.last_receipt.as_ref().map(|r| r.id), Some(12));
            })
            .run();
    }

    #[test]
    fn failed_submission_keeps_attendees() {
        let mut state = with_attendees(2);
        state.submitting = true;

        ReducerTest::new(RegistrationReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(RegistrationAction::SubmissionFailed {
                error: "boom".into(),
            })
            .then_state(|state| {
                assert_eq!(state.len(), 2);
                assert!(!state.submitting);
                assert_eq!(
                    state.last_error,
                    Some(RegistrationError::Submission("boom".into()))
                );
            })
            .run();
    }

    #[tokio::test]
    async fn submit_effect_sends_priced_group() {
        let api = Arc::new(InMemoryApi::new());
        let env = RegistrationEnvironment::new(api.clone());
        let mut state = with_attendees(2);
        state.select_rate(rate());

        let produced =
            effects::resolve(RegistrationReducer::new().reduce(&mut state, submit(), &env)).await;

        assert!(matches!(
            produced.as_slice(),
            [RegistrationAction::RegistrationSubmitted { .. }]
        ));
        let submissions = api.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].amount.to_string(), "300.00");
        assert_eq!(submissions[0].tarifa, RateId::new(4));
        assert_eq!(submissions[0].vouchergroup, "V-001");
        assert_eq!(submissions[0].people.len(), 2);
    }
}
