//! # Inscripciones Testing
//!
//! Testing utilities for reducers and stores of the inscription workspace.
//!
//! This crate provides:
//! - [`FixedClock`] for deterministic timestamps and file names
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - [`effects::resolve`] to run the futures a reducer returned, without a store
//! - [`init_tracing`] to see `tracing` output in failing tests
//!
//! ## Example
//!
//! ```ignore
//! use inscripciones_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(RegistrationReducer::new())
//!     .with_env(test_environment())
//!     .given_state(RegistrationState::default())
//!     .when_action(RegistrationAction::AddAttendee { entry })
//!     .then_state(|state| assert_eq!(state.attendees.len(), 1))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use inscripciones_core::environment::Clock;


/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use inscripciones_testing::mocks::FixedClock;
    /// use inscripciones_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2024-05-01 12:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Helpers for driving effects outside of a store
pub mod effects {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use inscripciones_core::effect::Effect;

    /// Run every future contained in `effects` and collect the actions they yield
    ///
    /// Parallel groups are flattened in order; futures that yield `None` are
    /// skipped. Produced actions are *not* fed back into any reducer.
    pub async fn resolve<A: Send + 'static>(effects: impl IntoIterator<Item = Effect<A>>) -> Vec<A> {
        let mut actions = Vec::new();
        for effect in effects {
            actions.extend(resolve_one(effect).await);
        }
        actions
    }

    fn resolve_one<A: Send + 'static>(effect: Effect<A>) -> BoxFuture<'static, Vec<A>> {
        async move {
            match effect {
                Effect::None => Vec::new(),
                Effect::Future(fut) => fut.await.into_iter().collect(),
                Effect::Parallel(effects) => {
                    let mut actions = Vec::new();
                    for effect in effects {
                        actions.extend(resolve_one(effect).await);
                    }
                    actions
                },
            }
        }
        .boxed()
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Safe to call from every test; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
mod tests {
    use super::*;
    use inscripciones_core::effect::Effect;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().format("%Y-%m-%d").to_string(), "2024-05-01");
    }

    #[tokio::test]
    async fn resolve_collects_actions_from_nested_effects() {
        let effects = vec![
            Effect::None,
            Effect::future(async { Some(1) }),
            Effect::merge(vec![
                Effect::future(async { Some(2) }),
                Effect::future(async { None }),
                Effect::future(async { Some(3) }),
            ]),
        ];

        assert_eq!(effects::resolve(effects).await, vec![1, 2, 3]);
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
