//! # Inscripciones Core
//!
//! Shared abstractions for the inscription workspace.
//!
//! Every stateful concern of the application (the registration session, the
//! catalogs loaded from the backend, the authenticated user) is modelled as a
//! reducer over an explicit state value:
//!
//! - **State**: owned, `Clone`-able data for one concern
//! - **Action**: every input that can change that state (user intents and results)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: description of a side effect, executed by the runtime store
//! - **Environment**: injected collaborators (API client, clock, storage)
//!
//! ## Example
//!
//! ```
//! use inscripciones_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct HeadcountState {
//!     attendees: usize,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum HeadcountAction {
//!     Add,
//!     Reset,
//! }
//!
//! struct HeadcountReducer;
//!
//! impl Reducer for HeadcountReducer {
//!     type State = HeadcountState;
//!     type Action = HeadcountAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut HeadcountState,
//!         action: HeadcountAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<HeadcountAction>; 4]> {
//!         match action {
//!             HeadcountAction::Add => state.attendees += 1,
//!             HeadcountAction::Reset => state.attendees = 0,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut state = HeadcountState::default();
//! let effects = HeadcountReducer.reduce(&mut state, HeadcountAction::Add, &());
//! assert_eq!(state.attendees, 1);
//! assert!(effects.is_empty());
//! ```

// Re-export commonly used types
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - the core trait for state transitions
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They hold all the decision logic and never perform I/O themselves.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed by the store
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values, not execution. Reducers return them and the runtime
/// store decides when and where they run.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation into an effect
        pub fn future<F>(future: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(future))
        }

        /// Combine effects to run concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Returns `true` for [`Effect::None`] and for empty parallel groups
        #[must_use]
        pub fn is_noop(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) => effects.iter().all(Effect::is_noop),
                Effect::Future(_) => false,
            }
        }
    }
}

/// Environment module - dependency injection traits
///
/// External dependencies are abstracted behind traits and injected via the
/// `Environment` parameter of each reducer.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// System clock backed by [`Utc::now`]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[test]
    fn none_and_empty_parallel_are_noops() {
        assert!(Effect::<()>::None.is_noop());
        assert!(Effect::<()>::merge(vec![Effect::None, Effect::None]).is_noop());
    }

    #[test]
    fn future_effect_is_not_a_noop() {
        let effect = Effect::future(async { Some(1_u8) });
        assert!(!effect.is_noop());
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }

    #[tokio::test]
    async fn future_effect_yields_its_action() {
        let Effect::Future(fut) = Effect::future(async { Some("loaded") }) else {
            unreachable!("constructor always builds a future effect");
        };
        assert_eq!(fut.await, Some("loaded"));
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
