//! Property tests for amounts and session totals

#![allow(clippy::unwrap_used, clippy::expect_used)]

use inscripciones::mocks::rate;
use inscripciones::registration::RegistrationState;
use inscripciones::types::{AttendeeEntry, Money};
use proptest::prelude::*;

proptest! {
    #[test]
    fn total_is_price_times_headcount(cents in 0_u64..10_000_000, count in 0_usize..40) {
        let mut state = RegistrationState::new();
        for i in 0..count {
            state
                .add_attendee(AttendeeEntry::new("Ana", "Rojas", i.to_string()))
                .unwrap();
        }
        let rate = rate(1, cents);

        prop_assert_eq!(
            state.compute_total(Some(&rate)).cents(),
            cents * count as u64
        );
        prop_assert_eq!(state.compute_total(None), Money::ZERO);
    }

    #[test]
    fn removing_an_attendee_lowers_total_by_one_price(
        cents in 1_u64..1_000_000,
        count in 1_usize..20,
        pick in any::<prop::sample::Index>(),
    ) {
        let mut state = RegistrationState::new();
        state.select_rate(rate(1, cents));
        for i in 0..count {
            state
                .add_attendee(AttendeeEntry::new("Ana", "Rojas", i.to_string()))
                .unwrap();
        }
        let before = state.total();

        state.remove_attendee(pick.index(count)).unwrap();

        prop_assert_eq!(before.cents() - state.total().cents(), cents);
        prop_assert_eq!(state.len(), count - 1);
    }

    #[test]
    fn display_parses_back(cents in any::<u64>()) {
        let money = Money::from_cents(cents);
        prop_assert_eq!(money.to_string().parse::<Money>().unwrap(), money);
    }

    #[test]
    fn whole_units_parse_to_hundreds(units in 0_u64..1_000_000_000) {
        prop_assert_eq!(units.to_string().parse::<Money>().unwrap().cents(), units * 100);
    }
}
