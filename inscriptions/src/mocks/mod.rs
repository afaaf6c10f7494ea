//! Test doubles and fixtures.
//!
//! In-memory implementations of the collaborator traits, plus builders for
//! the records tests need most often.

mod api;
mod credentials;
mod download;

pub use api::InMemoryApi;
pub use credentials::InMemoryCredentialStore;
pub use download::RecordingDownload;

use crate::types::{
    Activity, ActivityId, ActivitySettings, InscriptionGroup, InscriptionRecord, Money,
    PaymentMethod, PaymentMethodId, Person, Rate, RateId, User, UserId, UserSession, ADMIN_PROFILE,
};

fn user(id: u64, username: &str, profile: &str, is_superuser: bool) -> User {
    User {
        id: UserId::new(id),
        username: username.to_string(),
        email: format!("{username}@example.org"),
        names: username.to_string(),
        lastname: String::new(),
        is_superuser,
        is_staff: is_superuser,
        is_active: true,
        profile: None,
        profile_description: Some(profile.to_string()),
    }
}

/// Session of a user with the administrator profile
#[must_use]
pub fn admin_session() -> UserSession {
    UserSession {
        user: user(1, "admin", ADMIN_PROFILE, false),
        token: "admin-token".to_string(),
    }
}

/// Session of a superuser without the administrator profile
#[must_use]
pub fn superuser_session() -> UserSession {
    UserSession {
        user: user(2, "root", "REGISTRADOR", true),
        token: "root-token".to_string(),
    }
}

/// Session of a user limited to the registration pages
#[must_use]
pub fn limited_session() -> UserSession {
    UserSession {
        user: user(3, "registrar", "REGISTRADOR", false),
        token: "registrar-token".to_string(),
    }
}

/// An active rate
#[must_use]
pub fn rate(id: u64, cents: u64) -> Rate {
    Rate {
        id: RateId::new(id),
        description: format!("Tarifa {id}"),
        price: Money::from_cents(cents),
        active: true,
        selected: false,
    }
}

/// An activity without settings
#[must_use]
pub fn activity(id: u64, is_active: bool) -> Activity {
    Activity {
        id: ActivityId::new(id),
        title: format!("Retiro {id}"),
        description: String::new(),
        location: String::new(),
        start_date: None,
        end_date: None,
        is_active,
        settings: ActivitySettings::default(),
    }
}

/// An active payment method
#[must_use]
pub fn payment_method(id: u64, description: &str) -> PaymentMethod {
    PaymentMethod {
        id: PaymentMethodId::new(id),
        description: description.to_string(),
        icon: String::new(),
        account: String::new(),
        active: true,
    }
}

/// A paid inscription without check-in
#[must_use]
pub fn inscription(id: u64, names: &str, lastnames: &str) -> InscriptionRecord {
    InscriptionRecord {
        id,
        amount: "150.00".to_string(),
        person: Person {
            names: names.to_string(),
            lastnames: lastnames.to_string(),
            doc_num: format!("{id:08}"),
            gender: "F".to_string(),
            phone: "999888777".to_string(),
            email: format!("{}@example.org", names.to_lowercase()),
            age: Some(30),
            kind_description: "Miembro".to_string(),
            church_description: "Iglesia Central".to_string(),
        },
        group: InscriptionGroup {
            vouchergroup: format!("V-{id:04}"),
            voucheramount: "150.00".to_string(),
            paymentmethod: payment_method(1, "Transferencia"),
            tarifa: Some(rate(1, 15_000)),
            activity: Some(ActivityId::new(1)),
        },
        checkinat: None,
        status: "P".to_string(),
        status_description: "Pagado".to_string(),
        observations: String::new(),
    }
}
