//! Domain types for event inscriptions
//!
//! Wire shapes mirror the JSON returned by the inscription backend. String
//! fields the backend may send as `null` are normalised to empty strings.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Deserialize a nullable field into its `Default` value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw backend identifier
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// The raw backend identifier
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

backend_id!(
    /// Identifier of a [`Rate`]
    RateId
);
backend_id!(
    /// Identifier of a [`Church`]
    ChurchId
);
backend_id!(
    /// Identifier of a [`Kind`] (member type)
    KindId
);
backend_id!(
    /// Identifier of a [`DocumentType`]
    DocumentTypeId
);
backend_id!(
    /// Identifier of a [`PaymentMethod`]
    PaymentMethodId
);
backend_id!(
    /// Identifier of an [`Activity`]
    ActivityId
);
backend_id!(
    /// Identifier of a backend user
    UserId
);
backend_id!(
    /// Identifier of a user [`Profile`]
    ProfileId
);

// ============================================================================
// Money
// ============================================================================

/// Errors produced when parsing a [`Money`] amount
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The input was empty
    #[error("amount is empty")]
    Empty,

    /// The input was not a non-negative decimal number
    #[error("invalid amount: {0:?}")]
    Invalid(String),

    /// More than two significant decimal places
    #[error("amount {0:?} has more than two decimal places")]
    Precision(String),

    /// The amount does not fit in the cent counter
    #[error("amount {0:?} is too large")]
    Overflow(String),
}

/// A non-negative monetary amount stored in cents
///
/// The backend sends prices as decimal strings (`"150.00"`). They are parsed
/// exactly, so totals never pick up floating point drift.
///
/// ```
/// use inscripciones::types::Money;
///
/// let price: Money = "150.5".parse().unwrap();
/// assert_eq!(price.cents(), 15_050);
/// assert_eq!(price.to_string(), "150.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Amount in cents
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Multiply by a count, saturating at the largest representable amount
    #[must_use]
    pub const fn saturating_mul(self, count: u64) -> Self {
        Self(self.0.saturating_mul(count))
    }

    /// Add two amounts, saturating at the largest representable amount
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(MoneyError::Empty);
        }

        let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(MoneyError::Invalid(raw.to_string()));
        }

        // Trailing zeros carry no value: "1.500" is still 150 cents.
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > 2 {
            return Err(MoneyError::Precision(raw.to_string()));
        }

        let overflow = || MoneyError::Overflow(raw.to_string());
        let units: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let fraction_cents = fraction
            .bytes()
            .chain(std::iter::repeat(b'0'))
            .take(2)
            .fold(0_u64, |acc, digit| acc * 10 + u64::from(digit - b'0'));

        units
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction_cents))
            .map(Self)
            .ok_or_else(overflow)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Catalog entities
// ============================================================================

/// A priced rate ("tarifa") an attendee registers under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// Backend identifier
    pub id: RateId,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Price per attendee
    pub price: Money,
    /// Whether the rate is currently offered
    #[serde(default)]
    pub active: bool,
    /// Whether the rate is preselected in the registration form
    #[serde(default)]
    pub selected: bool,
}

/// A church an attendee belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Church {
    /// Backend identifier
    pub id: ChurchId,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Whether the church is selectable
    #[serde(default)]
    pub active: bool,
}

/// A member type ("kind")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind {
    /// Backend identifier
    pub id: KindId,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Whether the kind is selectable
    #[serde(default)]
    pub active: bool,
}

/// An identity document type (DNI, passport, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    /// Backend identifier
    pub id: DocumentTypeId,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Whether the type is selectable
    #[serde(default)]
    pub active: bool,
}

/// A way of paying for a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Backend identifier
    pub id: PaymentMethodId,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Icon name shown next to the method
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    /// Account number to transfer to, if any
    #[serde(default, deserialize_with = "null_as_default")]
    pub account: String,
    /// Whether the method is selectable
    #[serde(default)]
    pub active: bool,
}

/// Inscription options of an [`Activity`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InscriptionSettings {
    /// Addresses notified of new inscriptions
    #[serde(default, deserialize_with = "null_as_default")]
    pub emails: Vec<String>,
    /// Whether confirmation emails are sent
    #[serde(default)]
    pub send_email: bool,
    /// Whether rates are shown to the registering user
    #[serde(default)]
    pub show_tarifas: Option<bool>,
}

/// Settings attached to an [`Activity`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySettings {
    /// Inscription options
    #[serde(default, deserialize_with = "null_as_default")]
    pub inscription: InscriptionSettings,
}

/// An event people register for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Backend identifier
    pub id: ActivityId,
    /// Title
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Long description
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Venue
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    /// Start date as sent by the backend
    #[serde(default)]
    pub start_date: Option<String>,
    /// End date as sent by the backend
    #[serde(default)]
    pub end_date: Option<String>,
    /// Whether this is the activity currently open for inscriptions
    #[serde(default)]
    pub is_active: bool,
    /// Per-activity settings
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: ActivitySettings,
}

// ============================================================================
// Attendees
// ============================================================================

/// One person being registered in the current session
///
/// Names, last names and document number are required; everything else
/// may be filled in later by staff.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendeeEntry {
    /// Given names
    pub names: String,
    /// Last names
    pub lastnames: String,
    /// Identity document type
    pub documenttype: Option<DocumentTypeId>,
    /// Identity document number
    pub doc_num: String,
    /// Gender code as used by the backend
    pub gender: String,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Age in years
    pub age: Option<u32>,
    /// Birth date
    pub birthdate: Option<NaiveDate>,
    /// Member type
    pub kind: Option<KindId>,
    /// Church
    pub church: Option<ChurchId>,
}

impl AttendeeEntry {
    /// Create an entry with the required fields set
    #[must_use]
    pub fn new(
        names: impl Into<String>,
        lastnames: impl Into<String>,
        doc_num: impl Into<String>,
    ) -> Self {
        Self {
            names: names.into(),
            lastnames: lastnames.into(),
            doc_num: doc_num.into(),
            ..Self::default()
        }
    }

    /// Set the document type
    #[must_use]
    pub const fn with_document_type(mut self, documenttype: DocumentTypeId) -> Self {
        self.documenttype = Some(documenttype);
        self
    }

    /// Set gender
    #[must_use]
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    /// Set contact details
    #[must_use]
    pub fn with_contact(mut self, phone: impl Into<String>, email: impl Into<String>) -> Self {
        self.phone = phone.into();
        self.email = email.into();
        self
    }

    /// Set age
    #[must_use]
    pub const fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Set birth date
    #[must_use]
    pub const fn with_birthdate(mut self, birthdate: NaiveDate) -> Self {
        self.birthdate = Some(birthdate);
        self
    }

    /// Set member type
    #[must_use]
    pub const fn with_kind(mut self, kind: KindId) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set church
    #[must_use]
    pub const fn with_church(mut self, church: ChurchId) -> Self {
        self.church = Some(church);
        self
    }

    /// First required field that is blank, if any
    #[must_use]
    pub fn missing_required_field(&self) -> Option<&'static str> {
        [
            ("names", &self.names),
            ("lastnames", &self.lastnames),
            ("doc_num", &self.doc_num),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

// ============================================================================
// Inscription records (read side)
// ============================================================================

/// Person data attached to a stored inscription
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Person {
    /// Given names
    #[serde(default, deserialize_with = "null_as_default")]
    pub names: String,
    /// Last names
    #[serde(default, deserialize_with = "null_as_default")]
    pub lastnames: String,
    /// Identity document number
    #[serde(default, deserialize_with = "null_as_default")]
    pub doc_num: String,
    /// Gender code
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: String,
    /// Phone number
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    /// Email address
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Age in years
    #[serde(default)]
    pub age: Option<u32>,
    /// Member type name
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind_description: String,
    /// Church name
    #[serde(default, deserialize_with = "null_as_default")]
    pub church_description: String,
}

/// Payment group shared by the inscriptions paid together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InscriptionGroup {
    /// Voucher reference of the payment
    #[serde(default, deserialize_with = "null_as_default")]
    pub vouchergroup: String,
    /// Amount declared on the voucher, verbatim
    #[serde(default, deserialize_with = "null_as_default")]
    pub voucheramount: String,
    /// Payment method used
    pub paymentmethod: PaymentMethod,
    /// Rate paid
    #[serde(default)]
    pub tarifa: Option<Rate>,
    /// Activity the group registered for
    #[serde(default)]
    pub activity: Option<ActivityId>,
}

/// A stored inscription as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InscriptionRecord {
    /// Backend identifier
    pub id: u64,
    /// Amount paid, verbatim
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: String,
    /// The registered person
    pub person: Person,
    /// Payment group
    pub group: InscriptionGroup,
    /// Check-in timestamp, verbatim
    #[serde(default)]
    pub checkinat: Option<String>,
    /// Status code
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Status display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_description: String,
    /// Free text notes
    #[serde(default, deserialize_with = "null_as_default")]
    pub observations: String,
}

// ============================================================================
// Users
// ============================================================================

/// The logged-in backend user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier
    pub id: UserId,
    /// Login name
    pub username: String,
    /// Email address
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Given names
    #[serde(default, deserialize_with = "null_as_default")]
    pub names: String,
    /// Last name
    #[serde(default, deserialize_with = "null_as_default")]
    pub lastname: String,
    /// Full administrative rights
    #[serde(default)]
    pub is_superuser: bool,
    /// Staff flag
    #[serde(default)]
    pub is_staff: bool,
    /// Whether the account is enabled
    #[serde(default)]
    pub is_active: bool,
    /// Assigned profile
    #[serde(default)]
    pub profile: Option<ProfileId>,
    /// Assigned profile name
    #[serde(default)]
    pub profile_description: Option<String>,
}

/// Profile name granting full access
pub const ADMIN_PROFILE: &str = "ADMINISTRADOR";

impl User {
    /// Whether this user has full access to every page
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.profile_description.as_deref() == Some(ADMIN_PROFILE)
    }
}

/// An authenticated session: the user plus its API token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// Logged-in user
    pub user: User,
    /// Token sent as `Authorization: Token <token>`
    pub token: String,
}

impl UserSession {
    /// Whether the session carries a usable token
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

/// A user account as listed on the administration page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Backend identifier
    pub id: UserId,
    /// Login name
    pub username: String,
    /// Email address
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Given names
    #[serde(default, deserialize_with = "null_as_default")]
    pub names: String,
    /// Last name
    #[serde(default, deserialize_with = "null_as_default")]
    pub lastname: String,
    /// Whether the account is enabled
    #[serde(default)]
    pub is_active: bool,
    /// Assigned profile
    #[serde(default)]
    pub profile: Option<ProfileId>,
    /// Assigned profile name
    #[serde(default)]
    pub profile_description: Option<String>,
}

/// A permission profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Backend identifier
    pub id: ProfileId,
    /// Profile name
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Whether the profile can be assigned
    #[serde(default)]
    pub status: bool,
}
