//! Backend API seam
//!
//! [`ApiClient`] is the only way the application talks to the inscription
//! backend. [`HttpApiClient`] is the real implementation; tests use
//! [`crate::mocks::InMemoryApi`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    Activity, ActivityId, AttendeeEntry, Church, DocumentType, InscriptionRecord, Kind, Money,
    PaymentMethod, PaymentMethodId, Profile, Rate, RateId, UserAccount, UserSession,
};

mod http;

pub use http::HttpApiClient;

/// Errors returned by the backend API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never got a response (DNS, connect, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// The token is missing, expired or lacks permission (401/403)
    #[error("not authorized")]
    Unauthorized,

    /// Any other non-success status
    #[error("backend returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the caller should drop its session and log in again
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Backend endpoints, relative to the API base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Church catalog (paginated)
    Church,
    /// Document type catalog (paginated)
    DocumentType,
    /// Payment method catalog (paginated)
    PaymentMethod,
    /// Activities (plain list)
    Activity,
    /// Rates (paginated)
    Tarifa,
    /// Member types (plain list)
    Kind,
    /// Permission profiles (plain list)
    Profile,
    /// User accounts (paginated)
    Users,
    /// Stored inscriptions (paginated, searchable)
    Inscription,
    /// Token login
    Login,
    /// Group registration
    Register,
}

impl Endpoint {
    /// Path segment appended to the base URL
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Church => "church",
            Self::DocumentType => "documentType",
            Self::PaymentMethod => "paymentMethod",
            Self::Activity => "activity",
            Self::Tarifa => "tarifa",
            Self::Kind => "kind",
            Self::Profile => "profile",
            Self::Users => "users",
            Self::Inscription => "inscription",
            Self::Login => "login",
            Self::Register => "inscription/register",
        }
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages
    #[serde(default)]
    pub count: Option<u64>,
    /// URL of the next page, if any
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page, if any
    #[serde(default)]
    pub previous: Option<String>,
    /// Items on this page
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// A single page holding every item
    #[must_use]
    pub fn complete(results: Vec<T>) -> Self {
        Self {
            count: Some(results.len() as u64),
            next: None,
            previous: None,
            results,
        }
    }

    /// Whether the backend reports more pages after this one
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Query for the inscription listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionQuery {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
    /// Free-text filter
    pub search: Option<String>,
}

impl InscriptionQuery {
    /// First page with the given size and no filter
    #[must_use]
    pub const fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            search: None,
        }
    }

    /// Add a search filter; blank input clears it
    #[must_use]
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }

    /// The same query, one page further
    #[must_use]
    pub fn next_page(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }
}

/// Login credentials
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Build credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a group registration request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationSubmission {
    /// Activity registered for
    pub activity: Option<ActivityId>,
    /// Rate applied to every attendee
    pub tarifa: RateId,
    /// Payment method
    pub paymentmethod: PaymentMethodId,
    /// Voucher reference of the payment
    pub vouchergroup: String,
    /// Total amount for the group
    pub amount: Money,
    /// Attendees registered together
    pub people: Vec<AttendeeEntry>,
}

/// Backend acknowledgement of a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    /// Identifier of the created payment group
    pub id: u64,
    /// Voucher reference recorded by the backend
    #[serde(default)]
    pub vouchergroup: String,
}

/// Access to the inscription backend
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Install or remove the token sent with every request
    fn set_token(&self, token: Option<String>);

    /// Churches
    async fn churches(&self) -> ApiResult<Vec<Church>>;

    /// Identity document types
    async fn document_types(&self) -> ApiResult<Vec<DocumentType>>;

    /// Payment methods
    async fn payment_methods(&self) -> ApiResult<Vec<PaymentMethod>>;

    /// Activities
    async fn activities(&self) -> ApiResult<Vec<Activity>>;

    /// Rates
    async fn rates(&self) -> ApiResult<Vec<Rate>>;

    /// Member types
    async fn kinds(&self) -> ApiResult<Vec<Kind>>;

    /// Permission profiles
    async fn profiles(&self) -> ApiResult<Vec<Profile>>;

    /// One page of user accounts
    async fn users(&self, page: u32) -> ApiResult<Page<UserAccount>>;

    /// One page of stored inscriptions
    async fn inscriptions(&self, query: &InscriptionQuery) -> ApiResult<Page<InscriptionRecord>>;

    /// Exchange credentials for a session
    async fn login(&self, credentials: &Credentials) -> ApiResult<UserSession>;

    /// Register a group of attendees
    async fn submit_registration(
        &self,
        submission: &RegistrationSubmission,
    ) -> ApiResult<RegistrationReceipt>;
}
