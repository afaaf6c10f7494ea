//! In-memory backend

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::api::{
    ApiClient, ApiError, ApiResult, Credentials, Endpoint, InscriptionQuery, Page,
    RegistrationReceipt, RegistrationSubmission,
};
use crate::types::{
    Activity, Church, DocumentType, InscriptionRecord, Kind, PaymentMethod, Profile, Rate,
    UserAccount, UserSession,
};

const USERS_PAGE_SIZE: usize = 10;

#[derive(Debug, Default)]
struct Backend {
    churches: Vec<Church>,
    document_types: Vec<DocumentType>,
    payment_methods: Vec<PaymentMethod>,
    activities: Vec<Activity>,
    rates: Vec<Rate>,
    kinds: Vec<Kind>,
    profiles: Vec<Profile>,
    users: Vec<UserAccount>,
    inscriptions: Vec<InscriptionRecord>,
    accounts: Vec<(String, String, UserSession)>,
    failures: HashMap<Endpoint, ApiError>,
    submissions: Vec<RegistrationSubmission>,
    requests: Vec<Endpoint>,
    token: Option<String>,
    require_token: bool,
}

/// Backend double holding canned data
///
/// Every call is recorded. Failures can be injected per endpoint with
/// [`InMemoryApi::failing`].
#[derive(Debug, Default)]
pub struct InMemoryApi {
    backend: Mutex<Backend>,
}

impl InMemoryApi {
    /// An empty backend that accepts every request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with(self, update: impl FnOnce(&mut Backend)) -> Self {
        update(&mut self.lock());
        self
    }

    /// Serve these churches
    #[must_use]
    pub fn with_churches(self, items: Vec<Church>) -> Self {
        self.with(|b| b.churches = items)
    }

    /// Serve these document types
    #[must_use]
    pub fn with_document_types(self, items: Vec<DocumentType>) -> Self {
        self.with(|b| b.document_types = items)
    }

    /// Serve these payment methods
    #[must_use]
    pub fn with_payment_methods(self, items: Vec<PaymentMethod>) -> Self {
        self.with(|b| b.payment_methods = items)
    }

    /// Serve these activities
    #[must_use]
    pub fn with_activities(self, items: Vec<Activity>) -> Self {
        self.with(|b| b.activities = items)
    }

    /// Serve these rates
    #[must_use]
    pub fn with_rates(self, items: Vec<Rate>) -> Self {
        self.with(|b| b.rates = items)
    }

    /// Serve these member types
    #[must_use]
    pub fn with_kinds(self, items: Vec<Kind>) -> Self {
        self.with(|b| b.kinds = items)
    }

    /// Serve these profiles
    #[must_use]
    pub fn with_profiles(self, items: Vec<Profile>) -> Self {
        self.with(|b| b.profiles = items)
    }

    /// Serve these user accounts
    #[must_use]
    pub fn with_users(self, items: Vec<UserAccount>) -> Self {
        self.with(|b| b.users = items)
    }

    /// Serve these inscriptions
    #[must_use]
    pub fn with_inscriptions(self, items: Vec<InscriptionRecord>) -> Self {
        self.with(|b| b.inscriptions = items)
    }

    /// Accept `username`/`password` and answer with `session`
    #[must_use]
    pub fn with_account(
        self,
        username: impl Into<String>,
        password: impl Into<String>,
        session: UserSession,
    ) -> Self {
        let (username, password) = (username.into(), password.into());
        self.with(|b| b.accounts.push((username, password, session)))
    }

    /// Answer every call to `endpoint` with `error`
    #[must_use]
    pub fn failing(self, endpoint: Endpoint, error: ApiError) -> Self {
        self.with(|b| {
            b.failures.insert(endpoint, error);
        })
    }

    /// Reject calls other than login while no token is installed
    #[must_use]
    pub fn requiring_token(self) -> Self {
        self.with(|b| b.require_token = true)
    }

    /// Stop failing calls to `endpoint`
    pub fn recover(&self, endpoint: Endpoint) {
        self.lock().failures.remove(&endpoint);
    }

    /// Token currently installed
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    /// Registrations received so far
    #[must_use]
    pub fn submissions(&self) -> Vec<RegistrationSubmission> {
        self.lock().submissions.clone()
    }

    /// Endpoints called so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<Endpoint> {
        self.lock().requests.clone()
    }

    /// Number of calls made to `endpoint`
    #[must_use]
    pub fn request_count(&self, endpoint: Endpoint) -> usize {
        self.lock().requests.iter().filter(|e| **e == endpoint).count()
    }

    fn respond<T>(&self, endpoint: Endpoint, answer: impl FnOnce(&mut Backend) -> ApiResult<T>) -> ApiResult<T> {
        let mut backend = self.lock();
        backend.requests.push(endpoint);
        if let Some(error) = backend.failures.get(&endpoint) {
            return Err(error.clone());
        }
        if backend.require_token && endpoint != Endpoint::Login && backend.token.is_none() {
            return Err(ApiError::Unauthorized);
        }
        answer(&mut backend)
    }
}

fn matches_search(record: &InscriptionRecord, search: &str) -> bool {
    let needle = search.to_lowercase();
    [
        &record.person.names,
        &record.person.lastnames,
        &record.person.doc_num,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

fn paginate<T: Clone>(items: &[T], page: u32, page_size: usize, path: &str) -> Page<T> {
    let page_size = page_size.max(1);
    let page_index = usize::try_from(page.max(1) - 1).unwrap_or(usize::MAX);
    let start = page_index.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    Page {
        count: Some(items.len() as u64),
        next: (end < items.len()).then(|| format!("{path}?page={}", page.saturating_add(1))),
        previous: (page > 1).then(|| format!("{path}?page={}", page - 1)),
        results: items[start..end].to_vec(),
    }
}

#[async_trait]
impl ApiClient for InMemoryApi {
    fn set_token(&self, token: Option<String>) {
        self.lock().token = token;
    }

    async fn churches(&self) -> ApiResult<Vec<Church>> {
        self.respond(Endpoint::Church, |b| Ok(b.churches.clone()))
    }

    async fn document_types(&self) -> ApiResult<Vec<DocumentType>> {
        self.respond(Endpoint::DocumentType, |b| Ok(b.document_types.clone()))
    }

    async fn payment_methods(&self) -> ApiResult<Vec<PaymentMethod>> {
        self.respond(Endpoint::PaymentMethod, |b| Ok(b.payment_methods.clone()))
    }

    async fn activities(&self) -> ApiResult<Vec<Activity>> {
        self.respond(Endpoint::Activity, |b| Ok(b.activities.clone()))
    }

    async fn rates(&self) -> ApiResult<Vec<Rate>> {
        self.respond(Endpoint::Tarifa, |b| Ok(b.rates.clone()))
    }

    async fn kinds(&self) -> ApiResult<Vec<Kind>> {
        self.respond(Endpoint::Kind, |b| Ok(b.kinds.clone()))
    }

    async fn profiles(&self) -> ApiResult<Vec<Profile>> {
        self.respond(Endpoint::Profile, |b| Ok(b.profiles.clone()))
    }

    async fn users(&self, page: u32) -> ApiResult<Page<UserAccount>> {
        self.respond(Endpoint::Users, |b| {
            Ok(paginate(&b.users, page, USERS_PAGE_SIZE, Endpoint::Users.path()))
        })
    }

    async fn inscriptions(&self, query: &InscriptionQuery) -> ApiResult<Page<InscriptionRecord>> {
        self.respond(Endpoint::Inscription, |b| {
            let matching: Vec<_> = b
                .inscriptions
                .iter()
                .filter(|r| query.search.as_deref().is_none_or(|s| matches_search(r, s)))
                .cloned()
                .collect();
            let page_size = usize::try_from(query.page_size).unwrap_or(usize::MAX);
            Ok(paginate(&matching, query.page, page_size, Endpoint::Inscription.path()))
        })
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<UserSession> {
        self.respond(Endpoint::Login, |b| {
            b.accounts
                .iter()
                .find(|(user, pass, _)| *user == credentials.username && *pass == credentials.password)
                .map(|(_, _, session)| session.clone())
                .ok_or(ApiError::Unauthorized)
        })
    }

    async fn submit_registration(
        &self,
        submission: &RegistrationSubmission,
    ) -> ApiResult<RegistrationReceipt> {
        self.respond(Endpoint::Register, |b| {
            b.submissions.push(submission.clone());
            Ok(RegistrationReceipt {
                id: b.submissions.len() as u64,
                vouchergroup: submission.vouchergroup.clone(),
            })
        })
    }
}
