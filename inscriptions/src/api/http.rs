//! HTTP implementation of [`ApiClient`]

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    ApiClient, ApiError, ApiResult, Credentials, Endpoint, InscriptionQuery, Page,
    RegistrationReceipt, RegistrationSubmission,
};
use crate::config::ApiConfig;
use crate::types::{
    Activity, Church, DocumentType, InscriptionRecord, Kind, PaymentMethod, Profile, Rate,
    UserAccount, UserSession,
};

/// Backend client over `reqwest`
///
/// Cloning is cheap and clones share the installed token.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    page_size: u32,
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("authorized", &self.current_token().is_some())
            .finish_non_exhaustive()
    }
}

impl HttpApiClient {
    /// Create a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    fn current_token(&self) -> Option<String> {
        match self.token.read() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.current_token() {
            Some(token) => request.header(AUTHORIZATION, format!("Token {token}")),
            None => request,
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(endpoint = endpoint.path()))]
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let response = self
            .authorized(self.client.get(self.url(endpoint)))
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode(endpoint, response).await
    }

    #[tracing::instrument(level = "debug", skip_all, fields(endpoint = endpoint.path()))]
    async fn post<B, T>(&self, endpoint: Endpoint, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .authorized(self.client.post(self.url(endpoint)))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode(endpoint, response).await
    }

    /// Fetch a catalog served as a single large page
    async fn catalog<T: DeserializeOwned>(&self, endpoint: Endpoint) -> ApiResult<Vec<T>> {
        let page: Page<T> = self
            .get(endpoint, &[("page_size", self.page_size.to_string())])
            .await?;
        Ok(page.results)
    }
}

async fn decode<T: DeserializeOwned>(endpoint: Endpoint, response: Response) -> ApiResult<T> {
    match response.status() {
        status if status.is_success() => response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            tracing::warn!(endpoint = endpoint.path(), "Request rejected as unauthorized");
            Err(ApiError::Unauthorized)
        },
        status => {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint = endpoint.path(), status = status.as_u16(), "Request failed");
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        },
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut slot) => *slot = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    async fn churches(&self) -> ApiResult<Vec<Church>> {
        self.catalog(Endpoint::Church).await
    }

    async fn document_types(&self) -> ApiResult<Vec<DocumentType>> {
        self.catalog(Endpoint::DocumentType).await
    }

    async fn payment_methods(&self) -> ApiResult<Vec<PaymentMethod>> {
        self.catalog(Endpoint::PaymentMethod).await
    }

    async fn activities(&self) -> ApiResult<Vec<Activity>> {
        self.get(Endpoint::Activity, &[]).await
    }

    async fn rates(&self) -> ApiResult<Vec<Rate>> {
        self.catalog(Endpoint::Tarifa).await
    }

    async fn kinds(&self) -> ApiResult<Vec<Kind>> {
        self.get(Endpoint::Kind, &[]).await
    }

    async fn profiles(&self) -> ApiResult<Vec<Profile>> {
        self.get(Endpoint::Profile, &[]).await
    }

    async fn users(&self, page: u32) -> ApiResult<Page<UserAccount>> {
        self.get(Endpoint::Users, &[("page", page.to_string())]).await
    }

    async fn inscriptions(&self, query: &InscriptionQuery) -> ApiResult<Page<InscriptionRecord>> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        self.get(Endpoint::Inscription, &params).await
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<UserSession> {
        self.post(Endpoint::Login, credentials).await
    }

    async fn submit_registration(
        &self,
        submission: &RegistrationSubmission,
    ) -> ApiResult<RegistrationReceipt> {
        self.post(Endpoint::Register, submission).await
    }
}
