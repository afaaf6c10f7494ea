//! Application context
//!
//! [`InscriptionsApp`] owns one store per concern and the router. It is the
//! only place where stores are combined: navigation reads the auth store and
//! the registration store, exports read the backend and the clock.

use std::sync::Arc;
use std::time::Duration;

use inscripciones_core::environment::Clock;
use inscripciones_runtime::Store;
use tokio::sync::Mutex;

use crate::api::{ApiClient, Credentials, InscriptionQuery, RegistrationReceipt};
use crate::auth::{AuthAction, AuthEnvironment, AuthReducer, AuthState, CredentialStore};
use crate::catalog::{CatalogAction, CatalogEnvironment, CatalogReducer, CatalogState};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::{AppError, Result};
use crate::export::{DeliveredExport, DownloadTrigger, ExportSettings, InscriptionExporter};
use crate::navigation::{NavigationOutcome, Route, Router};
use crate::registration::{
    RegistrationAction, RegistrationEnvironment, RegistrationReducer, RegistrationState,
};
use crate::types::{InscriptionRecord, PaymentMethodId, UserSession};

/// Store holding the authenticated session
pub type AuthStore = Store<AuthState, AuthAction, AuthEnvironment, AuthReducer>;

/// Store holding the reference catalogs
pub type CatalogStore = Store<CatalogState, CatalogAction, CatalogEnvironment, CatalogReducer>;

/// Store holding the registration session
pub type RegistrationStore =
    Store<RegistrationState, RegistrationAction, RegistrationEnvironment, RegistrationReducer>;

/// Collaborators the application is built from
#[derive(Clone)]
pub struct AppDependencies {
    /// Backend client
    pub api: Arc<dyn ApiClient>,
    /// Session persistence
    pub credentials: Arc<dyn CredentialStore>,
    /// Time source for export file names
    pub clock: Arc<dyn Clock>,
    /// Export rendering settings
    pub export: ExportSettings,
    /// Page size for inscription listings
    pub page_size: u32,
}

impl AppDependencies {
    /// Dependencies with default export settings and page size
    #[must_use]
    pub fn new(
        api: Arc<dyn ApiClient>,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            credentials,
            clock,
            export: ExportSettings::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Use `settings` for exports
    #[must_use]
    pub fn with_export_settings(mut self, settings: ExportSettings) -> Self {
        self.export = settings;
        self
    }

    /// Request `page_size` items per listing page
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// The inscription client
pub struct InscriptionsApp {
    api: Arc<dyn ApiClient>,
    auth: AuthStore,
    catalog: CatalogStore,
    registration: RegistrationStore,
    router: Mutex<Router>,
    exporter: InscriptionExporter,
    page_size: u32,
}

impl InscriptionsApp {
    /// Wire the stores around `deps`
    #[must_use]
    pub fn new(deps: AppDependencies) -> Self {
        let AppDependencies {
            api,
            credentials,
            clock,
            export,
            page_size,
        } = deps;

        Self {
            auth: Store::new(
                AuthState::default(),
                AuthReducer::new(),
                AuthEnvironment::new(Arc::clone(&api), credentials),
            ),
            catalog: Store::new(
                CatalogState::default(),
                CatalogReducer::new(),
                CatalogEnvironment::new(Arc::clone(&api)),
            ),
            registration: Store::new(
                RegistrationState::new(),
                RegistrationReducer::new(),
                RegistrationEnvironment::new(Arc::clone(&api)),
            ),
            router: Mutex::new(Router::new()),
            exporter: InscriptionExporter::new(export, clock),
            page_size,
            api,
        }
    }

    /// Authentication store
    #[must_use]
    pub const fn auth(&self) -> &AuthStore {
        &self.auth
    }

    /// Catalog store
    #[must_use]
    pub const fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Registration session store
    #[must_use]
    pub const fn registration(&self) -> &RegistrationStore {
        &self.registration
    }

    /// The logged-in session, if any
    pub async fn principal(&self) -> Option<UserSession> {
        self.auth.state(|s| s.principal().cloned()).await
    }

    /// Route currently displayed
    pub async fn current_route(&self) -> Option<Route> {
        self.router.lock().await.current()
    }

    /// Load the persisted session and install its token
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn restore_session(&self) -> Result<Option<UserSession>> {
        self.auth.send(AuthAction::Restore).await?.wait().await;
        Ok(self.principal().await)
    }

    /// Log in, persist the session and open the home page
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Login`] if the backend refused the credentials.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<UserSession> {
        let credentials = Credentials::new(username, password);
        self.auth
            .send(AuthAction::Login { credentials })
            .await?
            .wait()
            .await;

        let (principal, error) = self
            .auth
            .state(|s| (s.principal().cloned(), s.last_error.clone()))
            .await;
        let Some(session) = principal else {
            return Err(AppError::Login(
                error.unwrap_or_else(|| "no session returned".to_string()),
            ));
        };

        self.navigate(Route::Home).await?;
        Ok(session)
    }

    /// Drop the session everywhere and show the login page
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if a store is shutting down.
    pub async fn logout(&self) -> Result<()> {
        self.auth.send(AuthAction::Logout).await?.wait().await;
        self.registration
            .send(RegistrationAction::ClearSession)
            .await?
            .wait()
            .await;
        self.navigate(Route::Login).await?;
        Ok(())
    }

    /// Fetch every catalog and return the resulting state
    ///
    /// Individual catalog failures are recorded in the returned state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn load_catalogs(&self) -> Result<CatalogState> {
        self.catalog.send(CatalogAction::LoadAll).await?.wait().await;
        let state = self.catalog.state(Clone::clone).await;
        for (kind, error) in state.failures() {
            tracing::warn!(?kind, error, "Catalog unavailable");
        }
        Ok(state)
    }

    /// Apply a registration action and return the session afterwards
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn dispatch(&self, action: RegistrationAction) -> Result<RegistrationState> {
        self.registration.send(action).await?.wait().await;
        Ok(self.registration.state(Clone::clone).await)
    }

    /// Submit the registration session for the active activity
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Registration`] if the session was refused locally
    /// or by the backend.
    pub async fn submit_registration(
        &self,
        payment_method: PaymentMethodId,
        voucher: impl Into<String>,
    ) -> Result<RegistrationReceipt> {
        let activity = self.catalog.state(CatalogState::active_activity_id).await;
        let state = self
            .dispatch(RegistrationAction::Submit {
                payment_method,
                voucher: voucher.into(),
                activity,
            })
            .await?;

        match (state.last_error, state.last_receipt) {
            (Some(error), _) => Err(error.into()),
            (None, Some(receipt)) => Ok(receipt),
            (None, None) => Err(AppError::Registration(
                crate::registration::RegistrationError::Submission(
                    "no receipt returned".to_string(),
                ),
            )),
        }
    }

    /// Navigate to `target` through the guard
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Navigation`] if redirects do not settle.
    pub async fn navigate(&self, target: Route) -> Result<NavigationOutcome> {
        let principal = self.principal().await;
        let session = self.registration.state(Clone::clone).await;
        let outcome = self
            .router
            .lock()
            .await
            .navigate(target, principal.as_ref(), &session)?;
        Ok(outcome)
    }

    /// Fetch every page of inscriptions matching `search`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`] without a session, or the
    /// first failing page's [`AppError::Api`].
    #[tracing::instrument(skip(self))]
    pub async fn fetch_all_inscriptions(
        &self,
        search: Option<String>,
    ) -> Result<Vec<InscriptionRecord>> {
        if self.principal().await.is_none() {
            return Err(AppError::NotAuthenticated);
        }

        let mut query = InscriptionQuery::first(self.page_size).with_search(search);
        let mut records = Vec::new();
        loop {
            let page = self.api.inscriptions(&query).await?;
            let fetched = page.results.len();
            let more = page.has_next();
            records.extend(page.results);
            tracing::debug!(page = query.page, fetched, total = records.len(), "Inscription page");

            if !more || fetched == 0 {
                break;
            }
            query = query.next_page();
        }
        Ok(records)
    }

    /// Fetch all matching inscriptions and deliver them as a workbook
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`AppError::Export`] if the workbook cannot
    /// be built or delivered.
    pub async fn export_inscriptions(
        &self,
        search: Option<String>,
        trigger: &dyn DownloadTrigger,
    ) -> Result<DeliveredExport> {
        let records = self.fetch_all_inscriptions(search).await?;
        Ok(self.exporter.export(&records, trigger)?)
    }

    /// Stop every store, waiting up to `timeout` for each
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if effects are still running.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        self.auth.shutdown(timeout).await?;
        self.catalog.shutdown(timeout).await?;
        self.registration.shutdown(timeout).await?;
        Ok(())
    }
}
