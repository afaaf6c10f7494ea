//! Reference catalogs loaded from the backend
//!
//! Churches, document types, payment methods, activities, rates and member
//! types are fetched once after login and kept for the registration form.
//! Each catalog tracks its own [`LoadStatus`] so a failed request is visible
//! instead of looking like an empty list.

use std::sync::Arc;

use inscripciones_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::types::{Activity, ActivityId, Church, DocumentType, Kind, PaymentMethod, Rate};

/// Which catalog an action refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    /// Churches
    Churches,
    /// Identity document types
    DocumentTypes,
    /// Payment methods
    PaymentMethods,
    /// Activities
    Activities,
    /// Rates
    Rates,
    /// Member types
    Kinds,
}

impl CatalogKind {
    /// Every catalog, in load order
    pub const ALL: [Self; 6] = [
        Self::Churches,
        Self::DocumentTypes,
        Self::PaymentMethods,
        Self::Activities,
        Self::Rates,
        Self::Kinds,
    ];
}

/// Items fetched for one catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogPayload {
    /// Churches
    Churches(Vec<Church>),
    /// Identity document types
    DocumentTypes(Vec<DocumentType>),
    /// Payment methods
    PaymentMethods(Vec<PaymentMethod>),
    /// Activities
    Activities(Vec<Activity>),
    /// Rates
    Rates(Vec<Rate>),
    /// Member types
    Kinds(Vec<Kind>),
}

impl CatalogPayload {
    /// The catalog these items belong to
    #[must_use]
    pub const fn kind(&self) -> CatalogKind {
        match self {
            Self::Churches(_) => CatalogKind::Churches,
            Self::DocumentTypes(_) => CatalogKind::DocumentTypes,
            Self::PaymentMethods(_) => CatalogKind::PaymentMethods,
            Self::Activities(_) => CatalogKind::Activities,
            Self::Rates(_) => CatalogKind::Rates,
            Self::Kinds(_) => CatalogKind::Kinds,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Churches(items) => items.len(),
            Self::DocumentTypes(items) => items.len(),
            Self::PaymentMethods(items) => items.len(),
            Self::Activities(items) => items.len(),
            Self::Rates(items) => items.len(),
            Self::Kinds(items) => items.len(),
        }
    }
}

/// Load progress of a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Never requested
    #[default]
    NotLoaded,
    /// Request in flight
    Loading,
    /// Items are current
    Loaded,
    /// Last request failed; items are from the previous success, if any
    Failed(String),
}

/// One catalog and its load status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog<T> {
    /// Items from the last successful load
    pub items: Vec<T>,
    /// Load progress
    pub status: LoadStatus,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: LoadStatus::NotLoaded,
        }
    }
}

impl<T> Catalog<T> {
    fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.status = LoadStatus::Loaded;
    }
}

/// Every catalog the registration form needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    /// Churches
    pub churches: Catalog<Church>,
    /// Identity document types
    pub document_types: Catalog<DocumentType>,
    /// Payment methods
    pub payment_methods: Catalog<PaymentMethod>,
    /// Activities
    pub activities: Catalog<Activity>,
    /// Rates
    pub rates: Catalog<Rate>,
    /// Member types
    pub kinds: Catalog<Kind>,
}

impl CatalogState {
    /// Load status of one catalog
    #[must_use]
    pub const fn status(&self, kind: CatalogKind) -> &LoadStatus {
        match kind {
            CatalogKind::Churches => &self.churches.status,
            CatalogKind::DocumentTypes => &self.document_types.status,
            CatalogKind::PaymentMethods => &self.payment_methods.status,
            CatalogKind::Activities => &self.activities.status,
            CatalogKind::Rates => &self.rates.status,
            CatalogKind::Kinds => &self.kinds.status,
        }
    }

    fn status_mut(&mut self, kind: CatalogKind) -> &mut LoadStatus {
        match kind {
            CatalogKind::Churches => &mut self.churches.status,
            CatalogKind::DocumentTypes => &mut self.document_types.status,
            CatalogKind::PaymentMethods => &mut self.payment_methods.status,
            CatalogKind::Activities => &mut self.activities.status,
            CatalogKind::Rates => &mut self.rates.status,
            CatalogKind::Kinds => &mut self.kinds.status,
        }
    }

    fn apply(&mut self, payload: CatalogPayload) {
        match payload {
            CatalogPayload::Churches(items) => self.churches.replace(items),
            CatalogPayload::DocumentTypes(items) => self.document_types.replace(items),
            CatalogPayload::PaymentMethods(items) => self.payment_methods.replace(items),
            CatalogPayload::Activities(items) => self.activities.replace(items),
            CatalogPayload::Rates(items) => self.rates.replace(items),
            CatalogPayload::Kinds(items) => self.kinds.replace(items),
        }
    }

    /// Whether every catalog loaded successfully
    #[must_use]
    pub fn is_ready(&self) -> bool {
        CatalogKind::ALL
            .iter()
            .all(|kind| *self.status(*kind) == LoadStatus::Loaded)
    }

    /// Catalogs whose last load failed, with the error
    #[must_use]
    pub fn failures(&self) -> Vec<(CatalogKind, &str)> {
        CatalogKind::ALL
            .iter()
            .filter_map(|kind| match self.status(*kind) {
                LoadStatus::Failed(error) => Some((*kind, error.as_str())),
                _ => None,
            })
            .collect()
    }

    /// The activity currently open for inscriptions
    #[must_use]
    pub fn active_activity(&self) -> Option<&Activity> {
        self.activities.items.iter().find(|a| a.is_active)
    }

    /// Identifier of the active activity
    #[must_use]
    pub fn active_activity_id(&self) -> Option<ActivityId> {
        self.active_activity().map(|a| a.id)
    }

    /// Whether the active activity lets registering users pick a rate
    #[must_use]
    pub fn show_rates(&self) -> bool {
        self.active_activity()
            .and_then(|a| a.settings.inscription.show_tarifas)
            .unwrap_or(false)
    }

    /// Rates currently offered
    pub fn active_rates(&self) -> impl Iterator<Item = &Rate> {
        self.rates.items.iter().filter(|r| r.active)
    }
}

/// Catalog actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    /// Fetch every catalog
    LoadAll,
    /// Fetch one catalog
    Load(CatalogKind),
    /// A catalog arrived
    Loaded(CatalogPayload),
    /// A catalog request failed
    LoadFailed {
        /// The catalog requested
        kind: CatalogKind,
        /// Why it failed
        error: ApiError,
    },
}

/// Dependencies of the catalog reducer
#[derive(Clone)]
pub struct CatalogEnvironment {
    /// Backend client
    pub api: Arc<dyn ApiClient>,
}

impl CatalogEnvironment {
    /// Creates a new `CatalogEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self { api }
    }
}

/// Reducer for [`CatalogState`]
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load(state: &mut CatalogState, kind: CatalogKind, api: &Arc<dyn ApiClient>) -> Effect<CatalogAction> {
        *state.status_mut(kind) = LoadStatus::Loading;
        let api = Arc::clone(api);
        Effect::future(async move {
            Some(match fetch(api.as_ref(), kind).await {
                Ok(payload) => CatalogAction::Loaded(payload),
                Err(error) => CatalogAction::LoadFailed { kind, error },
            })
        })
    }
}

async fn fetch(api: &dyn ApiClient, kind: CatalogKind) -> ApiResult<CatalogPayload> {
    Ok(match kind {
        CatalogKind::Churches => CatalogPayload::Churches(api.churches().await?),
        CatalogKind::DocumentTypes => CatalogPayload::DocumentTypes(api.document_types().await?),
        CatalogKind::PaymentMethods => {
            CatalogPayload::PaymentMethods(api.payment_methods().await?)
        },
        CatalogKind::Activities => CatalogPayload::Activities(api.activities().await?),
        CatalogKind::Rates => CatalogPayload::Rates(api.rates().await?),
        CatalogKind::Kinds => CatalogPayload::Kinds(api.kinds().await?),
    })
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::LoadAll => {
                let loads = CatalogKind::ALL
                    .into_iter()
                    .map(|kind| Self::load(state, kind, &env.api))
                    .collect();
                smallvec![Effect::merge(loads)]
            },

            CatalogAction::Load(kind) => smallvec![Self::load(state, kind, &env.api)],

            CatalogAction::Loaded(payload) => {
                tracing::debug!(kind = ?payload.kind(), items = payload.len(), "Catalog loaded");
                state.apply(payload);
                SmallVec::new()
            },

            CatalogAction::LoadFailed { kind, error } => {
                tracing::warn!(?kind, %error, "Catalog failed to load");
                *state.status_mut(kind) = LoadStatus::Failed(error.to_string());
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::Endpoint;
    use crate::mocks::{self, InMemoryApi};
    use inscripciones_testing::{assertions, effects, ReducerTest};

    fn env() -> CatalogEnvironment {
        CatalogEnvironment::new(Arc::new(InMemoryApi::new()))
    }

    #[test]
    fn load_marks_loading_and_spawns_request() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(env())
            .given_state(CatalogState::default())
            .when_action(CatalogAction::Load(CatalogKind::Rates))
            .then_state(|state| {
                assert_eq!(*state.status(CatalogKind::Rates), LoadStatus::Loading);
                assert_eq!(*state.status(CatalogKind::Kinds), LoadStatus::NotLoaded);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn failure_keeps_previous_items() {
        let mut state = CatalogState::default();
        state.rates.replace(vec![mocks::rate(1, 10_000)]);

        ReducerTest::new(CatalogReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(CatalogAction::LoadFailed {
                kind: CatalogKind::Rates,
                error: ApiError::Transport("refused".into()),
            })
            .then_state(|state| {
                assert_eq!(state.rates.items.len(), 1);
                assert!(matches!(state.rates.status, LoadStatus::Failed(_)));
                assert_eq!(state.failures().len(), 1);
                assert!(!state.is_ready());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn loaded_with_empty_list_is_not_a_failure() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(env())
            .given_state(CatalogState::default())
            .when_action(CatalogAction::Loaded(CatalogPayload::Churches(Vec::new())))
            .then_state(|state| {
                assert_eq!(state.churches.status, LoadStatus::Loaded);
                assert!(state.failures().is_empty());
            })
            .run();
    }

    #[test]
    fn active_activity_and_rate_visibility() {
        let mut state = CatalogState::default();
        assert_eq!(state.active_activity_id(), None);
        assert!(!state.show_rates());

        let mut inactive = mocks::activity(1, false);
        inactive.settings.inscription.show_tarifas = Some(true);
        let active = mocks::activity(2, true);
        state.activities.replace(vec![inactive, active]);
        assert_eq!(state.active_activity_id(), Some(ActivityId::new(2)));
        assert!(!state.show_rates());

        state.activities.items[1].settings.inscription.show_tarifas = Some(true);
        assert!(state.show_rates());
    }

    #[test]
    fn active_rates_filters_inactive() {
        let mut state = CatalogState::default();
        let mut retired = mocks::rate(2, 5_000);
        retired.active = false;
        state.rates.replace(vec![mocks::rate(1, 10_000), retired]);
        assert_eq!(state.active_rates().count(), 1);
    }

    #[tokio::test]
    async fn load_all_fetches_every_catalog() {
        let api = Arc::new(
            InMemoryApi::new()
                .with_rates(vec![mocks::rate(1, 15_000)])
                .with_activities(vec![mocks::activity(3, true)])
                .failing(Endpoint::Church, ApiError::Unauthorized),
        );
        let env = CatalogEnvironment::new(api);
        let mut state = CatalogState::default();

        let produced =
            effects::resolve(CatalogReducer::new().reduce(&mut state, CatalogAction::LoadAll, &env))
                .await;
        assert!(CatalogKind::ALL
            .iter()
            .all(|kind| *state.status(*kind) == LoadStatus::Loading));
        assert_eq!(produced.len(), 6);

        for action in produced {
            let _ = CatalogReducer::new().reduce(&mut state, action, &env);
        }
        assert_eq!(state.rates.items.len(), 1);
        assert_eq!(state.active_activity_id(), Some(ActivityId::new(3)));
        assert_eq!(
            state.failures(),
            vec![(CatalogKind::Churches, ApiError::Unauthorized.to_string().as_str())]
        );
    }
}
