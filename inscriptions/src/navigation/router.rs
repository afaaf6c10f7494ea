//! Navigation pipeline: redirect records, guard, bounded redirect chains

use thiserror::Error;

use super::guard::{evaluate, AccessLevel, NavigationDecision, Notification};
use super::routes::Route;
use crate::registration::RegistrationState;
use crate::types::UserSession;

/// Navigation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Redirects kept bouncing without reaching an allowed route
    #[error("navigation to {target} did not settle after {hops} redirects")]
    RedirectLoop {
        /// Route originally requested
        target: Route,
        /// Redirects followed
        hops: usize,
    },
}

/// Where a navigation ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Route finally displayed
    pub route: Route,
    /// Notifications raised along the way
    pub notifications: Vec<Notification>,
}

impl NavigationOutcome {
    /// Whether the requested route was displayed unchanged
    #[must_use]
    pub fn reached(&self, target: Route) -> bool {
        self.route == target
    }
}

/// One entry of the navigation menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    /// Target route
    pub route: Route,
    /// Display label
    pub label: &'static str,
}

/// Tracks the current route and runs every navigation through the guard
#[derive(Debug, Clone, Default)]
pub struct Router {
    current: Option<Route>,
}

impl Router {
    /// Maximum redirects followed by one navigation
    pub const MAX_REDIRECTS: usize = 8;

    /// A router that has not displayed anything yet
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Route currently displayed
    #[must_use]
    pub const fn current(&self) -> Option<Route> {
        self.current
    }

    /// Navigate to `target`
    ///
    /// Redirect records are resolved first, then the guard decides. Guard
    /// redirects are followed until a route is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::RedirectLoop`] after
    /// [`Router::MAX_REDIRECTS`] redirects; the current route is unchanged.
    pub fn navigate(
        &mut self,
        target: Route,
        principal: Option<&UserSession>,
        session: &RegistrationState,
    ) -> Result<NavigationOutcome, NavigationError> {
        let mut next = target;
        let mut notifications = Vec::new();

        for _ in 0..=Self::MAX_REDIRECTS {
            let route = resolve_redirect_records(next);
            match evaluate(principal, route, session) {
                NavigationDecision::Allow => {
                    tracing::debug!(%target, %route, "Navigated");
                    self.current = Some(route);
                    return Ok(NavigationOutcome {
                        route,
                        notifications,
                    });
                },
                NavigationDecision::Redirect(redirect) => next = redirect,
                NavigationDecision::Abort {
                    notification,
                    redirect,
                } => {
                    tracing::info!(%route, summary = %notification.summary, "Navigation aborted");
                    notifications.push(notification);
                    next = redirect;
                },
            }
        }

        tracing::warn!(%target, "Redirect loop");
        Err(NavigationError::RedirectLoop {
            target,
            hops: Self::MAX_REDIRECTS,
        })
    }

    /// Menu entries visible to `principal`
    ///
    /// Administrator-only routes are hidden from everyone else; nothing is
    /// listed before login.
    #[must_use]
    pub fn menu(principal: Option<&UserSession>) -> Vec<MenuEntry> {
        let level = AccessLevel::of(principal);
        if level == AccessLevel::Unauthenticated {
            return Vec::new();
        }
        Route::ALL
            .into_iter()
            .filter(|route| level == AccessLevel::Admin || !route.is_super_only())
            .filter_map(|route| route.label().map(|label| MenuEntry { route, label }))
            .collect()
    }
}

fn resolve_redirect_records(mut route: Route) -> Route {
    // Redirect records never chain more than the route table has entries.
    for _ in 0..Route::ALL.len() {
        match route.redirect() {
            Some(next) => route = next,
            None => break,
        }
    }
    route
}
