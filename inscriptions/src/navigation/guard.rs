//! Route access guard
//!
//! [`evaluate`] decides whether a navigation may proceed. It is a pure
//! function of the principal, the target route and the registration session,
//! so every rule can be checked without a router.

use serde::{Deserialize, Serialize};

use super::routes::Route;
use crate::registration::RegistrationState;
use crate::types::UserSession;

/// What a principal may see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    /// No session or a session without token
    Unauthenticated,
    /// Superuser or administrator profile: every route
    Admin,
    /// Any other authenticated user: registration pages only
    Limited,
}

impl AccessLevel {
    /// Derive the access level of a principal
    #[must_use]
    pub fn of(principal: Option<&UserSession>) -> Self {
        match principal {
            Some(session) if session.has_token() => {
                if session.user.is_admin() {
                    Self::Admin
                } else {
                    Self::Limited
                }
            },
            _ => Self::Unauthenticated,
        }
    }

    /// Whether this level may open `route`, ignoring session content
    #[must_use]
    pub fn permits(self, route: Route) -> bool {
        match self {
            Self::Unauthenticated => route == Route::Login,
            Self::Admin => route != Route::Login,
            Self::Limited => LIMITED_ROUTES.contains(&route),
        }
    }
}

/// Routes open to users without administrator rights
pub const LIMITED_ROUTES: [Route; 2] = [Route::NewRegister, Route::PayEvent];

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information
    Info,
    /// Operation succeeded
    Success,
    /// Something needs attention
    Warn,
    /// Operation refused or failed
    Error,
}

/// A message shown to the user when navigation is refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub severity: Severity,
    /// Short title
    pub summary: String,
    /// Detail text
    pub message: String,
}

impl Notification {
    /// An error notification
    #[must_use]
    pub fn error(summary: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            message: message.into(),
        }
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Proceed to the target
    Allow,
    /// Go somewhere else instead
    Redirect(Route),
    /// Refuse, tell the user why, then go somewhere else
    Abort {
        /// Message for the user
        notification: Notification,
        /// Where to go instead
        redirect: Route,
    },
}

/// Summary of the notification raised when paying an empty session
pub const EMPTY_PAYMENT_SUMMARY: &str = "Error al pagar";
/// Message of the notification raised when paying an empty session
pub const EMPTY_PAYMENT_MESSAGE: &str = "Agregue una persona al menos";

/// Decide whether `principal` may navigate to `target`
///
/// Rules, in order:
/// 1. without a token only [`Route::Login`] is open; everything else goes there
/// 2. a logged-in user asking for [`Route::Login`] is sent [`Route::Home`]
/// 3. administrators may open anything else
/// 4. limited users may open [`LIMITED_ROUTES`]; everything else goes home
/// 5. [`Route::PayEvent`] with an empty session is aborted back to the form
#[must_use]
pub fn evaluate(
    principal: Option<&UserSession>,
    target: Route,
    session: &RegistrationState,
) -> NavigationDecision {
    let level = AccessLevel::of(principal);

    if !level.permits(target) {
        let redirect = match level {
            AccessLevel::Unauthenticated => Route::Login,
            AccessLevel::Admin | AccessLevel::Limited => Route::Home,
        };
        tracing::debug!(%target, %redirect, ?level, "Navigation redirected");
        return NavigationDecision::Redirect(redirect);
    }

    if target == Route::PayEvent && session.require_non_empty().is_err() {
        tracing::debug!("Payment refused: session is empty");
        return NavigationDecision::Abort {
            notification: Notification::error(EMPTY_PAYMENT_SUMMARY, EMPTY_PAYMENT_MESSAGE),
            redirect: Route::NewRegister,
        };
    }

    NavigationDecision::Allow
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{admin_session, limited_session, superuser_session};
    use crate::types::AttendeeEntry;

    fn session_with_one() -> RegistrationState {
        let mut state = RegistrationState::new();
        state
            .add_attendee(AttendeeEntry::new("Ana", "Rojas", "1"))
            .unwrap();
        state
    }

    #[test]
    fn access_levels() {
        assert_eq!(AccessLevel::of(None), AccessLevel::Unauthenticated);
        assert_eq!(AccessLevel::of(Some(&admin_session())), AccessLevel::Admin);
        assert_eq!(AccessLevel::of(Some(&superuser_session())), AccessLevel::Admin);
        assert_eq!(AccessLevel::of(Some(&limited_session())), AccessLevel::Limited);

        let mut tokenless = admin_session();
        tokenless.token.clear();
        assert_eq!(AccessLevel::of(Some(&tokenless)), AccessLevel::Unauthenticated);
    }

    #[test]
    fn unauthenticated_goes_to_login() {
        let empty = RegistrationState::new();
        assert_eq!(evaluate(None, Route::Login, &empty), NavigationDecision::Allow);
        for route in Route::ALL.into_iter().filter(|r| *r != Route::Login) {
            assert_eq!(
                evaluate(None, route, &empty),
                NavigationDecision::Redirect(Route::Login)
            );
        }
    }

    #[test]
    fn logged_in_user_leaves_login_page() {
        let empty = RegistrationState::new();
        for principal in [admin_session(), limited_session()] {
            assert_eq!(
                evaluate(Some(&principal), Route::Login, &empty),
                NavigationDecision::Redirect(Route::Home)
            );
        }
    }

    #[test]
    fn admin_opens_everything() {
        let admin = superuser_session();
        let session = session_with_one();
        for route in Route::ALL.into_iter().filter(|r| *r != Route::Login) {
            assert_eq!(
                evaluate(Some(&admin), route, &session),
                NavigationDecision::Allow,
                "{route}"
            );
        }
    }

    #[test]
    fn limited_user_is_confined() {
        let user = limited_session();
        let session = session_with_one();
        assert_eq!(
            evaluate(Some(&user), Route::NewRegister, &session),
            NavigationDecision::Allow
        );
        assert_eq!(
            evaluate(Some(&user), Route::PayEvent, &session),
            NavigationDecision::Allow
        );
        for route in [Route::Users, Route::Inscriptions, Route::Settings, Route::Home] {
            assert_eq!(
                evaluate(Some(&user), route, &session),
                NavigationDecision::Redirect(Route::Home)
            );
        }
    }

    #[test]
    fn paying_an_empty_session_aborts() {
        for principal in [admin_session(), limited_session()] {
            let (notification, redirect) =
                match evaluate(Some(&principal), Route::PayEvent, &RegistrationState::new()) {
                    NavigationDecision::Abort {
                        notification,
                        redirect,
                    } => (notification, redirect),
                    other => unreachable!("expected abort, got {other:?}"),
                };
            assert_eq!(redirect, Route::NewRegister);
            assert_eq!(notification.severity, Severity::Error);
            assert_eq!(notification.summary, "Error al pagar");
            assert_eq!(notification.message, "Agregue una persona al menos");
        }
    }
}
