//! The route table

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every page of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Landing page; always forwards to [`Route::NewRegister`]
    Home,
    /// Registration form
    NewRegister,
    /// Application settings
    Settings,
    /// Payment of the current registration session
    PayEvent,
    /// Stored inscriptions
    Inscriptions,
    /// User administration
    Users,
    /// Event administration
    Event,
    /// Payment concept administration
    Concepts,
    /// Login form
    Login,
}

impl Route {
    /// Every route, in menu order
    pub const ALL: [Self; 9] = [
        Self::Home,
        Self::NewRegister,
        Self::Inscriptions,
        Self::Users,
        Self::Settings,
        Self::Event,
        Self::Concepts,
        Self::PayEvent,
        Self::Login,
    ];

    /// Stable route name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::NewRegister => "newRegister",
            Self::Settings => "settings",
            Self::PayEvent => "payEvent",
            Self::Inscriptions => "inscriptions",
            Self::Users => "users",
            Self::Event => "event",
            Self::Concepts => "concepts",
            Self::Login => "login",
        }
    }

    /// URL path
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::NewRegister => "/register",
            Self::Settings => "/settings",
            Self::PayEvent => "/pay-event",
            Self::Inscriptions => "/inscriptions",
            Self::Users => "/users",
            Self::Event => "/event",
            Self::Concepts => "/concepts",
            Self::Login => "/login",
        }
    }

    /// Look a route up by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.name() == name)
    }

    /// Resolve a path; unknown paths land on [`Route::Home`]
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL
            .into_iter()
            .find(|route| route.path() == normalized)
            .unwrap_or(Self::Home)
    }

    /// Fixed redirect applied before any guard runs
    #[must_use]
    pub const fn redirect(self) -> Option<Self> {
        match self {
            Self::Home => Some(Self::NewRegister),
            _ => None,
        }
    }

    /// Menu label, for routes listed in the navigation menu
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::NewRegister => Some("Nueva Inscripción"),
            Self::Inscriptions => Some("Inscripciones"),
            Self::Users => Some("Usuarios"),
            Self::Settings => Some("Configuraciones"),
            _ => None,
        }
    }

    /// Routes only shown to administrators
    #[must_use]
    pub const fn is_super_only(self) -> bool {
        matches!(self, Self::Users | Self::Settings | Self::Event | Self::Concepts)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
