//! Configuration management for the inscription client.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A `.env` file in the working directory is honoured by the binary.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Session and login configuration
    pub auth: AuthConfig,
    /// Spreadsheet export configuration
    pub export: ExportConfig,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, without trailing endpoint
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Page size requested for catalogs and exports
    pub page_size: u32,
}

/// Session and login configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// File the authenticated session is persisted to
    pub credentials_path: PathBuf,
    /// Login name used when no session is stored
    pub username: Option<String>,
    /// Password used when no session is stored
    pub password: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("credentials_path", &self.credentials_path)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Spreadsheet export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory exported workbooks are written to
    pub output_dir: PathBuf,
    /// `strftime` pattern for the check-in column
    pub date_format: String,
}

/// Default backend URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
/// Default page size, large enough to fetch a catalog in one request
pub const DEFAULT_PAGE_SIZE: u32 = 666;
/// Default check-in date pattern (day/month/year)
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        Self {
            api: ApiConfig {
                base_url: non_empty("INSCRIPCIONES_API_URL")
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                timeout: Duration::from_secs(
                    parse(lookup("INSCRIPCIONES_API_TIMEOUT"))
                        .filter(|secs: &u64| *secs > 0)
                        .unwrap_or(30),
                ),
                page_size: parse(lookup("INSCRIPCIONES_PAGE_SIZE"))
                    .filter(|size: &u32| *size > 0)
                    .unwrap_or(DEFAULT_PAGE_SIZE),
            },
            auth: AuthConfig {
                credentials_path: non_empty("INSCRIPCIONES_CREDENTIALS_PATH")
                    .map_or_else(|| PathBuf::from(".inscripciones/session.json"), PathBuf::from),
                username: non_empty("INSCRIPCIONES_USERNAME"),
                password: non_empty("INSCRIPCIONES_PASSWORD"),
            },
            export: ExportConfig {
                output_dir: non_empty("INSCRIPCIONES_EXPORT_DIR")
                    .map_or_else(|| PathBuf::from("."), PathBuf::from),
                date_format: non_empty("INSCRIPCIONES_DATE_FORMAT")
                    .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
            },
            log_level: non_empty("RUST_LOG").unwrap_or_else(|| "inscripciones=info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|s| s.trim().parse().ok())
}
