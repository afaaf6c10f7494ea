//! Command-line entry point.
//!
//! Logs in (or reuses the stored session), opens the inscriptions page and
//! writes every inscription matching the optional first argument to an
//! `.xlsx` file in the configured output directory.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use inscripciones::api::HttpApiClient;
use inscripciones::auth::FileCredentialStore;
use inscripciones::export::{ExportSettings, SaveToDirectory};
use inscripciones::navigation::Route;
use inscripciones::{AppDependencies, Config, InscriptionsApp};
use inscripciones_core::environment::SystemClock;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(api = %config.api.base_url, "Configuration loaded");

    let api = Arc::new(HttpApiClient::new(&config.api).context("building HTTP client")?);
    let credentials = Arc::new(FileCredentialStore::new(&config.auth.credentials_path));
    let export = ExportSettings::new(&config.export.date_format)
        .context("invalid INSCRIPCIONES_DATE_FORMAT")?;

    let app = InscriptionsApp::new(
        AppDependencies::new(api, credentials, Arc::new(SystemClock))
            .with_export_settings(export)
            .with_page_size(config.api.page_size),
    );

    if app.restore_session().await?.is_none() {
        let (Some(username), Some(password)) = (&config.auth.username, &config.auth.password)
        else {
            bail!("no stored session and no credentials configured");
        };
        app.login(username, password).await?;
    }

    let outcome = app.navigate(Route::Inscriptions).await?;
    if !outcome.reached(Route::Inscriptions) {
        bail!("this account cannot open {}", Route::Inscriptions.path());
    }

    let search = std::env::args().nth(1);
    let trigger = SaveToDirectory::new(&config.export.output_dir);
    let delivered = app.export_inscriptions(search, &trigger).await?;
    info!(
        rows = delivered.rows,
        file = %delivered.location.display(),
        "Inscriptions exported"
    );

    app.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
