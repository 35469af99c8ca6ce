//! # Car Catalog
//!
//! Terminal client for a hosted vehicle catalog. Users sign up and sign in
//! against a Cognito user pool, then list, create, edit and delete vehicle
//! records through the catalog API using their identity token.
//!
//! ## Architecture
//! - `config`: environment and command-line settings
//! - `api`: authenticated JSON client, catalog routes and `/config` bootstrap
//! - `auth`: identity provider, session persistence and renewal
//! - `store`: client-side cache of the catalog
//! - `routes`: screen locations and the session guard
//! - `views`: per-screen state and messages
//! - `app`: the interactive prompt loop
//!
//! ## Environment Setup
//! Settings may come from a `.env` file:
//! ```bash
//! APP_ENV=development
//! CARS_API_URL=http://localhost:5173/api
//! RUST_LOG=car_catalog=debug
//! ```

mod api;
mod app;
mod auth;
mod cli;
mod config;
mod error;
mod models;
mod routes;
mod store;
mod views;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use crate::api::{ApiClient, CarsApi, ConfigSource};
use crate::app::{App, InquirePrompt};
use crate::auth::{CognitoProvider, SessionManager, TokenStore};
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::routes::Route;
use crate::store::CatalogStore;
use crate::views::CatalogView;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr so they never interleave with the rendered screens
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?
        .with_overrides(cli.api_url.as_deref(), cli.session_file.clone())?;

    info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!(
        environment = ?config.environment,
        api = %config.api.base_url,
        "Configuration loaded"
    );

    let sessions = build_sessions(&config)?;

    match cli.command {
        Some(Command::Logout) => {
            sessions.sign_out().await;
            println!("Sesión cerrada");
            Ok(())
        }
        Some(Command::Status) => {
            match sessions.current_user_email().await {
                Some(email) => println!("Sesión iniciada como {email}"),
                None => println!("Sin sesión activa"),
            }
            Ok(())
        }
        Some(Command::Login) => run_app(&config, sessions, Route::Login.path()).await,
        Some(Command::Register) => run_app(&config, sessions, Route::Register.path()).await,
        Some(Command::Open { path }) => run_app(&config, sessions, &path).await,
        None => run_app(&config, sessions, Route::Catalog.path()).await,
    }
}

fn build_sessions(config: &Config) -> Result<Arc<SessionManager>> {
    let settings = Arc::new(ConfigSource::new(&config.api.base_url));
    let endpoint = config
        .identity
        .endpoint
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("invalid COGNITO_ENDPOINT")?;

    let provider = CognitoProvider::new(settings, endpoint);
    let store = TokenStore::file(&config.identity.session_file);
    Ok(Arc::new(SessionManager::new(Arc::new(provider), store)))
}

async fn run_app(config: &Config, sessions: Arc<SessionManager>, start: &str) -> Result<()> {
    let client = ApiClient::new(config.api.base_url.clone(), sessions.clone());
    let catalog = CatalogView::new(CatalogStore::new(CarsApi::new(client)));

    let mut app = App::new(InquirePrompt, sessions, catalog);
    app.run(start).await
}
