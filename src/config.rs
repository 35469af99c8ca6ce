//! Configuration module for environment variables and application settings

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use url::Url;

/// Deployed catalog API, used in production builds
pub const PRODUCTION_API_URL: &str = "https://2gfztglkwi.execute-api.us-east-1.amazonaws.com";

/// Local dev proxy that forwards `/api/*` to the deployed API
pub const DEVELOPMENT_API_URL: &str = "http://localhost:5173/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(anyhow!("unknown APP_ENV value: {other}")),
        }
    }

    fn default_for_build() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,

    /// Catalog API settings
    pub api: ApiConfig,

    /// Identity provider settings
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every catalog path is appended to
    pub base_url: Url,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Overrides the regional Cognito endpoint
    pub endpoint: Option<String>,
    /// Where the signed-in session is persisted between runs
    pub session_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = match env::var("APP_ENV") {
            Ok(value) => Environment::parse(&value)?,
            Err(_) => Environment::default_for_build(),
        };

        let base_url = match env::var("CARS_API_URL") {
            Ok(url) => url,
            Err(_) => match environment {
                Environment::Development => DEVELOPMENT_API_URL.to_string(),
                Environment::Production => PRODUCTION_API_URL.to_string(),
            },
        };

        let session_file = match env::var("SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file()?,
        };

        let config = Self {
            environment,
            api: ApiConfig {
                base_url: normalize_base_url(&base_url)?,
            },
            identity: IdentityConfig {
                endpoint: env::var("COGNITO_ENDPOINT").ok().filter(|e| !e.is_empty()),
                session_file,
            },
        };
        Ok(config)
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        api_url: Option<&str>,
        session_file: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(url) = api_url {
            self.api.base_url = normalize_base_url(url)?;
        }
        if let Some(path) = session_file {
            self.identity.session_file = path;
        }
        Ok(self)
    }
}

/// Validate the API base. A trailing slash is dropped so record ids join
/// as `{base}/{id}`.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).with_context(|| format!("invalid API base URL: {raw}"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("API base URL must use http or https, got {}", parsed.scheme());
    }
    Ok(parsed)
}

fn default_session_file() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow!("cannot determine a data directory, set SESSION_FILE"))?;
    Ok(base.join("car-catalog").join("session.json"))
}
