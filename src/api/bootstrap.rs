//! Identity provider bootstrap
//!
//! The user pool settings are not compiled in; they are served by the
//! catalog API at `GET /config` and cached for the lifetime of the process.

use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::{error, info};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::models::CognitoConfig;

pub struct ConfigSource {
    http: Client,
    url: Url,
    cached: OnceCell<CognitoConfig>,
}

impl ConfigSource {
    pub fn new(api_base: &Url) -> Self {
        let mut url = api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("config");
        }
        Self {
            http: Client::new(),
            url,
            cached: OnceCell::new(),
        }
    }

    /// Return the cached settings, fetching them on first use.
    ///
    /// A failed fetch is not cached; the next call tries again.
    pub async fn get(&self) -> AppResult<&CognitoConfig> {
        self.cached.get_or_try_init(|| self.fetch()).await
    }

    async fn fetch(&self) -> AppResult<CognitoConfig> {
        let response = self.http.get(self.url.clone()).send().await.map_err(|e| {
            error!("Config request failed: {}", e);
            AppError::ConfigUnavailable
        })?;

        if !response.status().is_success() {
            error!(status = %response.status(), "Config endpoint returned an error");
            return Err(AppError::ConfigUnavailable);
        }

        let config: CognitoConfig = response.json().await.map_err(|e| {
            error!("Config body could not be decoded: {}", e);
            AppError::ConfigUnavailable
        })?;
        info!(region = %config.region, pool = %config.user_pool_id, "Identity configuration loaded");
        Ok(config)
    }
}
