//! Catalog HTTP Client
//!
//! Issues JSON requests against the configured API base and turns failed
//! responses into typed errors. The bearer token is requested from the
//! injected [`TokenProvider`] right before every call.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};
use url::Url;

use crate::error::{AppError, AppResult, REQUEST_FAILED_FALLBACK};

/// Source of the bearer token attached to outbound requests.
///
/// `None` means the request goes out unauthenticated; the server decides
/// whether that is acceptable.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn id_token(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    /// No timeout is configured; the transport defaults apply.
    pub fn new(base: Url, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: Client::new(),
            base,
            tokens,
        }
    }

    /// Build `{base}/{segments..}`, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get(&self, url: Url) -> AppResult<Value> {
        debug!("GET {}", url);
        self.send(self.http.get(url)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> AppResult<Value> {
        debug!("POST {}", url);
        self.send(self.http.post(url).json(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> AppResult<Value> {
        debug!("PUT {}", url);
        self.send(self.http.put(url).json(body)).await
    }

    pub async fn delete(&self, url: Url) -> AppResult<Value> {
        debug!("DELETE {}", url);
        self.send(self.http.delete(url)).await
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Value> {
        let request = match self.tokens.id_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        handle_response(response).await
    }
}

/// Read a response body as JSON and map failure statuses.
///
/// An empty or unparseable body is treated as `{}`.
pub async fn handle_response(response: Response) -> AppResult<Value> {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    let data: Value = serde_json::from_slice(&body).unwrap_or_else(|_| Value::Object(Map::new()));

    if status.is_success() {
        return Ok(data);
    }

    if status == StatusCode::UNAUTHORIZED {
        warn!("Request rejected with 401, session expired or missing");
        return Err(AppError::Unauthorized);
    }

    error!(status = %status, body = %data, "Request failed");
    let message = data
        .get("error")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(REQUEST_FAILED_FALLBACK);
    Err(AppError::RequestFailed(message.to_string()))
}

/// Decode a successful body into the caller's expected shape.
pub fn decode<T: DeserializeOwned>(value: Value) -> AppResult<T> {
    serde_json::from_value(value).map_err(|e| AppError::InvalidResponse(e.to_string()))
}

/// Fixed token, for exercising the client without a session manager
#[cfg(test)]
pub struct StaticToken(pub Option<String>);

#[cfg(test)]
#[async_trait]
impl TokenProvider for StaticToken {
    async fn id_token(&self) -> Option<String> {
        self.0.clone()
    }
}
