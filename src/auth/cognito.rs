//! Cognito user pool client
//!
//! Speaks the Cognito Identity Provider JSON 1.1 protocol directly. Only
//! public-client actions are used, so requests carry no AWS signature.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};
use url::Url;

use crate::api::ConfigSource;
use crate::auth::models::{AuthTokens, SignUpRequest};
use crate::auth::provider::IdentityProvider;
use crate::error::{AppError, AppResult, IdentityError};
use crate::models::CognitoConfig;

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    challenge_name: Option<String>,
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

pub struct CognitoProvider {
    http: Client,
    settings: Arc<ConfigSource>,
    endpoint: Option<Url>,
}

impl CognitoProvider {
    /// `endpoint` replaces the regional endpoint derived from the bootstrap
    /// configuration (local emulators, tests).
    pub fn new(settings: Arc<ConfigSource>, endpoint: Option<Url>) -> Self {
        Self {
            http: Client::new(),
            settings,
            endpoint,
        }
    }

    fn endpoint_for(&self, config: &CognitoConfig) -> AppResult<Url> {
        if let Some(url) = &self.endpoint {
            return Ok(url.clone());
        }
        let raw = format!("https://cognito-idp.{}.amazonaws.com/", config.region);
        Url::parse(&raw).map_err(|e| {
            error!(region = %config.region, "Invalid identity endpoint: {}", e);
            AppError::ConfigUnavailable
        })
    }

    async fn call(&self, action: &str, body: Value) -> AppResult<Value> {
        let config = self.settings.get().await?;
        let endpoint = self.endpoint_for(config)?;

        let response = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        let data: Value = response.json().await.unwrap_or_else(|_| json!({}));
        if status.is_success() {
            return Ok(data);
        }

        let exception = data
            .get("__type")
            .and_then(Value::as_str)
            .unwrap_or("UnknownError");
        let message = data
            .get("message")
            .or_else(|| data.get("Message"))
            .and_then(Value::as_str);
        warn!(action, exception, status = %status, "Identity provider rejected request");
        Err(IdentityError::from_exception(exception, message).into())
    }

    async fn initiate_auth(&self, flow: &str, parameters: Value) -> AppResult<AuthTokens> {
        let client_id = self.settings.get().await?.user_pool_client_id.clone();
        let data = self
            .call(
                "InitiateAuth",
                json!({
                    "AuthFlow": flow,
                    "ClientId": client_id,
                    "AuthParameters": parameters,
                }),
            )
            .await?;

        let parsed: InitiateAuthResponse = serde_json::from_value(data)
            .map_err(|e| AppError::InvalidResponse(e.to_string()))?;
        if let Some(challenge) = parsed.challenge_name {
            return Err(IdentityError::Unknown(format!("Desafío de autenticación no soportado: {challenge}")).into());
        }
        let result = parsed
            .authentication_result
            .ok_or_else(|| AppError::InvalidResponse("missing AuthenticationResult".into()))?;
        Ok(AuthTokens {
            id_token: result.id_token,
            access_token: result.access_token,
            refresh_token: result.refresh_token,
        })
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn sign_up(&self, request: &SignUpRequest) -> AppResult<()> {
        let client_id = self.settings.get().await?.user_pool_client_id.clone();
        let mut attributes = vec![json!({ "Name": "email", "Value": request.email })];
        if let Some(name) = request.display_name.as_deref().filter(|n| !n.is_empty()) {
            attributes.push(json!({ "Name": "name", "Value": name }));
        }

        self.call(
            "SignUp",
            json!({
                "ClientId": client_id,
                "Username": request.email,
                "Password": request.password,
                "UserAttributes": attributes,
            }),
        )
        .await?;
        info!(email = %request.email, "Account registered, pending confirmation");
        Ok(())
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> AppResult<()> {
        let client_id = self.settings.get().await?.user_pool_client_id.clone();
        self.call(
            "ConfirmSignUp",
            json!({
                "ClientId": client_id,
                "Username": email,
                "ConfirmationCode": code,
                "ForceAliasCreation": true,
            }),
        )
        .await?;
        info!(email, "Account confirmed");
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<AuthTokens> {
        let tokens = self
            .initiate_auth(
                "USER_PASSWORD_AUTH",
                json!({ "USERNAME": email, "PASSWORD": password }),
            )
            .await?;
        info!(email, "Signed in");
        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let tokens = self
            .initiate_auth("REFRESH_TOKEN_AUTH", json!({ "REFRESH_TOKEN": refresh_token }))
            .await?;
        info!("Session tokens refreshed");
        Ok(tokens)
    }

    async fn revoke(&self, refresh_token: &str) -> AppResult<()> {
        let client_id = self.settings.get().await?.user_pool_client_id.clone();
        self.call(
            "RevokeToken",
            json!({ "ClientId": client_id, "Token": refresh_token }),
        )
        .await?;
        Ok(())
    }
}
