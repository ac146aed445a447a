//! HTTP client for the auth provider API
//!
//! Thin wrappers over the provider endpoints flowdev uses. Every request
//! carries the project's publishable API key; user-scoped calls add the
//! session's bearer token on top.

use std::time::Instant;

use reqwest::StatusCode;
use serde_json::json;

use super::types::{AuthSession, AuthUser, ProviderError, SignUpOutcome};
use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::metrics::observe_provider_request;

/// Client for the hosted auth provider.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    /// Build a client from provider configuration.
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ProviderConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent("flowdev/0.1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    /// Register a new email/password user.
    ///
    /// `email_redirect_to` is where the provider's confirmation email
    /// links back to.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        email_redirect_to: &str,
    ) -> Result<SignUpOutcome, AppError> {
        let started = Instant::now();
        let response = self
            .http
            .post(self.endpoint("/signup"))
            .header("apikey", &self.anon_key)
            .query(&[("redirect_to", email_redirect_to)])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await;
        self.parse_response("signup", started, response).await
    }

    /// Exchange email/password credentials for a session.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let started = Instant::now();
        let response = self
            .http
            .post(self.endpoint("/token"))
            .header("apikey", &self.anon_key)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await;
        self.parse_response("token:password", started, response)
            .await
    }

    /// Exchange an OAuth authorization code (plus its PKCE verifier) for
    /// a session.
    pub async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, AppError> {
        let started = Instant::now();
        let response = self
            .http
            .post(self.endpoint("/token"))
            .header("apikey", &self.anon_key)
            .query(&[("grant_type", "pkce")])
            .json(&json!({ "auth_code": code, "code_verifier": code_verifier }))
            .send()
            .await;
        self.parse_response("token:pkce", started, response).await
    }

    /// Fetch the user (with identities) behind an access token.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, AppError> {
        let started = Instant::now();
        let response = self
            .http
            .get(self.endpoint("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await;
        self.parse_response("user", started, response).await
    }

    /// Unlink an external identity from the user behind the access token.
    pub async fn unlink_identity(
        &self,
        access_token: &str,
        identity_id: &str,
    ) -> Result<(), AppError> {
        let started = Instant::now();
        let response = self
            .http
            .delete(self.endpoint(&format!("/user/identities/{identity_id}")))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                observe_provider_request("identities:delete", "success", started.elapsed());
                Ok(())
            }
            Ok(response) => {
                observe_provider_request("identities:delete", "error", started.elapsed());
                Err(Self::error_from_response(response).await.into())
            }
            Err(error) => {
                observe_provider_request("identities:delete", "error", started.elapsed());
                Err(error.into())
            }
        }
    }

    /// Build the provider-hosted OAuth authorize URL for an external login.
    ///
    /// The provider drives the OAuth dance with the external identity
    /// provider itself and redirects back to `redirect_to` with a code.
    pub fn authorize_url(
        &self,
        provider: &str,
        scopes: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> String {
        let mut url = url::Url::parse(&self.endpoint("/authorize"))
            .expect("provider base URL is validated at startup");
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("scopes", scopes)
            .append_pair("redirect_to", redirect_to)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "s256");
        url.to_string()
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        started: Instant,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, AppError> {
        match response {
            Ok(response) if response.status().is_success() => {
                observe_provider_request(endpoint, "success", started.elapsed());
                response.json::<T>().await.map_err(AppError::from)
            }
            Ok(response) => {
                observe_provider_request(endpoint, "error", started.elapsed());
                Err(Self::error_from_response(response).await.into())
            }
            Err(error) => {
                observe_provider_request(endpoint, "error", started.elapsed());
                Err(error.into())
            }
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        ProviderError {
            status: status.as_u16(),
            message: extract_error_message(status, &body),
        }
    }
}

/// Pull the human-readable message out of a provider error body.
///
/// The provider is not consistent about the field name across endpoints.
fn extract_error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for field in ["error_description", "msg", "message", "error"] {
            if let Some(message) = value.get(field).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("provider request failed")
            .to_string()
    } else {
        text.to_string()
    }
}
