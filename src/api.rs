//! REST API helpers for the backend behind `API_URL`.
//!
//! `ApiClient::public` sends plain JSON requests. `ApiClient::private` also
//! attaches `Authorization: Bearer <sessionToken>` whenever a session is
//! present, reading the token from the session store at request time.
//!
//! ERROR HANDLING
//! ==============
//! Failed responses are logged here and returned as `ApiError`; nothing in
//! this module touches authentication state.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::store::SessionStore;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    Request(String),

    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    #[error("API response parse failed: {0}")]
    Parse(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Anything that can supply the current session token.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

impl TokenSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        SessionStore::bearer_token(self)
    }
}

/// Row returned by `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub key: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub address: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub(crate) fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl ApiClient {
    /// Client for unauthenticated endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn public(config: &AuthConfig) -> Result<Self, ApiError> {
        Self::build(config, None)
    }

    /// Client that authenticates requests with the current session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn private(config: &AuthConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        Self::build(config, Some(tokens))
    }

    fn build(config: &AuthConfig, tokens: Option<Arc<dyn TokenSource>>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_url.clone(), tokens })
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, self.endpoint(path));
        match self.tokens.as_ref().and_then(|t| t.bearer_token()) {
            Some(token) => builder.header(AUTHORIZATION, bearer_value(&token)),
            None => builder,
        }
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .request(reqwest::Method::GET, path)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%path, error = %e, "API request failed");
                ApiError::Request(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(%path, status = status.as_u16(), "API response error");
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Fetch the user table shown on the dashboard.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get_json`].
    pub async fn fetch_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.get_json("/users").await
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
