//! Cognito user-pool client.
//!
//! Thin HTTP wrapper over the Cognito IdP JSON API (`InitiateAuth`,
//! `GetUser`, `RevokeToken`). Pure parsing in `parse_*` for testability.
//!
//! TOKEN CACHE
//! ===========
//! Provider tokens live in the durable slot under
//! `CognitoIdentityServiceProvider.<clientId>.tokens`, separate from the
//! session store's record. `current_session` validates the cached access
//! token with `GetUser`; there is no refresh, an expired token is a failure.
//!
//! Sign-out is local to this device: the refresh token is revoked and the
//! cache cleared. A refusal from the provider means the token is already
//! dead, so the cache is cleared anyway; only transport and 5xx failures keep
//! it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{IdentityProvider, ProviderError};
use crate::config::AuthConfig;
use crate::session::Session;
use crate::storage::KeyValueSlot;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    InitiateAuth,
    GetUser,
    RevokeToken,
}

impl Operation {
    fn target(self) -> String {
        let name = match self {
            Self::InitiateAuth => "InitiateAuth",
            Self::GetUser => "GetUser",
            Self::RevokeToken => "RevokeToken",
        };
        format!("{TARGET_PREFIX}.{name}")
    }
}

#[must_use]
pub fn tokens_cache_key(client_id: &str) -> String {
    format!("CognitoIdentityServiceProvider.{client_id}.tokens")
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct CognitoProvider {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
    cache: Arc<dyn KeyValueSlot>,
}

impl CognitoProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AuthConfig, cache: Arc<dyn KeyValueSlot>) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ProviderError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: config.idp_endpoint.clone(), client_id: config.client_id.clone(), cache })
    }

    async fn call<B: Serialize + Sync>(&self, op: Operation, body: &B) -> Result<String, ProviderError> {
        let payload = serde_json::to_vec(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", op.target())
            .body(payload)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &text));
        }
        Ok(text)
    }

    fn load_tokens(&self) -> Result<Option<CachedTokens>, ProviderError> {
        let key = tokens_cache_key(&self.client_id);
        let Some(raw) = self.cache.get(&key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable provider token cache");
                self.cache.remove(&key)?;
                Ok(None)
            }
        }
    }

    fn store_tokens(&self, tokens: &CachedTokens) -> Result<(), ProviderError> {
        let raw = serde_json::to_string(tokens).map_err(|e| ProviderError::Parse(e.to_string()))?;
        self.cache.set(&tokens_cache_key(&self.client_id), &raw)?;
        Ok(())
    }

    fn clear_tokens(&self) -> Result<(), ProviderError> {
        self.cache.remove(&tokens_cache_key(&self.client_id))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl IdentityProvider for CognitoProvider {
    async fn authenticate(&self, identifier: &str, secret: &str) -> Result<Session, ProviderError> {
        let body = InitiateAuthRequest {
            auth_flow: USER_PASSWORD_AUTH,
            client_id: &self.client_id,
            auth_parameters: AuthParameters { username: identifier, password: secret },
        };
        let text = self.call(Operation::InitiateAuth, &body).await?;
        let result = parse_initiate_auth(&text)?;

        let tokens = CachedTokens {
            username: identifier.to_owned(),
            id_token: result.id_token,
            access_token: result.access_token,
            refresh_token: result.refresh_token,
        };
        self.store_tokens(&tokens)?;
        Ok(Session::new(tokens.username, tokens.id_token))
    }

    async fn revoke(&self) -> Result<(), ProviderError> {
        let Some(tokens) = self.load_tokens()? else {
            tracing::debug!("no cached provider tokens; local sign-out only");
            return Ok(());
        };
        let Some(refresh_token) = tokens.refresh_token.as_deref() else {
            tracing::debug!("no refresh token to revoke; clearing local tokens");
            return self.clear_tokens();
        };
        let body = RevokeTokenRequest { token: refresh_token, client_id: &self.client_id };
        match self.call(Operation::RevokeToken, &body).await {
            Ok(_) => {}
            Err(e) if e.is_rejection() => {
                tracing::info!(error = %e, "refresh token already unusable; clearing local tokens");
            }
            Err(e) => return Err(e),
        }
        self.clear_tokens()
    }

    async fn current_session(&self) -> Result<Session, ProviderError> {
        let tokens = self.load_tokens()?.ok_or(ProviderError::NoSession)?;
        let body = AccessTokenRequest { access_token: &tokens.access_token };
        match self.call(Operation::GetUser, &body).await {
            Ok(text) => {
                let user = parse_get_user(&text)?;
                tracing::debug!(provider_username = %user.username, "provider session valid");
                Ok(Session::new(tokens.username, tokens.id_token))
            }
            Err(e) if e.is_rejection() => {
                if let Err(clear_err) = self.clear_tokens() {
                    tracing::warn!(error = %clear_err, "failed to clear rejected provider tokens");
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
struct AuthParameters<'a> {
    #[serde(rename = "USERNAME")]
    username: &'a str,
    #[serde(rename = "PASSWORD")]
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AccessTokenRequest<'a> {
    access_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RevokeTokenRequest<'a> {
    token: &'a str,
    client_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserResponse {
    username: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Tokens cached between process runs.
#[derive(Debug, Serialize, Deserialize)]
struct CachedTokens {
    username: String,
    id_token: String,
    access_token: String,
    refresh_token: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_initiate_auth(json: &str) -> Result<AuthenticationResult, ProviderError> {
    let resp: InitiateAuthResponse = serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))?;
    match (resp.authentication_result, resp.challenge_name) {
        (Some(result), _) => Ok(result),
        (None, Some(challenge)) => Err(ProviderError::Challenge(challenge)),
        (None, None) => Err(ProviderError::Parse("response has neither AuthenticationResult nor ChallengeName".into())),
    }
}

fn parse_get_user(json: &str) -> Result<GetUserResponse, ProviderError> {
    serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Map a non-2xx response to a provider error. 5xx is a transport-level
/// failure, not a refusal.
///
/// Cognito sends `{"__type": "NotAuthorizedException", "message": "..."}`; the
/// type is sometimes namespaced as `prefix#NotAuthorizedException`.
fn parse_error(status: u16, body: &str) -> ProviderError {
    if status >= 500 {
        return ProviderError::Request(format!("HTTP {status}: {body}"));
    }
    let Ok(err) = serde_json::from_str::<ErrorBody>(body) else {
        return ProviderError::Rejected { code: format!("HTTP {status}"), message: body.to_owned() };
    };
    let code = err
        .kind
        .as_deref()
        .map(|kind| kind.rsplit('#').next().unwrap_or(kind).to_owned())
        .unwrap_or_else(|| format!("HTTP {status}"));
    ProviderError::Rejected { code, message: err.message.unwrap_or_default() }
}

#[cfg(test)]
#[path = "cognito_test.rs"]
mod tests;
