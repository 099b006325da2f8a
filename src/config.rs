//! Identity-provider and API configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Everything the provider client and HTTP clients need is read once at
//! startup into `AuthConfig`, validated, and passed into their constructors.
//! Nothing downstream reads the environment.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STORAGE_DIR: &str = ".sessiongate";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing config: env var {var} not set")]
    Missing { var: &'static str },

    /// A variable is set but its value is unusable.
    #[error("invalid config {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    /// Base URL of the backend API, without a trailing slash.
    pub api_url: String,
    /// Cognito IdP endpoint, without a trailing slash.
    pub idp_endpoint: String,
    pub storage_dir: PathBuf,
    pub timeouts: Timeouts,
}

impl AuthConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `AUTH_REGION`
    /// - `AUTH_USER_POOL_ID` (`<region>_<id>`)
    /// - `AUTH_USER_POOL_CLIENT_ID`
    /// - `API_URL`
    ///
    /// Optional:
    /// - `AUTH_IDP_ENDPOINT`: default `https://cognito-idp.<region>.amazonaws.com`
    /// - `AUTH_STORAGE_DIR`: default `.sessiongate`
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: default 30
    /// - `AUTH_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AuthConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &'static str| lookup(var).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing { var });

        let region = require("AUTH_REGION")?;
        let user_pool_id = require("AUTH_USER_POOL_ID")?;
        validate_user_pool_id(&region, &user_pool_id)?;
        let client_id = require("AUTH_USER_POOL_CLIENT_ID")?;
        let api_url = parse_base_url("API_URL", &require("API_URL")?)?;

        let idp_endpoint = match get("AUTH_IDP_ENDPOINT") {
            Some(raw) => parse_base_url("AUTH_IDP_ENDPOINT", &raw)?,
            None => default_idp_endpoint(&region),
        };
        let storage_dir = PathBuf::from(get("AUTH_STORAGE_DIR").unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_owned()));
        let timeouts = Timeouts {
            request_secs: parse_secs("AUTH_REQUEST_TIMEOUT_SECS", &get, DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs("AUTH_CONNECT_TIMEOUT_SECS", &get, DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { region, user_pool_id, client_id, api_url, idp_endpoint, storage_dir, timeouts })
    }
}

#[must_use]
pub fn default_idp_endpoint(region: &str) -> String {
    format!("https://cognito-idp.{region}.amazonaws.com")
}

fn validate_user_pool_id(region: &str, pool_id: &str) -> Result<(), ConfigError> {
    match pool_id.split_once('_') {
        Some((prefix, id)) if prefix == region && !id.is_empty() => Ok(()),
        Some((prefix, _)) if prefix != region => Err(ConfigError::Invalid {
            var: "AUTH_USER_POOL_ID",
            reason: format!("pool region '{prefix}' does not match AUTH_REGION '{region}'"),
        }),
        _ => Err(ConfigError::Invalid { var: "AUTH_USER_POOL_ID", reason: "expected '<region>_<id>'".into() }),
    }
}

fn parse_base_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(ConfigError::Invalid { var, reason: format!("'{raw}' is not an http(s) URL") });
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

fn parse_secs(
    var: &'static str,
    get: &impl Fn(&'static str) -> Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = get(var) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid { var, reason: "must be greater than zero".into() }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::Invalid { var, reason: e.to_string() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
