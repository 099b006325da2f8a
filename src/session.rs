//! Session record and the authentication state derived from it.

use serde::{Deserialize, Serialize};

/// Well-known slot key holding the serialized [`Session`].
pub const AUTH_USER_TOKEN_KEY: &str = "auth_user_token";

/// A signed-in subject and the token presented to the backend API.
///
/// Immutable: a new sign-in produces a new `Session` that replaces the old one.
/// Serialized as `{"username": ..., "token": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "username")]
    subject_identifier: String,
    #[serde(rename = "token")]
    session_token: String,
}

impl Session {
    #[must_use]
    pub fn new(subject_identifier: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self { subject_identifier: subject_identifier.into(), session_token: session_token.into() }
    }

    #[must_use]
    pub fn subject_identifier(&self) -> &str {
        &self.subject_identifier
    }

    #[must_use]
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// Serialize for the durable slot.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    pub fn to_slot_value(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a value previously written by [`Session::to_slot_value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a serialized session.
    pub fn from_slot_value(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Whether a session currently exists. Never set directly; always derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AuthenticationState {
    pub is_authenticated: bool,
}

impl AuthenticationState {
    pub const ANONYMOUS: Self = Self { is_authenticated: false };
    pub const AUTHENTICATED: Self = Self { is_authenticated: true };

    #[must_use]
    pub fn of(session: Option<&Session>) -> Self {
        Self { is_authenticated: session.is_some() }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
