//! Identity provider seam.
//!
//! DESIGN
//! ======
//! The session store depends only on the three-operation capability set in
//! `IdentityProvider`, never on a provider's wire protocol. `cognito` is the
//! one real backend.

pub mod cognito;

pub use cognito::CognitoProvider;

use crate::session::Session;
use crate::storage::StorageError;

/// Errors produced by identity provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request failed before a response arrived (includes timeouts).
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider answered and refused the operation.
    #[error("provider rejected request: {code}: {message}")]
    Rejected { code: String, message: String },

    /// The provider response body could not be deserialized.
    #[error("provider response parse failed: {0}")]
    Parse(String),

    /// The provider asked for an interactive challenge this client does not handle.
    #[error("unsupported auth challenge: {0}")]
    Challenge(String),

    /// No session is cached with the provider.
    #[error("no current session")]
    NoSession,

    /// The provider's local token cache could not be read or written.
    #[error("provider token cache: {0}")]
    Storage(#[from] StorageError),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ProviderError {
    /// True when the provider itself refused the credentials or token.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// The capability set the session store needs from an identity provider.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify credentials and start a new session.
    async fn authenticate(&self, identifier: &str, secret: &str) -> Result<Session, ProviderError>;

    /// End the current session with the provider.
    async fn revoke(&self) -> Result<(), ProviderError>;

    /// Return the session the provider currently considers valid.
    async fn current_session(&self) -> Result<Session, ProviderError>;
}
