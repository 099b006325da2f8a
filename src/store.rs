//! Session store: the single source of truth for whether someone is signed in.
//!
//! ARCHITECTURE
//! ============
//! The current `Session` lives in a `watch` channel so readers never block
//! and UI observers are told about transitions. Every transition writes the
//! durable slot first and only then publishes, so "authenticated" always
//! means "a session record is persisted".
//!
//! ERROR HANDLING
//! ==============
//! Callers only ever see `LOGIN FAIL` / `LOGOUT FAIL`. The underlying
//! provider or storage error is logged and kept as the failure's `source()`.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::provider::{IdentityProvider, ProviderError};
use crate::session::{AUTH_USER_TOKEN_KEY, AuthenticationState, Session};
use crate::storage::{KeyValueSlot, StorageError};

pub const LOGIN_FAIL: &str = "LOGIN FAIL";
pub const LOGOUT_FAIL: &str = "LOGOUT FAIL";

// =============================================================================
// ERRORS
// =============================================================================

/// Why a sign-in or sign-out did not complete. Logged, never shown.
#[derive(Debug, thiserror::Error)]
pub enum AuthCause {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("session encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    #[error("LOGIN FAIL")]
    Login(#[source] AuthCause),
    #[error("LOGOUT FAIL")]
    Logout(#[source] AuthCause),
}

impl AuthFailure {
    /// Fixed user-facing message.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Login(_) => LOGIN_FAIL,
            Self::Logout(_) => LOGOUT_FAIL,
        }
    }

    #[must_use]
    pub fn cause(&self) -> &AuthCause {
        match self {
            Self::Login(cause) | Self::Logout(cause) => cause,
        }
    }
}

/// Coarse result shape handed to the UI layer: `{success, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

impl AuthOutcome {
    #[must_use]
    pub fn ok() -> Self {
        Self { success: true, message: String::new() }
    }
}

impl<T> From<Result<T, AuthFailure>> for AuthOutcome {
    fn from(result: Result<T, AuthFailure>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(failure) => Self { success: false, message: failure.message().to_owned() },
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    slot: Arc<dyn KeyValueSlot>,
    current: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// A store that starts unauthenticated. Call [`SessionStore::restore_session`]
    /// once at startup to pick up a session from a previous run.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, slot: Arc<dyn KeyValueSlot>) -> Self {
        let (current, _) = watch::channel(None);
        Self { provider, slot, current }
    }

    /// Build a store and run the startup restore.
    pub async fn start(provider: Arc<dyn IdentityProvider>, slot: Arc<dyn KeyValueSlot>) -> Arc<Self> {
        let store = Arc::new(Self::new(provider, slot));
        store.restore_session().await;
        store
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    #[must_use]
    pub fn state(&self) -> AuthenticationState {
        AuthenticationState::of(self.current.borrow().as_ref())
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// Token for `Authorization: Bearer` on private API calls.
    #[must_use]
    pub fn bearer_token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.session_token().to_owned())
    }

    /// Observe session transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    /// Read the record currently in the durable slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read. An unparseable record
    /// reads as `None`.
    pub fn persisted_session(&self) -> Result<Option<Session>, StorageError> {
        let raw = self.slot.get(AUTH_USER_TOKEN_KEY)?;
        Ok(raw.and_then(|raw| Session::from_slot_value(&raw).ok()))
    }

    /// Ask the provider for its current session. Any failure leaves the store
    /// unauthenticated with no persisted record. Returns the resulting
    /// authenticated flag.
    pub async fn restore_session(&self) -> bool {
        match self.provider.current_session().await {
            Ok(session) => match self.persist(&session) {
                Ok(()) => {
                    tracing::info!(subject = %session.subject_identifier(), "session restored");
                    self.current.send_replace(Some(session));
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "restored session could not be persisted");
                    self.clear_after_failed_restore();
                    false
                }
            },
            Err(e) => {
                tracing::info!(error = %e, "no session to restore");
                self.clear_after_failed_restore();
                false
            }
        }
    }

    /// Verify credentials with the provider and persist the new session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFailure::Login`] if the provider rejects the credentials,
    /// cannot be reached, or the session cannot be persisted. State is left
    /// unchanged, which is unauthenticated whenever the sign-in view is reachable.
    pub async fn sign_in(&self, identifier: &str, secret: &str) -> Result<(), AuthFailure> {
        let result = async {
            let session = self.provider.authenticate(identifier, secret).await?;
            self.persist(&session)?;
            Ok::<_, AuthCause>(session)
        }
        .await;

        match result {
            Ok(session) => {
                tracing::info!(subject = %session.subject_identifier(), "signed in");
                self.current.send_replace(Some(session));
                Ok(())
            }
            Err(cause) => {
                tracing::warn!(error = %cause, "sign-in failed");
                Err(AuthFailure::Login(cause))
            }
        }
    }

    /// End the session with the provider and drop the persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFailure::Logout`] if the provider refuses or cannot be
    /// reached, or the record cannot be removed. State is left unchanged.
    pub async fn sign_out(&self) -> Result<(), AuthFailure> {
        let result = async {
            self.provider.revoke().await?;
            self.slot.remove(AUTH_USER_TOKEN_KEY)?;
            Ok::<_, AuthCause>(())
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!("signed out");
                self.current.send_replace(None);
                Ok(())
            }
            Err(cause) => {
                tracing::warn!(error = %cause, "sign-out failed");
                Err(AuthFailure::Logout(cause))
            }
        }
    }

    fn persist(&self, session: &Session) -> Result<(), AuthCause> {
        let raw = session.to_slot_value()?;
        self.slot.set(AUTH_USER_TOKEN_KEY, &raw)?;
        Ok(())
    }

    fn clear_after_failed_restore(&self) {
        if let Err(e) = self.slot.remove(AUTH_USER_TOKEN_KEY) {
            tracing::warn!(error = %e, "stale session record could not be removed");
        }
        self.current.send_replace(None);
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
