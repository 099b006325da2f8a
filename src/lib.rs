//! Client-side session state for an app that signs in against a managed
//! identity provider.
//!
//! SYSTEM CONTEXT
//! ==============
//! `store::SessionStore` is the single source of truth for "is someone signed
//! in". It bridges a `provider::IdentityProvider` and a durable
//! `storage::KeyValueSlot`. `guard` turns the derived authentication state
//! into render/redirect decisions, and `api` attaches the session token to
//! outgoing requests.
//!
//! Construct one store at process start and share it by `Arc`.

pub mod api;
pub mod config;
pub mod guard;
pub mod provider;
pub mod session;
pub mod storage;
pub mod store;

pub use config::AuthConfig;
pub use guard::{AuthenticationState, Guarded, Location, Redirect};
pub use provider::{IdentityProvider, ProviderError};
pub use session::Session;
pub use storage::{FileSlot, KeyValueSlot, MemorySlot, StorageError};
pub use store::{AuthFailure, AuthOutcome, SessionStore};
