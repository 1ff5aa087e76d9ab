//! External identity and document-store abstraction.
//!
//! The client never owns credentials or persistence. It talks to an
//! `IdentityProvider` for accounts and sessions and to a `DocumentStore` for
//! the profile documents. Firebase is the production backend; the in-memory
//! implementations in `test_util` stand in for it in tests.

pub mod firebase;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::SessionSubscription;

/// Field map of a stored document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Opaque account identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A signed-in account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: Option<String>,
}

/// Error codes reported by identity providers.
///
/// These follow the provider SDK naming so adapters translate their native
/// codes once and the screens match on a single vocabulary.
pub mod codes {
    pub const EMAIL_ALREADY_IN_USE: &str = "auth/email-already-in-use";
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    pub const WEAK_PASSWORD: &str = "auth/weak-password";
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
    pub const INVALID_CREDENTIAL: &str = "auth/invalid-credential";
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    pub const NETWORK_REQUEST_FAILED: &str = "network-request-failed";
    pub const NOT_FOUND: &str = "not-found";
    pub const ALREADY_EXISTS: &str = "already-exists";
    pub const PERMISSION_DENIED: &str = "permission-denied";
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    pub const INVALID_RESPONSE: &str = "invalid-response";
    pub const UNKNOWN: &str = "unknown";
}

/// Failure reported by an external provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({code})")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Transport-level failure: the request never got a provider answer.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(codes::NETWORK_REQUEST_FAILED, message)
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::new(codes::INVALID_RESPONSE, e.to_string())
        } else {
            ProviderError::network(e.to_string())
        }
    }
}

/// Account and session management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, ProviderError>;

    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, ProviderError>;

    /// End the current session. Subscribers observe `None` afterwards.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Most recent session value.
    fn current_account(&self) -> Option<Account>;

    /// Subscribe to session changes. The subscription starts at the current
    /// value and unsubscribes when dropped.
    fn subscribe(&self) -> SessionSubscription;
}

/// Keyed document storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document. `Ok(None)` when it does not exist.
    async fn read(&self, collection: &str, key: &str) -> Result<Option<Document>, ProviderError>;

    /// Create a document. Fails with `already-exists` if one is present.
    async fn create(&self, collection: &str, key: &str, fields: Document) -> Result<(), ProviderError>;

    /// Overwrite the given fields of an existing document, leaving every
    /// other field untouched. Fails with `not-found` if it does not exist.
    async fn update(&self, collection: &str, key: &str, fields: Document) -> Result<(), ProviderError>;
}
