//! Typed access to the profile collection.

use std::sync::Arc;

use alumni_common::{NewProfile, ProfileUpdate, UserProfile, PROFILE_COLLECTION};
use serde::Serialize;

use crate::provider::{codes, AccountId, Document, DocumentStore, ProviderError};

/// Reads and writes the single profile document of an account.
#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProfileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch the profile, `None` when no document exists.
    pub async fn fetch(&self, account: &AccountId) -> Result<Option<UserProfile>, ProviderError> {
        tracing::debug!("Fetching profile {}", account);
        let Some(document) = self.store.read(PROFILE_COLLECTION, account.as_str()).await? else {
            return Ok(None);
        };

        serde_json::from_value(serde_json::Value::Object(document))
            .map(Some)
            .map_err(|e| ProviderError::new(codes::INVALID_RESPONSE, format!("Malformed profile: {}", e)))
    }

    /// Create the profile written at registration.
    pub async fn create(&self, account: &AccountId, profile: &NewProfile) -> Result<(), ProviderError> {
        tracing::debug!("Creating profile {}", account);
        self.store
            .create(PROFILE_COLLECTION, account.as_str(), to_document(profile)?)
            .await
    }

    /// Apply a partial edit; other stored fields stay as they are.
    pub async fn update(&self, account: &AccountId, update: &ProfileUpdate) -> Result<(), ProviderError> {
        tracing::debug!("Updating profile {}", account);
        self.store
            .update(PROFILE_COLLECTION, account.as_str(), to_document(update)?)
            .await
    }
}

fn to_document<T: Serialize>(value: &T) -> Result<Document, ProviderError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProviderError::new(
            codes::UNKNOWN,
            format!("Expected an object, got {}", other),
        )),
        Err(e) => Err(ProviderError::new(codes::UNKNOWN, e.to_string())),
    }
}
