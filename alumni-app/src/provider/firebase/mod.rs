//! Firebase REST implementations of the provider traits.
//!
//! Authentication goes through the Identity Toolkit REST API (token refresh
//! through the Secure Token API) and documents through the Firestore REST API. Both share one `reqwest::Client`.

mod auth;
mod firestore;
pub mod value;

pub use auth::FirebaseAuth;
pub use firestore::FirestoreClient;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::FirebaseConfig;

/// Supplies the bearer token for document requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// ID token of the signed-in account, if any.
    async fn id_token(&self) -> Option<String>;
}

/// Build the auth and Firestore clients for a project.
pub fn connect(config: &FirebaseConfig) -> (Arc<FirebaseAuth>, Arc<FirestoreClient>) {
    let http_client = Client::new();
    let auth = Arc::new(
        FirebaseAuth::with_client(http_client.clone(), &config.auth_url, &config.api_key)
            .with_token_url(&config.token_url),
    );
    let store = Arc::new(FirestoreClient::with_client(
        http_client,
        &config.firestore_url,
        &config.project_id,
        auth.clone(),
    ));
    (auth, store)
}

/// Google API error envelope shared by both REST APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Parse an error body, tolerating non-JSON payloads.
fn parse_error_body(body: &str) -> Option<ErrorBody> {
    serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        let parsed = parse_error_body(body).unwrap();
        assert_eq!(parsed.message, "EMAIL_EXISTS");
        assert!(parsed.status.is_none());

        assert!(parse_error_body("<html>bad gateway</html>").is_none());
    }

    #[test]
    fn test_connect_normalizes_urls() {
        let config = FirebaseConfig {
            api_key: "key".to_string(),
            project_id: "alumni".to_string(),
            auth_url: "http://localhost:9099/".to_string(),
            firestore_url: "http://localhost:8080/".to_string(),
            token_url: "http://localhost:9099/securetoken/".to_string(),
        };
        let (auth, store) = connect(&config);
        assert_eq!(auth.base_url(), "http://localhost:9099");
        assert_eq!(auth.token_url(), "http://localhost:9099/securetoken");
        assert_eq!(
            store.document_url("usuarios", "uid-1"),
            "http://localhost:8080/v1/projects/alumni/databases/(default)/documents/usuarios/uid-1"
        );
    }
}
