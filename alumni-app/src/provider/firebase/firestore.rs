//! Firestore REST client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::value::{decode_fields, encode_fields};
use super::{parse_error_body, TokenSource};
use crate::provider::{codes, Document, DocumentStore, ProviderError};

/// Cloud Firestore over REST, authenticated with the signed-in account's
/// ID token.
pub struct FirestoreClient {
    http_client: Client,
    base_url: String,
    project_id: String,
    tokens: Arc<dyn TokenSource>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreClient {
    pub fn new(base_url: &str, project_id: &str, tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_client(Client::new(), base_url, project_id, tokens)
    }

    pub fn with_client(
        http_client: Client,
        base_url: &str,
        project_id: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            tokens,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection
        )
    }

    pub(crate) fn document_url(&self, collection: &str, key: &str) -> String {
        format!("{}/{}", self.collection_url(collection), key)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.id_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn read(&self, collection: &str, key: &str) -> Result<Option<Document>, ProviderError> {
        let url = self.document_url(collection, key);
        tracing::debug!("Firestore GET {}/{}", collection, key);

        let response = self.authorized(self.http_client.get(&url)).await.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check(response).await?;

        let document: FirestoreDocument = response.json().await?;
        decode_fields(&document.fields).map(Some)
    }

    async fn create(&self, collection: &str, key: &str, fields: Document) -> Result<(), ProviderError> {
        let url = self.collection_url(collection);
        tracing::debug!("Firestore CREATE {}/{}", collection, key);

        let request = self
            .http_client
            .post(&url)
            .query(&[("documentId", key)])
            .json(&json!({ "fields": encode_fields(&fields) }));

        let response = self.authorized(request).await.send().await?;
        check(response).await?;
        Ok(())
    }

    async fn update(&self, collection: &str, key: &str, fields: Document) -> Result<(), ProviderError> {
        let url = self.document_url(collection, key);
        tracing::debug!("Firestore PATCH {}/{} ({} fields)", collection, key, fields.len());

        let mut query: Vec<(&str, &str)> = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", name.as_str()))
            .collect();
        query.push(("currentDocument.exists", "true"));

        let request = self
            .http_client
            .patch(&url)
            .query(&query)
            .json(&json!({ "fields": encode_fields(&fields) }));

        let response = self.authorized(request).await.send().await?;
        check(response).await?;
        Ok(())
    }
}

/// Pass successful responses through; map error statuses to provider codes.
async fn check(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (status_name, message) = match parse_error_body(&body) {
        Some(error) => (error.status.unwrap_or_default(), error.message),
        None => (String::new(), body),
    };

    let code = match (status, status_name.as_str()) {
        (_, "NOT_FOUND") | (StatusCode::NOT_FOUND, _) => codes::NOT_FOUND,
        (_, "ALREADY_EXISTS") | (StatusCode::CONFLICT, _) => codes::ALREADY_EXISTS,
        (_, "PERMISSION_DENIED") | (StatusCode::FORBIDDEN, _) => codes::PERMISSION_DENIED,
        (_, "UNAUTHENTICATED") | (StatusCode::UNAUTHORIZED, _) => codes::UNAUTHENTICATED,
        _ => codes::UNKNOWN,
    };

    tracing::warn!("Firestore request failed ({}): {}", status, code);
    Err(ProviderError::new(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOC_PATH: &str = "/v1/projects/alumni/databases/(default)/documents/usuarios/uid-1";
    const COLLECTION_PATH: &str = "/v1/projects/alumni/databases/(default)/documents/usuarios";

    struct FixedToken(Option<&'static str>);

    #[async_trait]
    impl TokenSource for FixedToken {
        async fn id_token(&self) -> Option<String> {
            self.0.map(String::from)
        }
    }

    fn client(server: &MockServer, token: Option<&'static str>) -> FirestoreClient {
        FirestoreClient::new(&server.uri(), "alumni", Arc::new(FixedToken(token)))
    }

    fn fields(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_read_existing_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOC_PATH))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/alumni/databases/(default)/documents/usuarios/uid-1",
                "fields": {
                    "nombre": { "stringValue": "Ana" },
                    "anoGraduacion": { "integerValue": "2020" }
                },
                "createTime": "2024-01-01T00:00:00.000000Z",
                "updateTime": "2024-01-01T00:00:00.000000Z"
            })))
            .mount(&server)
            .await;

        let document = client(&server, Some("token-1"))
            .read("usuarios", "uid-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(Value::Object(document), json!({ "nombre": "Ana", "anoGraduacion": 2020 }));
    }

    #[tokio::test]
    async fn test_read_missing_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
            })))
            .mount(&server)
            .await;

        let document = client(&server, Some("token-1")).read("usuarios", "uid-1").await.unwrap();
        assert!(document.is_none());
    }

    #[tokio::test]
    async fn test_read_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        let err = client(&server, None).read("usuarios", "uid-1").await.unwrap_err();
        assert!(err.is(codes::PERMISSION_DENIED));
        assert_eq!(err.message, "Missing or insufficient permissions.");
    }

    #[tokio::test]
    async fn test_create_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COLLECTION_PATH))
            .and(query_param("documentId", "uid-1"))
            .and(body_json(json!({
                "fields": {
                    "nombre": { "stringValue": "Ana" },
                    "anoGraduacion": { "integerValue": "2020" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, Some("token-1"))
            .create("usuarios", "uid-1", fields(json!({ "nombre": "Ana", "anoGraduacion": 2020 })))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_existing_document_conflicts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COLLECTION_PATH))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": { "code": 409, "message": "Document already exists", "status": "ALREADY_EXISTS" }
            })))
            .mount(&server)
            .await;

        let err = client(&server, Some("token-1"))
            .create("usuarios", "uid-1", fields(json!({ "nombre": "Ana" })))
            .await
            .unwrap_err();
        assert!(err.is(codes::ALREADY_EXISTS));
    }

    #[tokio::test]
    async fn test_update_uses_field_mask_and_precondition() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .and(query_param("updateMask.fieldPaths", "tituloUniversitario"))
            .and(query_param("currentDocument.exists", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, Some("token-1"))
            .update("usuarios", "uid-1", fields(json!({ "tituloUniversitario": "Lic." })))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "No document to update", "status": "NOT_FOUND" }
            })))
            .mount(&server)
            .await;

        let err = client(&server, Some("token-1"))
            .update("usuarios", "uid-1", fields(json!({ "nombre": "Ana" })))
            .await
            .unwrap_err();
        assert!(err.is(codes::NOT_FOUND));
    }
}
