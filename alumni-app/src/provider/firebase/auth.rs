//! Identity Toolkit REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{parse_error_body, TokenSource};
use crate::provider::{codes, Account, AccountId, IdentityProvider, ProviderError};
use crate::session::{SessionChannel, SessionSubscription};

const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com";

/// ID tokens are exchanged this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Firebase Authentication over REST.
///
/// Holds the session in memory only: a fresh process starts signed out.
pub struct FirebaseAuth {
    http_client: Client,
    base_url: String,
    token_url: String,
    api_key: String,
    session: SessionChannel,
    tokens: RwLock<Option<Tokens>>,
}

/// Credentials of the signed-in account.
struct Tokens {
    id_token: String,
    refresh_token: Option<String>,
    expires_at: Option<Instant>,
}

impl Tokens {
    fn new(id_token: String, refresh_token: Option<String>, expires_in: Option<&str>) -> Self {
        let expires_at = expires_in
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        Self {
            id_token,
            refresh_token,
            expires_at,
        }
    }

    fn needs_refresh(&self) -> bool {
        self.refresh_token.is_some()
            && self
                .expires_at
                .map_or(false, |at| Instant::now() + REFRESH_MARGIN >= at)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Secure Token API answer; unlike Identity Toolkit it uses snake_case.
#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

impl FirebaseAuth {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(http_client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_key: api_key.to_string(),
            session: SessionChannel::new(),
            tokens: RwLock::new(None),
        }
    }

    /// Use another Secure Token API base URL.
    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.token_url = token_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// POST email/password to an `accounts:*` endpoint and adopt the
    /// returned session.
    async fn password_call(&self, endpoint: &str, email: &str, password: &str) -> Result<Account, ProviderError> {
        let url = format!("{}/v1/accounts:{}", self.base_url, endpoint);
        tracing::debug!("Identity request accounts:{} for {}", endpoint, email);

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let err = map_auth_error(&body);
            tracing::warn!("Identity request accounts:{} failed ({}): {}", endpoint, status, err.code);
            return Err(err);
        }

        let body: PasswordResponse = response.json().await?;
        let account = Account {
            id: AccountId::new(body.local_id),
            email: body.email.or_else(|| Some(email.to_string())),
        };

        *self.tokens.write().await = Some(Tokens::new(
            body.id_token,
            body.refresh_token,
            body.expires_in.as_deref(),
        ));
        self.session.publish(Some(account.clone()));
        Ok(account)
    }

    /// Trade a refresh token for a new ID token.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Tokens, ProviderError> {
        let url = format!("{}/v1/token", self.token_url);
        tracing::debug!("Refreshing ID token");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let err = map_auth_error(&body);
            tracing::warn!("ID token refresh failed ({}): {}", status, err.code);
            return Err(err);
        }

        let body: RefreshResponse = response.json().await?;
        Ok(Tokens::new(
            body.id_token,
            Some(body.refresh_token),
            body.expires_in.as_deref(),
        ))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, ProviderError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, ProviderError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        // Tokens are bearer-only; signing out is forgetting them.
        *self.tokens.write().await = None;
        self.session.publish(None);
        Ok(())
    }

    fn current_account(&self) -> Option<Account> {
        self.session.current()
    }

    fn subscribe(&self) -> SessionSubscription {
        self.session.subscribe()
    }
}

#[async_trait]
impl TokenSource for FirebaseAuth {
    /// Current ID token, exchanged first when it is about to expire. If the
    /// exchange fails the stale token is returned and the store reports the
    /// rejection.
    async fn id_token(&self) -> Option<String> {
        {
            let tokens = self.tokens.read().await;
            let current = tokens.as_ref()?;
            if !current.needs_refresh() {
                return Some(current.id_token.clone());
            }
        }

        let mut tokens = self.tokens.write().await;
        let current = tokens.as_mut()?;
        if current.needs_refresh() {
            if let Some(refresh_token) = current.refresh_token.clone() {
                if let Ok(fresh) = self.exchange_refresh_token(&refresh_token).await {
                    *current = fresh;
                }
            }
        }
        Some(current.id_token.clone())
    }
}

/// Translate an Identity Toolkit error body into SDK-style codes.
///
/// The REST API reports the reason in `error.message`, optionally followed
/// by ` : ` and a human-readable detail.
fn map_auth_error(body: &str) -> ProviderError {
    let Some(error) = parse_error_body(body) else {
        return ProviderError::new(codes::UNKNOWN, body.to_string());
    };

    let (reason, detail) = match error.message.split_once(" : ") {
        Some((reason, detail)) => (reason.trim(), Some(detail.trim())),
        None => (error.message.trim(), None),
    };

    let code = match reason {
        "EMAIL_EXISTS" => codes::EMAIL_ALREADY_IN_USE,
        "INVALID_EMAIL" | "MISSING_EMAIL" => codes::INVALID_EMAIL,
        "WEAK_PASSWORD" => codes::WEAK_PASSWORD,
        "EMAIL_NOT_FOUND" => codes::USER_NOT_FOUND,
        "INVALID_PASSWORD" | "MISSING_PASSWORD" => codes::WRONG_PASSWORD,
        "INVALID_LOGIN_CREDENTIALS" => codes::INVALID_CREDENTIAL,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => codes::TOO_MANY_REQUESTS,
        "USER_DISABLED" => "auth/user-disabled",
        "OPERATION_NOT_ALLOWED" => "auth/operation-not-allowed",
        _ => "auth/internal-error",
    };

    ProviderError::new(code, detail.unwrap_or(reason))
}
