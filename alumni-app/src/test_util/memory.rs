use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::provider::{codes, Account, AccountId, Document, DocumentStore, IdentityProvider, ProviderError};
use crate::session::{SessionChannel, SessionSubscription};

struct StoredAccount {
    id: AccountId,
    password: String,
}

/// Identity provider keeping accounts in memory.
#[derive(Default)]
pub struct MemoryIdentity {
    session: SessionChannel,
    accounts: Mutex<HashMap<String, StoredAccount>>,
    latency: Option<Duration>,
    fail_sign_out: AtomicBool,
    create_calls: AtomicUsize,
    sign_in_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every backend call by `latency`.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Publish a session value directly, as the provider would on a
    /// sign-in from elsewhere or a token expiry.
    pub fn set_session(&self, account: Option<Account>) {
        self.session.publish(account);
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    pub fn subscriber_count(&self) -> usize {
        self.session.subscriber_count()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    /// Total calls that reached the provider.
    pub fn calls(&self) -> usize {
        self.create_calls() + self.sign_in_calls() + self.sign_out_calls()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, ProviderError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;

        if !email.contains('@') {
            return Err(ProviderError::new(codes::INVALID_EMAIL, "The email address is badly formatted."));
        }
        if password.chars().count() < 6 {
            return Err(ProviderError::new(
                codes::WEAK_PASSWORD,
                "Password should be at least 6 characters",
            ));
        }

        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(ProviderError::new(
                codes::EMAIL_ALREADY_IN_USE,
                "The email address is already in use by another account.",
            ));
        }

        let id = AccountId::new(uuid::Uuid::new_v4().simple().to_string());
        accounts.insert(
            email.to_string(),
            StoredAccount {
                id: id.clone(),
                password: password.to_string(),
            },
        );
        drop(accounts);

        let account = Account {
            id,
            email: Some(email.to_string()),
        };
        self.session.publish(Some(account.clone()));
        Ok(account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, ProviderError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;

        let accounts = self.accounts.lock().await;
        let stored = accounts
            .get(email)
            .ok_or_else(|| ProviderError::new(codes::USER_NOT_FOUND, "There is no user record."))?;
        if stored.password != password {
            return Err(ProviderError::new(codes::WRONG_PASSWORD, "The password is invalid."));
        }

        let account = Account {
            id: stored.id.clone(),
            email: Some(email.to_string()),
        };
        drop(accounts);

        self.session.publish(Some(account.clone()));
        Ok(account)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;

        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ProviderError::network("offline"));
        }
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

/// Document store keeping documents in memory.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<(String, String), Document>>,
    latency: Option<Duration>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stored document, bypassing counters and failure switches.
    pub async fn get(&self, collection: &str, key: &str) -> Option<Document> {
        self.documents
            .lock()
            .await
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    /// Seed a document, bypassing counters and failure switches.
    pub async fn insert(&self, collection: &str, key: &str, fields: Document) {
        self.documents
            .lock()
            .await
            .insert((collection.to_string(), key.to_string()), fields);
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_writes(&self) -> Result<(), ProviderError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(ProviderError::network("offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, collection: &str, key: &str) -> Result<Option<Document>, ProviderError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.delay().await;

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ProviderError::network("offline"));
        }
        Ok(self.get(collection, key).await)
    }

    async fn create(&self, collection: &str, key: &str, fields: Document) -> Result<(), ProviderError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.check_writes()?;

        let mut documents = self.documents.lock().await;
        let id = (collection.to_string(), key.to_string());
        if documents.contains_key(&id) {
            return Err(ProviderError::new(codes::ALREADY_EXISTS, "Document already exists"));
        }
        documents.insert(id, fields);
        Ok(())
    }

    async fn update(&self, collection: &str, key: &str, fields: Document) -> Result<(), ProviderError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.check_writes()?;

        let mut documents = self.documents.lock().await;
        let document = documents
            .get_mut(&(collection.to_string(), key.to_string()))
            .ok_or_else(|| ProviderError::new(codes::NOT_FOUND, "No document to update"))?;
        document.extend(fields);
        Ok(())
    }
}
