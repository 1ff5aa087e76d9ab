//! Session value plumbing.
//!
//! Identity providers own a `SessionChannel` and publish the signed-in
//! account (or `None`) on it. Consumers hold a `SessionSubscription`; the app
//! root wraps its single subscription in a `SessionObserver`. Only the latest
//! value is kept, intermediate transitions are not buffered.

use tokio::sync::watch;

use crate::provider::Account;

/// Provider-side publisher of the session value.
#[derive(Debug)]
pub struct SessionChannel {
    tx: watch::Sender<Option<Account>>,
}

impl SessionChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the session value and notify subscribers.
    pub fn publish(&self, account: Option<Account>) {
        match &account {
            Some(a) => tracing::debug!("Session changed: signed in as {}", a.id),
            None => tracing::debug!("Session changed: signed out"),
        }
        self.tx.send_replace(account);
    }

    pub fn current(&self) -> Option<Account> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer-side handle. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<Option<Account>>,
}

impl SessionSubscription {
    /// Value as of the last notification seen (or subscription time).
    pub fn latest(&self) -> Option<Account> {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return the new value.
    ///
    /// Returns `None` once the provider has dropped its channel.
    pub async fn changed(&mut self) -> Option<Option<Account>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// The root's view of the session: the latest value plus the live
/// subscription that keeps it current.
#[derive(Debug)]
pub struct SessionObserver {
    subscription: Option<SessionSubscription>,
    latest: Option<Account>,
}

impl SessionObserver {
    pub fn new(subscription: SessionSubscription) -> Self {
        let latest = subscription.latest();
        Self {
            subscription: Some(subscription),
            latest,
        }
    }

    pub fn latest(&self) -> Option<&Account> {
        self.latest.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Wait for the next session notification and record it.
    ///
    /// Returns `false` exactly once, when the provider goes away; the last
    /// value is kept and later calls never resolve.
    pub async fn changed(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return std::future::pending().await;
        };

        match subscription.changed().await {
            Some(account) => {
                self.latest = account;
                true
            }
            None => {
                tracing::warn!("Identity provider closed the session channel");
                self.subscription = None;
                false
            }
        }
    }

    pub fn unsubscribe(&mut self) {
        if self.subscription.take().is_some() {
            tracing::debug!("Session observer unsubscribed");
        }
    }
}
