//! Process root.
//!
//! Starts the splash gate and the single session subscription together,
//! then drives the router from session notifications and navigation
//! commands. The current `RootView` is published on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::provider::IdentityProvider;
use crate::router::{RootView, Router, Screen};
use crate::session::SessionObserver;
use crate::splash::SplashGate;

#[derive(Debug)]
enum Command {
    Navigate(Screen),
    GoBack,
}

/// Handle to the running root.
pub struct App {
    views: watch::Receiver<RootView>,
    commands: mpsc::UnboundedSender<Command>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl App {
    /// Start the root: splash timer and session subscription begin together.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(identity: Arc<dyn IdentityProvider>, splash: Duration) -> Self {
        let gate = SplashGate::start(splash);
        let observer = SessionObserver::new(identity.subscribe());

        let (view_tx, views) = watch::channel(RootView::Splash);
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();

        tracing::info!("Starting root, splash for {}ms", splash.as_millis());
        let task = tokio::spawn(run_root(gate, observer, command_rx, shutdown_rx, view_tx));

        Self {
            views,
            commands,
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    /// What the root renders right now.
    pub fn view(&self) -> RootView {
        self.views.borrow().clone()
    }

    /// Receiver notified on every view change.
    pub fn views(&self) -> watch::Receiver<RootView> {
        self.views.clone()
    }

    /// Push a screen of the mounted flow. Ignored while the splash is up.
    pub fn navigate(&self, screen: Screen) {
        let _ = self.commands.send(Command::Navigate(screen));
    }

    pub fn go_back(&self) {
        let _ = self.commands.send(Command::GoBack);
    }

    /// Clear the splash timer, drop the session subscription and wait for
    /// the root task to finish.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Root task failed: {}", e);
            }
        }
        tracing::info!("Root stopped");
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_root(
    gate: SplashGate,
    mut observer: SessionObserver,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut shutdown: oneshot::Receiver<()>,
    views: watch::Sender<RootView>,
) {
    let mut router = Router::new();
    let mut splash_done = false;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            _ = gate.opened(), if !splash_done => {
                splash_done = true;
                tracing::debug!("Splash elapsed");
                router.apply_session(observer.latest());
                publish(&views, &router);
            }

            changed = observer.changed() => {
                // Before the gate opens the observer just records the value.
                if changed && splash_done && router.apply_session(observer.latest()) {
                    publish(&views, &router);
                }
            }

            Some(command) = commands.recv() => {
                if !splash_done {
                    tracing::debug!("Ignoring {:?} during splash", command);
                    continue;
                }
                match command {
                    Command::Navigate(screen) => {
                        if let Err(e) = router.navigate(screen) {
                            tracing::warn!("Navigation rejected: {}", e);
                        }
                    }
                    Command::GoBack => {
                        router.go_back();
                    }
                }
                publish(&views, &router);
            }
        }
    }

    observer.unsubscribe();
}

fn publish(views: &watch::Sender<RootView>, router: &Router) {
    let next = router.view();
    views.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
