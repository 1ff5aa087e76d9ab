//! Session-gated navigation.
//!
//! The router mounts one of two flows from the latest session value and keeps
//! a screen stack inside it. The flow is recomputed from the latest value
//! only; no session history is kept.

use crate::provider::Account;

/// Every screen the client can show after the splash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Register,
    Home,
    EditProfile,
}

impl Screen {
    /// Whether the screen belongs to the signed-in flow.
    pub fn requires_account(self) -> bool {
        matches!(self, Screen::Home | Screen::EditProfile)
    }
}

/// The mounted navigation subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Unauthenticated,
    Authenticated(Account),
}

impl Flow {
    pub fn from_session(session: Option<&Account>) -> Self {
        match session {
            Some(account) => Flow::Authenticated(account.clone()),
            None => Flow::Unauthenticated,
        }
    }

    pub fn initial_screen(&self) -> Screen {
        match self {
            Flow::Unauthenticated => Screen::Login,
            Flow::Authenticated(_) => Screen::Home,
        }
    }

    fn accepts(&self, screen: Screen) -> bool {
        screen.requires_account() == matches!(self, Flow::Authenticated(_))
    }
}

/// What the root renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootView {
    Splash,
    Unauthenticated(Screen),
    Authenticated { account: Account, screen: Screen },
}

impl RootView {
    pub fn screen(&self) -> Option<Screen> {
        match self {
            RootView::Splash => None,
            RootView::Unauthenticated(screen) => Some(*screen),
            RootView::Authenticated { screen, .. } => Some(*screen),
        }
    }

    pub fn is_splash(&self) -> bool {
        matches!(self, RootView::Splash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("No flow is mounted yet")]
    NotMounted,
    #[error("Screen {0:?} is not part of the mounted flow")]
    WrongFlow(Screen),
}

/// Flow selection plus the per-flow screen stack.
#[derive(Debug, Default)]
pub struct Router {
    flow: Option<Flow>,
    stack: Vec<Screen>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flow(&self) -> Option<&Flow> {
        self.flow.as_ref()
    }

    pub fn current(&self) -> Option<Screen> {
        self.stack.last().copied()
    }

    /// Mount the flow for `session`. A different flow (or a different
    /// account) resets the stack to the flow's initial screen; the same flow
    /// leaves it untouched. Returns whether the flow changed.
    pub fn apply_session(&mut self, session: Option<&Account>) -> bool {
        let next = Flow::from_session(session);
        if self.flow.as_ref() == Some(&next) {
            return false;
        }

        tracing::info!(
            "Mounting {} flow",
            match next {
                Flow::Unauthenticated => "unauthenticated",
                Flow::Authenticated(_) => "authenticated",
            }
        );
        self.stack = vec![next.initial_screen()];
        self.flow = Some(next);
        true
    }

    /// Push a screen of the mounted flow.
    pub fn navigate(&mut self, screen: Screen) -> Result<(), NavigationError> {
        let flow = self.flow.as_ref().ok_or(NavigationError::NotMounted)?;
        if !flow.accepts(screen) {
            return Err(NavigationError::WrongFlow(screen));
        }
        if self.current() != Some(screen) {
            self.stack.push(screen);
        }
        Ok(())
    }

    /// Pop the top screen, never below the flow's initial screen.
    pub fn go_back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// View for the current state; `Splash` until a flow is mounted.
    pub fn view(&self) -> RootView {
        match (&self.flow, self.current()) {
            (Some(Flow::Unauthenticated), Some(screen)) => RootView::Unauthenticated(screen),
            (Some(Flow::Authenticated(account)), Some(screen)) => RootView::Authenticated {
                account: account.clone(),
                screen,
            },
            _ => RootView::Splash,
        }
    }
}
