//! Confirmed sign-out.

use async_trait::async_trait;

use alumni_common::messages;

use crate::error::{Error, Result};
use crate::provider::IdentityProvider;

/// Two-option confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: &'static str,
    pub message: &'static str,
    pub cancel_label: &'static str,
    pub confirm_label: &'static str,
}

impl Prompt {
    pub fn logout() -> Self {
        Self {
            title: messages::TITLE_LOGOUT,
            message: messages::LOGOUT_CONFIRMATION,
            cancel_label: messages::OPTION_CANCEL,
            confirm_label: messages::OPTION_LOGOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Cancel,
    Confirm,
}

/// Presents a prompt and waits for the user's choice.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, prompt: &Prompt) -> PromptChoice;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    Cancelled,
    SignedOut,
}

/// Ask for confirmation, then sign out.
///
/// The screen does not navigate afterwards: the root reacts to the session
/// change.
pub async fn confirm_and_sign_out(
    identity: &dyn IdentityProvider,
    prompt: &dyn ConfirmPrompt,
) -> Result<LogoutOutcome> {
    if prompt.confirm(&Prompt::logout()).await == PromptChoice::Cancel {
        tracing::debug!("Sign-out cancelled");
        return Ok(LogoutOutcome::Cancelled);
    }

    identity.sign_out().await.map_err(|e| {
        tracing::error!("Sign-out failed: {}", e);
        Error::SignOutFailed(e)
    })?;

    tracing::info!("Signed out");
    Ok(LogoutOutcome::SignedOut)
}
