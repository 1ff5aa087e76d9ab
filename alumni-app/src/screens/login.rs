use std::sync::Arc;

use alumni_common::LoginForm;

use crate::busy::BusyFlag;
use crate::error::{Error, Result};
use crate::provider::{Account, IdentityProvider};

/// Sign-in screen for existing accounts.
pub struct LoginScreen {
    identity: Arc<dyn IdentityProvider>,
    form: LoginForm,
    busy: BusyFlag,
}

impl LoginScreen {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            form: LoginForm::default(),
            busy: BusyFlag::new(),
        }
    }

    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LoginForm {
        &mut self.form
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    pub async fn submit(&self) -> Result<Account> {
        let _guard = self.busy.try_acquire().ok_or(Error::Busy)?;
        let request = self.form.validate()?;

        let account = self
            .identity
            .sign_in(&request.email, &request.password)
            .await
            .map_err(|e| {
                tracing::warn!("Sign-in failed for {}: {}", request.email, e);
                Error::from_auth(e)
            })?;

        tracing::info!("Signed in {}", account.id);
        Ok(account)
    }
}
