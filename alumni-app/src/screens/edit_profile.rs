use std::sync::Arc;

use alumni_common::{current_year, timestamp_now, EditProfileForm, ProfileUpdate, UserProfile};

use crate::busy::BusyFlag;
use crate::error::{Error, Result};
use crate::profile::ProfileRepository;
use crate::provider::IdentityProvider;

/// Profile editor.
///
/// Only name, academic title and graduation year are editable. The email
/// is displayed read-only and never written; neither is the registration
/// date.
pub struct EditProfileScreen {
    identity: Arc<dyn IdentityProvider>,
    profiles: ProfileRepository,
    original: UserProfile,
    form: EditProfileForm,
    busy: BusyFlag,
}

impl EditProfileScreen {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: ProfileRepository, profile: UserProfile) -> Self {
        Self {
            identity,
            profiles,
            form: EditProfileForm::from_profile(&profile),
            original: profile,
            busy: BusyFlag::new(),
        }
    }

    pub fn form(&self) -> &EditProfileForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EditProfileForm {
        &mut self.form
    }

    /// Email shown in the read-only field.
    pub fn email(&self) -> String {
        self.original
            .email
            .clone()
            .or_else(|| self.identity.current_account().and_then(|a| a.email))
            .unwrap_or_default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    /// Discard edits without writing anything.
    pub fn cancel(&mut self) {
        self.form = EditProfileForm::from_profile(&self.original);
    }

    /// Validate and write the partial update. Returns what was written.
    pub async fn submit(&self) -> Result<ProfileUpdate> {
        let _guard = self.busy.try_acquire().ok_or(Error::Busy)?;
        let edit = self.form.validate(current_year())?;

        let Some(account) = self.identity.current_account() else {
            tracing::warn!("Profile edit submitted with no signed-in account");
            return Err(Error::NotSignedIn);
        };

        let update = edit.into_update(timestamp_now());
        self.profiles.update(&account.id, &update).await.map_err(|e| {
            tracing::error!("Profile update failed for {}: {}", account.id, e);
            Error::UpdateFailed(e)
        })?;

        tracing::info!("Updated profile {}", account.id);
        Ok(update)
    }
}
