use std::sync::Arc;

use alumni_common::{messages, UserProfile};
use chrono::{DateTime, Local};

use crate::busy::BusyFlag;
use crate::profile::ProfileRepository;
use crate::provider::{Account, IdentityProvider};
use crate::screens::EditProfileScreen;

/// Profile fields as displayed, placeholders already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    pub greeting_name: String,
    pub email: String,
    pub academic_title: String,
    pub graduation_year: String,
    pub registered_on: String,
}

/// Home screen: shows the signed-in account's profile.
///
/// Fetch failures are logged and never block the screen; the last profile
/// fetched successfully stays on display.
pub struct HomeScreen {
    identity: Arc<dyn IdentityProvider>,
    profiles: ProfileRepository,
    profile: Option<UserProfile>,
    loading: bool,
    refreshing: BusyFlag,
}

impl HomeScreen {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: ProfileRepository) -> Self {
        Self {
            identity,
            profiles,
            profile: None,
            loading: true,
            refreshing: BusyFlag::new(),
        }
    }

    /// Initial fetch when the screen is shown.
    pub async fn mount(&mut self) {
        self.fetch().await;
        self.loading = false;
    }

    /// Pull-to-refresh. The refresh indicator is raised until the fetch
    /// settles; `&mut self` rules out overlapping refreshes.
    pub async fn refresh(&mut self) {
        let indicator = self.refreshing.clone();
        let _guard = indicator.try_acquire();
        self.fetch().await;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Refresh indicator, observable while `refresh` runs.
    pub fn refresh_indicator(&self) -> BusyFlag {
        self.refreshing.clone()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn card(&self) -> ProfileCard {
        let account = self.identity.current_account();
        profile_card(self.profile.as_ref(), account.as_ref())
    }

    /// Edit screen pre-filled with the profile currently on display.
    pub fn open_editor(&self) -> EditProfileScreen {
        EditProfileScreen::new(
            self.identity.clone(),
            self.profiles.clone(),
            self.profile.clone().unwrap_or_default(),
        )
    }

    async fn fetch(&mut self) {
        let Some(account) = self.identity.current_account() else {
            tracing::debug!("No signed-in account, skipping profile fetch");
            return;
        };

        match self.profiles.fetch(&account.id).await {
            Ok(Some(profile)) => self.profile = Some(profile),
            Ok(None) => {
                tracing::info!("No profile document for {}", account.id);
                self.profile = None;
            }
            Err(e) => tracing::error!("Failed to load profile for {}: {}", account.id, e),
        }
    }
}

fn profile_card(profile: Option<&UserProfile>, account: Option<&Account>) -> ProfileCard {
    let field = |value: Option<&String>| value.cloned().unwrap_or_else(|| messages::UNSPECIFIED.to_string());

    let email = profile
        .and_then(|p| p.email.clone())
        .or_else(|| account.and_then(|a| a.email.clone()))
        .unwrap_or_default();

    ProfileCard {
        greeting_name: profile
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| messages::NAME_PLACEHOLDER.to_string()),
        email,
        academic_title: field(profile.and_then(|p| p.academic_title.as_ref())),
        graduation_year: profile
            .and_then(|p| p.graduation_year)
            .map(|y| y.to_string())
            .unwrap_or_else(|| messages::UNSPECIFIED.to_string()),
        registered_on: profile
            .and_then(|p| p.registered_at.as_deref())
            .and_then(format_date)
            .unwrap_or_else(|| messages::UNAVAILABLE.to_string()),
    }
}

/// Local calendar date of an ISO-8601 timestamp, `dd/mm/yyyy`.
fn format_date(timestamp: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(timestamp).ok()?;
    Some(parsed.with_timezone(&Local).format("%d/%m/%Y").to_string())
}
