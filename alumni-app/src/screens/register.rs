use std::sync::Arc;

use alumni_common::{current_year, timestamp_now, RegisterForm};

use crate::busy::BusyFlag;
use crate::error::{Error, Result};
use crate::profile::ProfileRepository;
use crate::provider::{Account, IdentityProvider};

/// Registration screen.
///
/// Submitting validates locally, creates the account (which signs it in)
/// and writes the profile document. The form keeps its contents on every
/// failure.
pub struct RegisterScreen {
    identity: Arc<dyn IdentityProvider>,
    profiles: ProfileRepository,
    form: RegisterForm,
    busy: BusyFlag,
}

impl RegisterScreen {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: ProfileRepository) -> Self {
        Self {
            identity,
            profiles,
            form: RegisterForm::default(),
            busy: BusyFlag::new(),
        }
    }

    pub fn form(&self) -> &RegisterForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RegisterForm {
        &mut self.form
    }

    /// Whether a submission is in flight; the submit trigger is disabled
    /// while set.
    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    pub async fn submit(&self) -> Result<Account> {
        let _guard = self.busy.try_acquire().ok_or(Error::Busy)?;

        let registration = self.form.validate(current_year()).map_err(|e| {
            tracing::debug!("Registration rejected locally: {}", e);
            e
        })?;

        let account = self
            .identity
            .create_account(&registration.email, &registration.password)
            .await
            .map_err(|e| {
                tracing::warn!("Account creation failed for {}: {}", registration.email, e);
                Error::from_auth(e)
            })?;

        // The account exists and is signed in from here on.
        let profile = registration.profile(timestamp_now());
        self.profiles.create(&account.id, &profile).await.map_err(|e| {
            tracing::error!("Profile creation failed for {}: {}", account.id, e);
            Error::from_auth(e)
        })?;

        tracing::info!("Registered account {}", account.id);
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{codes, MockDocumentStore, MockIdentityProvider, ProviderError};
    use crate::test_util::{ana_registration, test_account, MemoryIdentity, MemoryStore};
    use alumni_common::ValidationError;
    use rstest::rstest;
    use serde_json::json;
    use std::time::Duration;

    fn untouched_backends() -> (Arc<dyn IdentityProvider>, ProfileRepository) {
        let mut identity = MockIdentityProvider::new();
        identity.expect_create_account().never();
        let mut store = MockDocumentStore::new();
        store.expect_create().never();
        (Arc::new(identity), ProfileRepository::new(Arc::new(store)))
    }

    #[rstest]
    #[case("email", "", ValidationError::MissingFields)]
    #[case("nombre", "   ", ValidationError::MissingFields)]
    #[case("confirmPassword", "1234567", ValidationError::PasswordMismatch)]
    #[case("anoGraduacion", "1900", ValidationError::InvalidGraduationYear)]
    #[case("anoGraduacion", "20x0", ValidationError::InvalidGraduationYear)]
    #[tokio::test]
    async fn test_invalid_input_never_reaches_backend(
        #[case] field: &str,
        #[case] value: &str,
        #[case] expected: ValidationError,
    ) {
        let (identity, profiles) = untouched_backends();
        let mut screen = RegisterScreen::new(identity, profiles);
        *screen.form_mut() = ana_registration();
        screen.form_mut().set(field, value).unwrap();

        let err = screen.submit().await.unwrap_err();
        assert!(matches!(err, Error::Validation(e) if e == expected));
        assert!(err.is_local());
        assert!(!screen.is_busy());
    }

    #[tokio::test]
    async fn test_short_password_never_reaches_backend() {
        let (identity, profiles) = untouched_backends();
        let mut screen = RegisterScreen::new(identity, profiles);
        *screen.form_mut() = ana_registration();
        screen.form_mut().set("password", "12345").unwrap();
        screen.form_mut().set("confirmPassword", "12345").unwrap();

        let err = screen.submit().await.unwrap_err();
        assert_eq!(err.user_message(), "La contraseña debe tener al menos 6 caracteres");
    }

    #[tokio::test]
    async fn test_successful_registration_writes_profile() {
        let identity = Arc::new(MemoryIdentity::new());
        let store = Arc::new(MemoryStore::new());
        let mut screen = RegisterScreen::new(identity.clone(), ProfileRepository::new(store.clone()));
        *screen.form_mut() = ana_registration();

        let account = screen.submit().await.unwrap();
        assert_eq!(identity.current_account(), Some(account.clone()));

        let stored = store.get("usuarios", account.id.as_str()).await.unwrap();
        assert_eq!(stored["nombre"], json!("Ana"));
        assert_eq!(stored["email"], json!("a@x.com"));
        assert_eq!(stored["tituloUniversitario"], json!("Ing."));
        assert_eq!(stored["anoGraduacion"], json!(2020));
        assert!(!stored["fechaRegistro"].as_str().unwrap().is_empty());
        assert!(!stored.contains_key("password"));
        assert!(!stored.contains_key("confirmPassword"));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_reported() {
        let identity = Arc::new(MemoryIdentity::new());
        let store = Arc::new(MemoryStore::new());
        let mut screen = RegisterScreen::new(identity.clone(), ProfileRepository::new(store.clone()));
        *screen.form_mut() = ana_registration();

        screen.submit().await.unwrap();
        let err = screen.submit().await.unwrap_err();

        assert!(matches!(err, Error::EmailAlreadyInUse));
        assert_eq!(err.user_message(), "Este correo electrónico ya está registrado");
        assert_eq!(store.len().await, 1);
        assert_eq!(screen.form(), &ana_registration());
    }

    #[tokio::test]
    async fn test_unmapped_provider_error_shows_provider_text() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_create_account()
            .times(1)
            .returning(|_, _| Err(ProviderError::new("auth/operation-not-allowed", "Sign-up is disabled")));
        let mut store = MockDocumentStore::new();
        store.expect_create().never();

        let mut screen = RegisterScreen::new(Arc::new(identity), ProfileRepository::new(Arc::new(store)));
        *screen.form_mut() = ana_registration();

        let err = screen.submit().await.unwrap_err();
        assert_eq!(err.user_message(), "Sign-up is disabled");
    }

    #[tokio::test]
    async fn test_profile_failure_after_account_creation() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_create_account()
            .times(1)
            .returning(|email, _| Ok(test_account("uid-ana", email)));
        let mut store = MockDocumentStore::new();
        store
            .expect_create()
            .withf(|collection, key, _| collection == "usuarios" && key == "uid-ana")
            .times(1)
            .returning(|_, _, _| Err(ProviderError::new(codes::PERMISSION_DENIED, "")));

        let mut screen = RegisterScreen::new(Arc::new(identity), ProfileRepository::new(Arc::new(store)));
        *screen.form_mut() = ana_registration();

        let err = screen.submit().await.unwrap_err();
        assert!(matches!(&err, Error::Provider(e) if e.is(codes::PERMISSION_DENIED)));
        assert_eq!(err.user_message(), "Error al registrar usuario");
        assert!(!screen.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submit_while_busy_is_rejected() {
        let identity = Arc::new(MemoryIdentity::with_latency(Duration::from_millis(500)));
        let store = Arc::new(MemoryStore::new());
        let mut screen = RegisterScreen::new(identity.clone(), ProfileRepository::new(store.clone()));
        *screen.form_mut() = ana_registration();

        let (first, second) = tokio::join!(screen.submit(), async {
            tokio::task::yield_now().await;
            assert!(screen.is_busy());
            screen.submit().await
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(Error::Busy)));
        assert_eq!(identity.create_calls(), 1);
        assert!(!screen.is_busy());
    }
}
