//! Error types for the client flows.

use alumni_common::{messages, ValidationError};

use crate::provider::{codes, ProviderError};

/// Failure of a screen action. Every variant leaves the screen interactive
/// and resubmittable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Email already registered")]
    EmailAlreadyInUse,

    #[error("Malformed email")]
    InvalidEmail,

    #[error("Password rejected as weak")]
    WeakPassword,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Too many attempts")]
    TooManyRequests,

    /// Unmapped provider failure; the provider's text is shown as-is.
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    #[error("Profile update failed: {0}")]
    UpdateFailed(#[source] ProviderError),

    #[error("Sign-out failed: {0}")]
    SignOutFailed(#[source] ProviderError),

    #[error("No account is signed in")]
    NotSignedIn,

    #[error("A request is already in progress")]
    Busy,
}

impl Error {
    /// Map an identity-provider failure to the user-facing taxonomy.
    pub fn from_auth(e: ProviderError) -> Self {
        match e.code.as_str() {
            codes::EMAIL_ALREADY_IN_USE => Error::EmailAlreadyInUse,
            codes::INVALID_EMAIL => Error::InvalidEmail,
            codes::WEAK_PASSWORD => Error::WeakPassword,
            codes::USER_NOT_FOUND | codes::WRONG_PASSWORD | codes::INVALID_CREDENTIAL => {
                Error::InvalidCredentials
            }
            codes::TOO_MANY_REQUESTS => Error::TooManyRequests,
            _ => Error::Provider(e),
        }
    }

    /// Text shown to the user in the error alert.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(e) => e.user_message().to_string(),
            Error::EmailAlreadyInUse => messages::EMAIL_ALREADY_IN_USE.to_string(),
            Error::InvalidEmail => messages::INVALID_EMAIL.to_string(),
            Error::WeakPassword => messages::WEAK_PASSWORD.to_string(),
            Error::InvalidCredentials => messages::INVALID_CREDENTIALS.to_string(),
            Error::TooManyRequests => messages::TOO_MANY_REQUESTS.to_string(),
            Error::Provider(e) if e.message.is_empty() => messages::REGISTER_FAILED.to_string(),
            Error::Provider(e) => e.message.clone(),
            Error::UpdateFailed(_) | Error::NotSignedIn => messages::UPDATE_FAILED.to_string(),
            Error::SignOutFailed(_) => messages::SIGN_OUT_FAILED.to_string(),
            Error::Busy => messages::REQUEST_IN_PROGRESS.to_string(),
        }
    }

    /// Whether the failure was caught locally, before any backend call.
    pub fn is_local(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Busy | Error::NotSignedIn)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(codes::EMAIL_ALREADY_IN_USE, "Este correo electrónico ya está registrado")]
    #[case(codes::INVALID_EMAIL, "Correo electrónico inválido")]
    #[case(codes::WEAK_PASSWORD, "La contraseña es muy débil")]
    #[case(codes::WRONG_PASSWORD, "Correo electrónico o contraseña incorrectos")]
    #[case(codes::USER_NOT_FOUND, "Correo electrónico o contraseña incorrectos")]
    #[case(codes::INVALID_CREDENTIAL, "Correo electrónico o contraseña incorrectos")]
    fn test_mapped_auth_codes(#[case] code: &str, #[case] expected: &str) {
        let err = Error::from_auth(ProviderError::new(code, "raw provider text"));
        assert_eq!(err.user_message(), expected);
        assert!(!err.is_local());
    }

    #[test]
    fn test_unmapped_code_falls_back_to_provider_text() {
        let err = Error::from_auth(ProviderError::new("auth/operation-not-allowed", "Sign-up is disabled"));
        assert!(matches!(err, Error::Provider(_)));
        assert_eq!(err.user_message(), "Sign-up is disabled");
    }

    #[test]
    fn test_unmapped_code_without_text_uses_generic_message() {
        let err = Error::from_auth(ProviderError::new(codes::UNKNOWN, ""));
        assert_eq!(err.user_message(), "Error al registrar usuario");
    }

    #[test]
    fn test_validation_error_message() {
        let err: Error = ValidationError::PasswordMismatch.into();
        assert_eq!(err.user_message(), "Las contraseñas no coinciden");
        assert!(err.is_local());
    }

    #[test]
    fn test_update_failures_share_generic_message() {
        let failed = Error::UpdateFailed(ProviderError::new(codes::NOT_FOUND, "no document"));
        assert_eq!(failed.user_message(), "No se pudo actualizar la información");
        assert_eq!(Error::NotSignedIn.user_message(), failed.user_message());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Busy.to_string(), "A request is already in progress");
        let err = Error::SignOutFailed(ProviderError::network("offline"));
        assert!(err.to_string().contains("Sign-out failed"));
    }
}
