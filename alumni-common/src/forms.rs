//! Typed form records.
//!
//! Each screen owns one of these. Field keys match the stored document names
//! so a form can be built from key/value pairs; unknown keys are rejected.

use std::fmt;

use serde::Deserialize;

use crate::profile::{NewProfile, ProfileUpdate, UserProfile};
use crate::validation::{is_present, parse_graduation_year, ValidationError, MIN_PASSWORD_LEN};

/// Error building a form from named fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

// ============================================================================
// Registration
// ============================================================================

/// Raw registration input, exactly as typed.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterForm {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "confirmPassword", default)]
    pub confirm_password: String,
    #[serde(rename = "tituloUniversitario", default)]
    pub academic_title: String,
    #[serde(rename = "anoGraduacion", default)]
    pub graduation_year: String,
}

impl RegisterForm {
    /// Build a form from `(field, value)` pairs.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = Self::default();
        for (field, value) in fields {
            form.set(field, value)?;
        }
        Ok(form)
    }

    /// Update a single field by its stored name.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "nombre" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            "confirmPassword" => self.confirm_password = value.to_string(),
            "tituloUniversitario" => self.academic_title = value.to_string(),
            "anoGraduacion" => self.graduation_year = value.to_string(),
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Apply the registration rules in order; the first failure wins.
    pub fn validate(&self, current_year: i32) -> Result<Registration, ValidationError> {
        let required = [
            &self.name,
            &self.email,
            &self.password,
            &self.confirm_password,
            &self.academic_title,
            &self.graduation_year,
        ];
        if !required.iter().all(|v| is_present(v)) {
            return Err(ValidationError::MissingFields);
        }

        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }

        let graduation_year = parse_graduation_year(&self.graduation_year, current_year)?;

        Ok(Registration {
            name: self.name.clone(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            academic_title: self.academic_title.clone(),
            graduation_year,
        })
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .field("academic_title", &self.academic_title)
            .field("graduation_year", &self.graduation_year)
            .finish()
    }
}

/// Registration input that passed validation.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub academic_title: String,
    pub graduation_year: i32,
}

impl Registration {
    /// The profile document to create for the new account.
    pub fn profile(&self, registered_at: String) -> NewProfile {
        NewProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            academic_title: self.academic_title.clone(),
            graduation_year: self.graduation_year,
            registered_at,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("academic_title", &self.academic_title)
            .field("graduation_year", &self.graduation_year)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Login
// ============================================================================

/// Raw sign-in input.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = Self::default();
        for (field, value) in fields {
            form.set(field, value)?;
        }
        Ok(form)
    }

    pub fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<SignInRequest, ValidationError> {
        if !is_present(&self.email) || self.password.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(SignInRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Credentials that passed validation.
#[derive(Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Profile edit
// ============================================================================

/// Raw edit input. The email is not part of the form: it is shown read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditProfileForm {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "tituloUniversitario", default)]
    pub academic_title: String,
    #[serde(rename = "anoGraduacion", default)]
    pub graduation_year: String,
}

impl EditProfileForm {
    /// Pre-fill the form from the profile currently on screen.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone().unwrap_or_default(),
            academic_title: profile.academic_title.clone().unwrap_or_default(),
            graduation_year: profile
                .graduation_year
                .map(|y| y.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn from_fields<'a, I>(fields: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = Self::default();
        for (field, value) in fields {
            form.set(field, value)?;
        }
        Ok(form)
    }

    /// Update a single field. `email` is read-only and rejected like any
    /// other unknown key.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "nombre" => self.name = value.to_string(),
            "tituloUniversitario" => self.academic_title = value.to_string(),
            "anoGraduacion" => self.graduation_year = value.to_string(),
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Presence check, then graduation year.
    pub fn validate(&self, current_year: i32) -> Result<ProfileEdit, ValidationError> {
        let required = [&self.name, &self.academic_title, &self.graduation_year];
        if !required.iter().all(|v| is_present(v)) {
            return Err(ValidationError::MissingFields);
        }

        let graduation_year = parse_graduation_year(&self.graduation_year, current_year)?;

        Ok(ProfileEdit {
            name: self.name.clone(),
            academic_title: self.academic_title.clone(),
            graduation_year,
        })
    }
}

/// Edit input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEdit {
    pub name: String,
    pub academic_title: String,
    pub graduation_year: i32,
}

impl ProfileEdit {
    pub fn into_update(self, updated_at: String) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name,
            academic_title: self.academic_title,
            graduation_year: self.graduation_year,
            updated_at,
        }
    }
}
