//! Field rules shared by the registration and edit forms.

use chrono::Datelike;

use crate::messages;

/// Earliest graduation year a profile may carry.
pub const MIN_GRADUATION_YEAR: i32 = 1950;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// The year input field accepts at most this many characters.
pub const MAX_YEAR_DIGITS: usize = 4;

/// A local validation failure. Raised before any backend call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("one or more required fields are empty")]
    MissingFields,
    #[error("password and confirmation do not match")]
    PasswordMismatch,
    #[error("password is shorter than {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("graduation year is not between {} and the current year", MIN_GRADUATION_YEAR)]
    InvalidGraduationYear,
}

impl ValidationError {
    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingFields => messages::ALL_FIELDS_REQUIRED,
            ValidationError::PasswordMismatch => messages::PASSWORDS_DO_NOT_MATCH,
            ValidationError::PasswordTooShort => messages::PASSWORD_TOO_SHORT,
            ValidationError::InvalidGraduationYear => messages::INVALID_GRADUATION_YEAR,
        }
    }
}

/// Current calendar year in the device's local time zone.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Parse a raw graduation-year input and check it lies in
/// `[MIN_GRADUATION_YEAR, current_year]`.
///
/// Surrounding whitespace is ignored. Anything that is not a plain decimal
/// integer of at most `MAX_YEAR_DIGITS` characters is rejected the same way as
/// an out-of-range year.
pub fn parse_graduation_year(raw: &str, current_year: i32) -> Result<i32, ValidationError> {
    let raw = raw.trim();
    if raw.chars().count() > MAX_YEAR_DIGITS {
        return Err(ValidationError::InvalidGraduationYear);
    }

    let year: i32 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidGraduationYear)?;

    if (MIN_GRADUATION_YEAR..=current_year).contains(&year) {
        Ok(year)
    } else {
        Err(ValidationError::InvalidGraduationYear)
    }
}

/// True when the field holds something other than whitespace.
pub(crate) fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}
