//! Alumni Common Types
//!
//! Shared types used by the alumni client core: the stored profile document,
//! the typed form records and the rules that validate them.

pub mod forms;
pub mod messages;
pub mod profile;
pub mod validation;

pub use forms::{
    EditProfileForm, FormError, LoginForm, ProfileEdit, Registration, RegisterForm, SignInRequest,
};
pub use profile::{timestamp_now, NewProfile, ProfileUpdate, UserProfile, PROFILE_COLLECTION};
pub use validation::{
    current_year, parse_graduation_year, ValidationError, MAX_YEAR_DIGITS, MIN_GRADUATION_YEAR,
    MIN_PASSWORD_LEN,
};
