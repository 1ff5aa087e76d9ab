//! Screen controllers.
//!
//! Each controller owns its form state and a busy flag, runs the screen's
//! submit flow against the provider traits and reports failures as
//! [`crate::Error`]. Navigation is never triggered from here: the root
//! follows the session, so a successful sign-in or sign-out moves the app
//! on its own.

pub mod edit_profile;
pub mod home;
pub mod login;
pub mod logout;
pub mod register;

pub use edit_profile::EditProfileScreen;
pub use home::{HomeScreen, ProfileCard};
pub use login::LoginScreen;
pub use logout::{confirm_and_sign_out, ConfirmPrompt, LogoutOutcome, Prompt, PromptChoice};
pub use register::RegisterScreen;

use alumni_common::messages;

use crate::error::Error;

/// Modal alert content shown after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
}

impl Alert {
    pub fn success(message: &str) -> Self {
        Self {
            title: messages::TITLE_SUCCESS,
            message: message.to_string(),
        }
    }

    pub fn error(error: &Error) -> Self {
        Self {
            title: messages::TITLE_ERROR,
            message: error.user_message(),
        }
    }
}
