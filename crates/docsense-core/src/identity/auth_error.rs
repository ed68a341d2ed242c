//! Identity provider failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure reported by the identity provider.
///
/// Providers identify failures by a string code (`auth/wrong-password`, ...).
/// The code is kept verbatim; [`AuthError::user_message`] maps it onto the
/// fixed set of messages shown inline on the sign-in form.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}")]
pub struct AuthError {
    /// Provider error code
    pub code: String,
}

impl AuthError {
    pub const INVALID_CREDENTIAL: &'static str = "auth/invalid-credential";
    pub const WRONG_PASSWORD: &'static str = "auth/wrong-password";
    pub const USER_NOT_FOUND: &'static str = "auth/user-not-found";
    pub const EMAIL_ALREADY_IN_USE: &'static str = "auth/email-already-in-use";
    pub const WEAK_PASSWORD: &'static str = "auth/weak-password";
    pub const POPUP_CLOSED_BY_USER: &'static str = "auth/popup-closed-by-user";
    pub const INVALID_EMAIL: &'static str = "auth/invalid-email";

    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// The message displayed to the user for this failure.
    ///
    /// Unrecognised codes map to a generic message.
    pub fn user_message(&self) -> &'static str {
        match self.code.as_str() {
            Self::INVALID_CREDENTIAL | Self::WRONG_PASSWORD => "Invalid email or password.",
            Self::USER_NOT_FOUND => "No account found for that email.",
            Self::EMAIL_ALREADY_IN_USE => "That email is already in use.",
            Self::WEAK_PASSWORD => "Password is too weak.",
            Self::POPUP_CLOSED_BY_USER => "Google sign-in was cancelled.",
            _ => "Authentication failed. Please try again.",
        }
    }
}
