//! Identity domain model.

use serde::{Deserialize, Serialize};

/// The signed-in user as seen by the client.
///
/// The id is opaque and is sent as the caller identity on every backend
/// request. The email is only used for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque caller identifier
    pub id: String,
    /// Display email, when the provider knows one
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }

    /// Email if present, otherwise the opaque id.
    pub fn display_label(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }

    /// Up to two upper-cased initials derived from the email's local part.
    ///
    /// The local part is split on non-word characters and the first letter of
    /// each piece is kept. Returns `None` when there is no email or nothing
    /// usable in it.
    pub fn initials(&self) -> Option<String> {
        let email = self.email.as_deref()?;
        let local = email.split('@').next().unwrap_or_default();
        let initials: String = local
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect();

        if initials.is_empty() {
            None
        } else {
            Some(initials)
        }
    }
}
