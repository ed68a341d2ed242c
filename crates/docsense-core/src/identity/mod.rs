//! Identity domain module.
//!
//! The identity provider is an external collaborator. This module only
//! describes what the client consumes from it: a read-only user snapshot,
//! the sign-in surface, and the mapping from provider error codes to
//! user-facing messages.
//!
//! # Module Structure
//!
//! - `model`: The signed-in user (`Identity`)
//! - `auth_error`: Provider failures (`AuthError`) and their messages
//! - `provider`: The provider trait (`IdentityProvider`)

mod auth_error;
mod model;
mod provider;

// Re-export public API
pub use auth_error::AuthError;
pub use model::Identity;
pub use provider::IdentityProvider;
