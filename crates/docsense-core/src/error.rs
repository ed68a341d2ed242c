//! Error types for the DocSense client.

use crate::identity::AuthError;
use thiserror::Error;

/// A shared error type for the entire DocSense client.
///
/// Validation skips (blank input) and busy rejections are not errors; they are
/// reported through the outcome enums of the controllers. Everything that can
/// go wrong while talking to the backend or the identity provider lands here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocsenseError {
    /// Network or connection failure before a reply was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Well-formed error reply from the backend
    #[error("Backend error (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Backend {
        status: u16,
        message: Option<String>,
    },

    /// OK status but a body that could not be used
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Identity provider failure
    #[error("Authentication error: {0}")]
    Auth(AuthError),

    /// No signed-in user and no fallback caller id configured
    #[error("No caller identity available")]
    Unauthenticated,

    /// An operation of the same kind is already in flight
    #[error("Operation already in progress: {0}")]
    Busy(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocsenseError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Backend error
    pub fn backend(status: u16, message: Option<String>) -> Self {
        Self::Backend { status, message }
    }

    /// Creates a MalformedResponse error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates a Busy error
    pub fn busy(operation: impl Into<String>) -> Self {
        Self::Busy(operation.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Backend error
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Check if this is a Busy error
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DocsenseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<AuthError> for DocsenseError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

/// A type alias for `Result<T, DocsenseError>`.
pub type Result<T> = std::result::Result<T, DocsenseError>;
