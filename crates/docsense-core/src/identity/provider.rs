//! Identity provider trait.

use super::auth_error::AuthError;
use super::model::Identity;
use async_trait::async_trait;
use tokio::sync::watch;

/// The identity provider surface consumed by the client.
///
/// Implementations own the identity state. The client never writes it; it
/// reads the current snapshot and listens for changes through
/// [`IdentityProvider::subscribe`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the currently signed-in user, if any.
    fn current_user(&self) -> Option<Identity>;

    /// Signs in with email and password.
    ///
    /// # Returns
    ///
    /// - `Ok(Identity)`: The signed-in user
    /// - `Err(AuthError)`: The provider rejected the credentials
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Creates an account and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Signs in through the Google flow.
    async fn sign_in_with_google(&self) -> Result<Identity, AuthError>;

    /// Signs the current user out.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Returns a receiver that observes every identity change.
    ///
    /// The receiver's current value is the snapshot at subscription time.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}
