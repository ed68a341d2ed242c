//! In-memory identity provider for local development and tests.
//!
//! Accounts live only for the lifetime of the process. Failures use the same
//! provider codes a hosted provider would report, so the sign-in form maps
//! them the same way.

use async_trait::async_trait;
use docsense_core::identity::{AuthError, Identity, IdentityProvider};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    identity: Identity,
    password: String,
}

/// Identity provider backed by an in-process account table.
pub struct DevIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    google_identity: Option<Identity>,
    state: watch::Sender<Option<Identity>>,
}

impl DevIdentityProvider {
    /// Creates a provider with no accounts and nobody signed in.
    ///
    /// The Google flow reports `auth/popup-closed-by-user` until an identity
    /// is configured with [`DevIdentityProvider::with_google_identity`].
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            google_identity: None,
            state,
        }
    }

    pub fn with_google_identity(mut self, identity: Identity) -> Self {
        self.google_identity = Some(identity);
        self
    }

    /// Pre-registers an account without signing it in.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        {
            let mut accounts = self.lock_accounts();
            let email = normalize_email(email);
            accounts.insert(
                email.clone(),
                Account {
                    identity: Identity::new(uuid::Uuid::new_v4().to_string(), Some(email)),
                    password: password.to_string(),
                },
            );
        }
        self
    }

    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, Account>> {
        self.accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, identity: Option<Identity>) {
        tracing::info!(
            "[DevIdentityProvider] Identity changed: {}",
            identity
                .as_ref()
                .map(Identity::display_label)
                .unwrap_or("signed out")
        );
        // send_replace keeps the value even with no live receivers.
        self.state.send_replace(identity);
    }
}

impl Default for DevIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for DevIdentityProvider {
    fn current_user(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = {
            let accounts = self.lock_accounts();
            let account = accounts
                .get(&normalize_email(email))
                .ok_or_else(|| AuthError::new(AuthError::USER_NOT_FOUND))?;
            if account.password != password {
                return Err(AuthError::new(AuthError::WRONG_PASSWORD));
            }
            account.identity.clone()
        };

        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(AuthError::new(AuthError::INVALID_EMAIL));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(AuthError::WEAK_PASSWORD));
        }

        let identity = {
            let mut accounts = self.lock_accounts();
            if accounts.contains_key(&email) {
                return Err(AuthError::new(AuthError::EMAIL_ALREADY_IN_USE));
            }
            let identity = Identity::new(uuid::Uuid::new_v4().to_string(), Some(email.clone()));
            accounts.insert(
                email,
                Account {
                    identity: identity.clone(),
                    password: password.to_string(),
                },
            );
            identity
        };

        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_with_google(&self) -> Result<Identity, AuthError> {
        let identity = self
            .google_identity
            .clone()
            .ok_or_else(|| AuthError::new(AuthError::POPUP_CLOSED_BY_USER))?;
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.publish(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}
