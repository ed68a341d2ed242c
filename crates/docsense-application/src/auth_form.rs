//! Login and sign-up form state.
//!
//! The form never changes identity state itself. It forwards credentials to
//! the provider and, on failure, shows the message mapped from the provider's
//! error code. A successful sign-in reaches the rest of the client through the
//! provider's subscription.

use docsense_core::identity::{AuthError, Identity, IdentityProvider};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn label(&self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Signup => "Sign up",
        }
    }
}

#[derive(Debug, Default)]
struct FormState {
    mode: AuthMode,
    email: String,
    password: String,
    loading: bool,
    error_message: Option<String>,
}

#[derive(Debug, Default)]
pub struct AuthForm {
    state: RwLock<FormState>,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mode(&self) -> AuthMode {
        self.state.read().await.mode
    }

    /// Switches between login and sign-up. Ignored while a request is running.
    pub async fn set_mode(&self, mode: AuthMode) {
        let mut state = self.state.write().await;
        if !state.loading {
            state.mode = mode;
        }
    }

    pub async fn set_email(&self, email: impl Into<String>) {
        self.state.write().await.email = email.into();
    }

    pub async fn set_password(&self, password: impl Into<String>) {
        self.state.write().await.password = password.into();
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error_message(&self) -> Option<String> {
        self.state.read().await.error_message.clone()
    }

    pub async fn submit_label(&self) -> &'static str {
        let state = self.state.read().await;
        match (state.loading, state.mode) {
            (true, _) => "Please wait…",
            (false, AuthMode::Login) => "Login",
            (false, AuthMode::Signup) => "Create account",
        }
    }

    /// Heading shown above the form.
    pub fn subtitle(signed_in: bool) -> &'static str {
        if signed_in {
            "You are already signed in."
        } else {
            "Sign in or create an account to continue."
        }
    }

    /// Submits the email form in the current mode.
    ///
    /// The email is trimmed; the password is sent as typed.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(identity))`: The provider signed the user in
    /// - `Ok(None)`: A request is already running; nothing was sent
    /// - `Err(AuthError)`: The provider refused; the form shows its message
    pub async fn submit(&self, provider: &dyn IdentityProvider) -> Result<Option<Identity>, AuthError> {
        let Some((mode, email, password)) = self.begin().await else {
            return Ok(None);
        };

        let result = match mode {
            AuthMode::Login => provider.sign_in(&email, &password).await,
            AuthMode::Signup => provider.sign_up(&email, &password).await,
        };
        self.finish(result).await.map(Some)
    }

    /// Runs the Google flow.
    ///
    /// Same return contract as [`AuthForm::submit`].
    pub async fn sign_in_with_google(&self, provider: &dyn IdentityProvider) -> Result<Option<Identity>, AuthError> {
        if self.begin().await.is_none() {
            return Ok(None);
        }
        let result = provider.sign_in_with_google().await;
        self.finish(result).await.map(Some)
    }

    async fn begin(&self) -> Option<(AuthMode, String, String)> {
        let mut state = self.state.write().await;
        if state.loading {
            return None;
        }
        state.loading = true;
        state.error_message = None;
        Some((state.mode, state.email.trim().to_string(), state.password.clone()))
    }

    async fn finish(&self, result: Result<Identity, AuthError>) -> Result<Identity, AuthError> {
        let mut state = self.state.write().await;
        state.loading = false;
        match &result {
            Ok(_) => state.password.clear(),
            Err(error) => {
                tracing::debug!("[AuthForm] Provider refused: {}", error.code);
                state.error_message = Some(error.user_message().to_string());
            }
        }
        result
    }
}
