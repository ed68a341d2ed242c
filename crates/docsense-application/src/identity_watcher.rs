//! Process-wide identity snapshot.
//!
//! The watcher mirrors the identity provider's current user into a snapshot
//! the controllers read when they need a caller id. It never writes identity
//! state itself; sign-in and sign-out go through the provider and come back
//! through the subscription.

use crate::event_bus::EventBus;
use docsense_core::error::{DocsenseError, Result};
use docsense_core::event::AppEvent;
use docsense_core::identity::{Identity, IdentityProvider};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// What the authenticated area should do with the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGuard {
    /// The provider has not reported yet.
    Loading,
    /// Nobody is signed in.
    RedirectToAuth,
    /// A user is signed in.
    Allow,
}

#[derive(Debug, Default)]
struct IdentitySnapshot {
    identity: Option<Identity>,
    resolved: bool,
}

pub struct IdentityWatcher {
    snapshot: Arc<RwLock<IdentitySnapshot>>,
    fallback_caller_id: Option<String>,
    events: EventBus,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl IdentityWatcher {
    /// Creates a watcher that has not observed any provider yet.
    ///
    /// # Arguments
    ///
    /// * `fallback_caller_id` - Caller id used while nobody is signed in
    /// * `events` - Bus receiving `IdentityChanged` notifications
    pub fn new(fallback_caller_id: Option<String>, events: EventBus) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(IdentitySnapshot::default())),
            fallback_caller_id,
            events,
            task: Mutex::new(None),
        }
    }

    /// Subscribes to the provider and keeps the snapshot current.
    ///
    /// The provider's current value is applied before this returns. Calling
    /// `start` again replaces the previous subscription.
    pub async fn start(&self, provider: &dyn IdentityProvider) {
        let mut receiver = provider.subscribe();
        let initial = receiver.borrow_and_update().clone();
        Self::apply(&self.snapshot, &self.events, initial).await;

        let snapshot = self.snapshot.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let identity = receiver.borrow_and_update().clone();
                Self::apply(&snapshot, &events, identity).await;
            }
            tracing::debug!("[IdentityWatcher] Provider closed its channel");
        });

        if let Some(previous) = self.task.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// Stops observing the provider. The last snapshot is kept.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            tracing::debug!("[IdentityWatcher] Unsubscribed");
        }
    }

    async fn apply(snapshot: &RwLock<IdentitySnapshot>, events: &EventBus, identity: Option<Identity>) {
        {
            let mut state = snapshot.write().await;
            if state.resolved && state.identity == identity {
                return;
            }
            state.identity = identity.clone();
            state.resolved = true;
        }
        tracing::info!(
            "[IdentityWatcher] Identity is now {}",
            identity
                .as_ref()
                .map(Identity::display_label)
                .unwrap_or("signed out")
        );
        events.publish(AppEvent::IdentityChanged { identity });
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.snapshot.read().await.identity.clone()
    }

    /// The caller id to send with backend requests.
    ///
    /// # Errors
    ///
    /// Returns `DocsenseError::Unauthenticated` when nobody is signed in and
    /// no fallback id is configured.
    pub async fn caller_id(&self) -> Result<String> {
        let state = self.snapshot.read().await;
        state
            .identity
            .as_ref()
            .map(|identity| identity.id.clone())
            .or_else(|| self.fallback_caller_id.clone())
            .ok_or(DocsenseError::Unauthenticated)
    }

    pub async fn guard(&self) -> AuthGuard {
        let state = self.snapshot.read().await;
        match (state.resolved, &state.identity) {
            (false, _) => AuthGuard::Loading,
            (true, None) => AuthGuard::RedirectToAuth,
            (true, Some(_)) => AuthGuard::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsense_infrastructure::DevIdentityProvider;

    async fn next_identity_change(rx: &mut tokio::sync::broadcast::Receiver<AppEvent>) -> Option<Identity> {
        loop {
            if let AppEvent::IdentityChanged { identity } = rx.recv().await.unwrap() {
                return identity;
            }
        }
    }

    #[tokio::test]
    async fn test_guard_before_and_after_start() {
        let watcher = IdentityWatcher::new(None, EventBus::new());
        assert_eq!(watcher.guard().await, AuthGuard::Loading);

        let provider = DevIdentityProvider::new();
        watcher.start(&provider).await;
        assert_eq!(watcher.guard().await, AuthGuard::RedirectToAuth);
    }

    #[tokio::test]
    async fn test_snapshot_follows_provider() {
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let watcher = IdentityWatcher::new(None, events);
        let provider = DevIdentityProvider::new();
        watcher.start(&provider).await;
        assert_eq!(next_identity_change(&mut rx).await, None);

        let ada = provider.sign_up("ada@example.com", "secret1").await.unwrap();
        assert_eq!(next_identity_change(&mut rx).await, Some(ada.clone()));
        assert_eq!(watcher.guard().await, AuthGuard::Allow);
        assert_eq!(watcher.caller_id().await.unwrap(), ada.id);

        provider.sign_out().await.unwrap();
        assert_eq!(next_identity_change(&mut rx).await, None);
        assert_eq!(watcher.caller_id().await, Err(DocsenseError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_fallback_caller_id_when_signed_out() {
        let watcher = IdentityWatcher::new(Some("dev-user".to_string()), EventBus::new());
        watcher.start(&DevIdentityProvider::new()).await;
        assert_eq!(watcher.caller_id().await.unwrap(), "dev-user");
    }

    #[tokio::test]
    async fn test_shutdown_stops_following() {
        let watcher = IdentityWatcher::new(None, EventBus::new());
        let provider = DevIdentityProvider::new();
        watcher.start(&provider).await;
        watcher.shutdown().await;

        provider.sign_up("ada@example.com", "secret1").await.unwrap();
        tokio::task::yield_now().await;
        assert_eq!(watcher.identity().await, None);
    }
}
