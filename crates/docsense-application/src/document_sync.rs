//! Sidebar document list synchronisation.
//!
//! The list is fetched once on mount and once after each successful upload.
//! A successful fetch replaces the list wholesale; a failed one clears it and
//! records a user-visible error. Cancelled fetches never write.

use crate::event_bus::EventBus;
use crate::identity_watcher::IdentityWatcher;
use docsense_core::document::{ChatSummary, DocumentsBackend, normalize_document_list};
use docsense_core::error::{DocsenseError, Result};
use docsense_core::event::AppEvent;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Snapshot of the sidebar list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentListState {
    /// Chats shown in the sidebar, newest local entries first
    pub items: Vec<ChatSummary>,
    /// True while at least one fetch is in flight
    pub loading: bool,
    /// Banner text from the last failed sync, cleared by the next success
    pub last_error: Option<String>,
}

/// How a sync ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The list was replaced with these items.
    Synced(Vec<ChatSummary>),
    /// The token was cancelled first; nothing was written.
    Cancelled,
}

#[derive(Debug, Default)]
struct SyncState {
    list: DocumentListState,
    in_flight: usize,
}

pub struct DocumentSyncController {
    backend: Arc<dyn DocumentsBackend>,
    identity: Arc<IdentityWatcher>,
    events: EventBus,
    state: RwLock<SyncState>,
    /// Parent of every sync token; cancelled on shutdown
    lifetime: CancellationToken,
    /// Token of the most recent resync
    current: Mutex<CancellationToken>,
}

impl DocumentSyncController {
    pub fn new(backend: Arc<dyn DocumentsBackend>, identity: Arc<IdentityWatcher>, events: EventBus) -> Self {
        let lifetime = CancellationToken::new();
        let current = Mutex::new(lifetime.child_token());
        Self {
            backend,
            identity,
            events,
            state: RwLock::new(SyncState::default()),
            lifetime,
            current,
        }
    }

    pub async fn snapshot(&self) -> DocumentListState {
        self.state.read().await.list.clone()
    }

    pub async fn items(&self) -> Vec<ChatSummary> {
        self.state.read().await.list.items.clone()
    }

    /// Fetches the document list once under `token`.
    ///
    /// # Returns
    ///
    /// - `Ok(SyncOutcome::Synced(items))`: The list was replaced
    /// - `Ok(SyncOutcome::Cancelled)`: `token` was cancelled before the write
    /// - `Err(DocsenseError)`: The fetch failed and the list was cleared
    pub async fn sync(&self, token: &CancellationToken) -> Result<SyncOutcome> {
        if token.is_cancelled() {
            return Ok(SyncOutcome::Cancelled);
        }

        {
            let mut state = self.state.write().await;
            state.in_flight += 1;
            state.list.loading = true;
        }
        self.events.publish(AppEvent::DocumentsLoading);

        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.fetch() => Some(result),
        };

        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        state.list.loading = state.in_flight > 0;

        // Checked under the write lock so a cancel that lands after the reply
        // still wins.
        let result = match fetched {
            Some(result) if !token.is_cancelled() => result,
            _ => {
                drop(state);
                tracing::debug!("[DocumentSync] Sync cancelled, list untouched");
                return Ok(SyncOutcome::Cancelled);
            }
        };

        match result {
            Ok(items) => {
                state.list.items = items.clone();
                state.list.last_error = None;
                drop(state);

                tracing::debug!("[DocumentSync] Loaded {} documents", items.len());
                self.events.publish(AppEvent::DocumentsChanged { count: items.len() });
                Ok(SyncOutcome::Synced(items))
            }
            Err(error) => {
                let message = format!("Could not load documents: {}", error);
                state.list.items.clear();
                state.list.last_error = Some(message.clone());
                drop(state);

                tracing::warn!("[DocumentSync] Failed to fetch documents: {}", error);
                self.events.publish(AppEvent::DocumentsSyncFailed { message });
                Err(error)
            }
        }
    }

    /// Cancels the previous resync, if still running, and starts a new one.
    pub async fn resync(&self) -> Result<SyncOutcome> {
        let token = self.lifetime.child_token();
        {
            let mut current = self.current.lock().await;
            let previous = std::mem::replace(&mut *current, token.clone());
            previous.cancel();
        }
        self.sync(&token).await
    }

    /// Cancels every in-flight sync. Later syncs return `Cancelled`.
    pub fn shutdown(&self) {
        self.lifetime.cancel();
    }

    /// Prepends a local placeholder chat and returns it.
    pub async fn add_local_chat(&self, title: &str) -> ChatSummary {
        let chat = ChatSummary::local(title);
        let count = {
            let mut state = self.state.write().await;
            state.list.items.insert(0, chat.clone());
            state.list.items.len()
        };
        self.events.publish(AppEvent::DocumentsChanged { count });
        chat
    }

    async fn fetch(&self) -> Result<Vec<ChatSummary>> {
        let caller_id = self.identity.caller_id().await?;
        let reply = self.backend.list_documents(&caller_id).await?;

        if !reply.is_success() {
            return Err(DocsenseError::backend(
                reply.status,
                reply.error_message().map(str::to_string),
            ));
        }

        match reply.body {
            Some(body) => Ok(normalize_document_list(&body)),
            None => Err(DocsenseError::malformed("document list is not valid JSON")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBackend, drain, signed_out_watcher};
    use docsense_core::document::{BackendReply, UNTITLED_LABEL};
    use serde_json::json;
    use tokio::sync::Notify;

    async fn controller(backend: &Arc<MockBackend>, events: &EventBus) -> Arc<DocumentSyncController> {
        let identity = signed_out_watcher(events).await;
        Arc::new(DocumentSyncController::new(backend.clone(), identity, events.clone()))
    }

    async fn wait_for_list_calls(backend: &MockBackend, count: usize) {
        while backend.list_calls() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_sync_replaces_list() {
        let backend = MockBackend::new();
        let events = EventBus::new();
        let sync = controller(&backend, &events).await;
        backend.push_list(Ok(BackendReply::ok(json!([{ "id": "d1", "title": "Report" }]))));

        let outcome = sync.sync(&CancellationToken::new()).await.unwrap();

        let expected = vec![ChatSummary::new("d1", "Report")];
        assert_eq!(outcome, SyncOutcome::Synced(expected.clone()));
        let snapshot = sync.snapshot().await;
        assert_eq!(snapshot.items, expected);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.last_error, None);
    }

    #[tokio::test]
    async fn test_sync_normalises_items() {
        let backend = MockBackend::new();
        let sync = controller(&backend, &EventBus::new()).await;
        backend.push_list(Ok(BackendReply::ok(json!([
            null,
            { "filename": "x.pdf" },
            { "id": "", "title": "" }
        ]))));

        sync.sync(&CancellationToken::new()).await.unwrap();

        let items = sync.items().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "x.pdf");
        assert!(items[0].is_local());
        assert_eq!(items[1].title, UNTITLED_LABEL);
        assert!(items[1].is_local());
        assert_ne!(items[0].id, items[1].id);
    }

    #[tokio::test]
    async fn test_non_array_body_is_empty_list() {
        let backend = MockBackend::new();
        let sync = controller(&backend, &EventBus::new()).await;
        sync.add_local_chat("Scratch").await;
        backend.push_list(Ok(BackendReply::ok(json!({ "documents": [] }))));

        let outcome = sync.sync(&CancellationToken::new()).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Synced(Vec::new()));
        assert!(sync.items().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_clears_list_and_sets_error() {
        let backend = MockBackend::new();
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let sync = controller(&backend, &events).await;
        backend.push_list(Ok(BackendReply::ok(json!([{ "id": "d1", "title": "Report" }]))));
        backend.push_list(Ok(BackendReply::new(500, Some(json!({ "error": "db down" })))));

        sync.sync(&CancellationToken::new()).await.unwrap();
        let err = sync.sync(&CancellationToken::new()).await.unwrap_err();

        assert_eq!(err, DocsenseError::backend(500, Some("db down".to_string())));
        let snapshot = sync.snapshot().await;
        assert!(snapshot.items.is_empty());
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("Could not load documents: Backend error (status 500): db down")
        );
        assert!(drain(&mut rx)
            .iter()
            .any(|event| matches!(event, AppEvent::DocumentsSyncFailed { .. })));
    }

    #[tokio::test]
    async fn test_unparsable_body_fails_closed() {
        let backend = MockBackend::new();
        let sync = controller(&backend, &EventBus::new()).await;
        backend.push_list(Ok(BackendReply::new(200, None)));

        let err = sync.sync(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DocsenseError::MalformedResponse(_)));
        assert!(sync.snapshot().await.last_error.is_some());
    }

    #[tokio::test]
    async fn test_next_success_clears_error() {
        let backend = MockBackend::new();
        let sync = controller(&backend, &EventBus::new()).await;
        backend.push_list(Err(DocsenseError::transport("refused")));
        backend.push_list(Ok(BackendReply::ok(json!([]))));

        assert!(sync.sync(&CancellationToken::new()).await.is_err());
        sync.sync(&CancellationToken::new()).await.unwrap();
        assert_eq!(sync.snapshot().await.last_error, None);
    }

    #[tokio::test]
    async fn test_cancel_before_reply_never_writes() {
        let backend = MockBackend::new();
        let sync = controller(&backend, &EventBus::new()).await;
        sync.add_local_chat("Keep me").await;
        let gate = Arc::new(Notify::new());
        backend.push_list_gated(Ok(BackendReply::ok(json!([{ "id": "d1", "title": "Report" }]))), gate.clone());

        let token = CancellationToken::new();
        let task = {
            let sync = sync.clone();
            let token = token.clone();
            tokio::spawn(async move { sync.sync(&token).await })
        };
        wait_for_list_calls(&backend, 1).await;
        assert!(sync.snapshot().await.loading);

        token.cancel();
        gate.notify_one();

        assert_eq!(task.await.unwrap().unwrap(), SyncOutcome::Cancelled);
        let snapshot = sync.snapshot().await;
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].title, "Keep me");
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_cancel_after_reply_before_write_never_writes() {
        let backend = MockBackend::new();
        let sync = controller(&backend, &EventBus::new()).await;
        sync.add_local_chat("Keep me").await;
        let gate = Arc::new(Notify::new());
        backend.push_list_gated(Ok(BackendReply::ok(json!([{ "id": "d1", "title": "Report" }]))), gate.clone());

        let token = CancellationToken::new();
        let task = {
            let sync = sync.clone();
            let token = token.clone();
            tokio::spawn(async move { sync.sync(&token).await })
        };
        wait_for_list_calls(&backend, 1).await;

        // Hold the state so the finished fetch parks on the write lock.
        let guard = sync.state.read().await;
        gate.notify_one();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        token.cancel();
        drop(guard);

        assert_eq!(task.await.unwrap().unwrap(), SyncOutcome::Cancelled);
        let items = sync.items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Keep me");
    }

    #[tokio::test]
    async fn test_resync_cancels_previous() {
        let backend = MockBackend::new();
        let sync = controller(&backend, &EventBus::new()).await;
        let gate = Arc::new(Notify::new());
        backend.push_list_gated(Ok(BackendReply::ok(json!([{ "id": "old", "title": "Stale" }]))), gate.clone());
        backend.push_list(Ok(BackendReply::ok(json!([{ "id": "new", "title": "Fresh" }]))));

        let first = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.resync().await })
        };
        wait_for_list_calls(&backend, 1).await;

        let second = sync.resync().await.unwrap();
        gate.notify_one();

        assert_eq!(first.await.unwrap().unwrap(), SyncOutcome::Cancelled);
        assert_eq!(second, SyncOutcome::Synced(vec![ChatSummary::new("new", "Fresh")]));
        assert_eq!(sync.items().await, vec![ChatSummary::new("new", "Fresh")]);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_later_syncs() {
        let backend = MockBackend::new();
        let sync = controller(&backend, &EventBus::new()).await;
        sync.shutdown();

        assert_eq!(sync.resync().await.unwrap(), SyncOutcome::Cancelled);
        assert_eq!(backend.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_add_local_chat_prepends() {
        let backend = MockBackend::new();
        let sync = controller(&backend, &EventBus::new()).await;
        backend.push_list(Ok(BackendReply::ok(json!([{ "id": "d1", "title": "Report" }]))));
        sync.sync(&CancellationToken::new()).await.unwrap();

        let chat = sync.add_local_chat("New chat").await;
        let items = sync.items().await;
        assert_eq!(items[0], chat);
        assert!(chat.is_local());
        assert_eq!(items[1].id, "d1");
    }
}
