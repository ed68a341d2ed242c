//! Composition root of the chat screen.
//!
//! `AppHome` owns one of each controller and the transient view state, and
//! exposes the affordances of the screen: composer, sidebar, uploads and the
//! profile menu. Front-ends hold one `AppHome`, call [`AppHome::mount`] once,
//! render from [`AppHome::subscribe`] and call [`AppHome::unmount`] on exit.

use crate::auth_form::AuthForm;
use crate::document_sync::{DocumentListState, DocumentSyncController, SyncOutcome};
use crate::event_bus::EventBus;
use crate::identity_watcher::{AuthGuard, IdentityWatcher};
use crate::session::{QueryDispatcher, SendOutcome, SessionRegistry};
use crate::upload::{UploadController, UploadOutcome};
use crate::view_state::{self, ViewState};
use docsense_core::config::ClientConfig;
use docsense_core::document::{ChatSummary, DocumentsBackend, UploadFile};
use docsense_core::error::Result;
use docsense_core::event::AppEvent;
use docsense_core::identity::{AuthError, Identity, IdentityProvider};
use docsense_core::session::ChatMessage;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

/// Session used while no chat is selected.
pub const DEFAULT_SESSION_ID: &str = "default";
pub const NEW_CHAT_TITLE: &str = "New chat";

pub struct AppHome {
    events: EventBus,
    provider: Arc<dyn IdentityProvider>,
    identity: Arc<IdentityWatcher>,
    sessions: Arc<SessionRegistry>,
    dispatcher: QueryDispatcher,
    sync: Arc<DocumentSyncController>,
    uploads: UploadController,
    auth: AuthForm,
    view: RwLock<ViewState>,
}

impl AppHome {
    /// Wires every controller to one backend and one identity provider.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the fallback caller id and `top_k`
    /// * `backend` - Document endpoints
    /// * `provider` - Identity provider behind the sign-in form and profile menu
    pub fn new(config: &ClientConfig, backend: Arc<dyn DocumentsBackend>, provider: Arc<dyn IdentityProvider>) -> Self {
        let events = EventBus::new();
        let identity = Arc::new(IdentityWatcher::new(
            config.fallback_caller_id.clone(),
            events.clone(),
        ));
        let sessions = Arc::new(SessionRegistry::new());
        let dispatcher = QueryDispatcher::new(
            backend.clone(),
            sessions.clone(),
            identity.clone(),
            events.clone(),
            config.query_top_k,
        );
        let sync = Arc::new(DocumentSyncController::new(
            backend.clone(),
            identity.clone(),
            events.clone(),
        ));
        let uploads = UploadController::new(backend, identity.clone(), sync.clone(), events.clone());

        Self {
            events,
            provider,
            identity,
            sessions,
            dispatcher,
            sync,
            uploads,
            auth: AuthForm::new(),
            view: RwLock::new(ViewState::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Starts watching identity and loads the sidebar once.
    ///
    /// The first chat is selected if nothing is selected yet. A failed load is
    /// returned but leaves the screen usable.
    pub async fn mount(&self) -> Result<SyncOutcome> {
        self.identity.start(self.provider.as_ref()).await;
        let outcome = self.sync.resync().await;

        let items = self.sync.items().await;
        self.view.write().await.ensure_active_chat(&items);

        tracing::info!("[AppHome] Mounted with {} chats", items.len());
        outcome
    }

    /// Cancels in-flight syncs and stops watching identity.
    pub async fn unmount(&self) {
        self.sync.shutdown();
        self.identity.shutdown().await;
        tracing::info!("[AppHome] Unmounted");
    }

    pub async fn guard(&self) -> AuthGuard {
        self.identity.guard().await
    }

    // ============================================================================
    // Composer and sessions
    // ============================================================================

    pub async fn set_composer(&self, text: impl Into<String>) {
        self.view.write().await.composer = text.into();
    }

    /// Sends the composer text to the active chat.
    ///
    /// The composer is cleared only once the session has accepted the
    /// question. Blank text and sends while the chat is streaming leave the
    /// composer as it was.
    pub async fn send_composer(&self) -> SendOutcome {
        let pending = {
            let mut view = self.view.write().await;
            let session_id = view
                .active_chat_id
                .clone()
                .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());
            match self.dispatcher.begin(&session_id, &view.composer).await {
                Ok(pending) => {
                    view.take_composer();
                    pending
                }
                Err(rejected) => return rejected,
            }
        };
        pending.finish().await
    }

    /// Sends `text` in a specific session.
    pub async fn send(&self, session_id: &str, text: &str) -> SendOutcome {
        self.dispatcher.send(session_id, text).await
    }

    /// Chat id the composer sends to.
    pub async fn active_session_id(&self) -> String {
        self.view
            .read()
            .await
            .active_chat_id
            .clone()
            .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string())
    }

    pub async fn messages(&self, session_id: &str) -> Vec<ChatMessage> {
        match self.sessions.get(session_id).await {
            Some(session) => session.lock().await.messages().to_vec(),
            None => Vec::new(),
        }
    }

    pub async fn active_messages(&self) -> Vec<ChatMessage> {
        let session_id = self.active_session_id().await;
        self.messages(&session_id).await
    }

    pub async fn is_streaming(&self, session_id: &str) -> bool {
        match self.sessions.get(session_id).await {
            Some(session) => session.lock().await.is_streaming(),
            None => false,
        }
    }

    // ============================================================================
    // Sidebar
    // ============================================================================

    /// Prepends a "New chat" entry and makes it active.
    pub async fn new_chat(&self) -> ChatSummary {
        let chat = self.sync.add_local_chat(NEW_CHAT_TITLE).await;
        let mut view = self.view.write().await;
        view.active_chat_id = Some(chat.id.clone());
        view.close_profile_menu();
        chat
    }

    /// Makes `chat_id` active if it is in the sidebar list.
    pub async fn select_chat(&self, chat_id: &str) -> bool {
        let known = self.sync.items().await.iter().any(|chat| chat.id == chat_id);
        let mut view = self.view.write().await;
        view.close_profile_menu();
        if known {
            view.active_chat_id = Some(chat_id.to_string());
        }
        known
    }

    pub async fn toggle_sidebar(&self) -> bool {
        let mut view = self.view.write().await;
        view.toggle_sidebar();
        view.sidebar_collapsed
    }

    pub async fn expand_sidebar(&self) {
        self.view.write().await.expand_sidebar();
    }

    pub async fn set_search(&self, search: impl Into<String>) {
        self.view.write().await.search = search.into();
    }

    /// Sidebar entries matching the search text.
    pub async fn visible_chats(&self) -> Vec<ChatSummary> {
        let items = self.sync.items().await;
        let view = self.view.read().await;
        view.filter_chats(&items).into_iter().cloned().collect()
    }

    pub async fn documents(&self) -> DocumentListState {
        self.sync.snapshot().await
    }

    pub async fn resync(&self) -> Result<SyncOutcome> {
        self.sync.resync().await
    }

    pub async fn view(&self) -> ViewState {
        self.view.read().await.clone()
    }

    // ============================================================================
    // Uploads
    // ============================================================================

    pub async fn upload(&self, file: UploadFile) -> Result<UploadOutcome> {
        self.uploads.upload(file).await
    }

    /// Reads a local file and uploads it.
    ///
    /// A file that cannot be read produces the same notice as a failed upload.
    pub async fn upload_path(&self, path: impl AsRef<Path>) -> Result<UploadOutcome> {
        if self.uploads.is_busy().await {
            return Ok(UploadOutcome::Busy);
        }

        match docsense_infrastructure::load_upload_file(path).await {
            Ok(file) => self.upload(file).await,
            Err(error) => {
                tracing::warn!("[AppHome] Could not read upload: {}", error);
                self.uploads
                    .set_notice(format!("Upload failed: {}", error))
                    .await;
                Err(error)
            }
        }
    }

    pub async fn is_uploading(&self) -> bool {
        self.uploads.is_busy().await
    }

    pub async fn upload_notice(&self) -> Option<String> {
        self.uploads.notice().await
    }

    pub async fn dismiss_upload_notice(&self) {
        self.uploads.dismiss_notice().await;
    }

    // ============================================================================
    // Identity and profile menu
    // ============================================================================

    pub fn auth_form(&self) -> &AuthForm {
        &self.auth
    }

    pub async fn submit_auth(&self) -> std::result::Result<Option<Identity>, AuthError> {
        self.auth.submit(self.provider.as_ref()).await
    }

    pub async fn sign_in_with_google(&self) -> std::result::Result<Option<Identity>, AuthError> {
        self.auth.sign_in_with_google(self.provider.as_ref()).await
    }

    pub async fn toggle_profile_menu(&self) -> bool {
        let mut view = self.view.write().await;
        view.toggle_profile_menu();
        view.profile_menu_open
    }

    /// Closes the profile menu and signs out through the provider.
    pub async fn sign_out(&self) -> std::result::Result<(), AuthError> {
        self.view.write().await.close_profile_menu();
        self.provider.sign_out().await
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.identity.identity().await
    }

    pub async fn user_label(&self) -> String {
        view_state::user_label(self.identity().await.as_ref())
    }

    pub async fn avatar_initials(&self) -> String {
        view_state::avatar_initials(self.identity().await.as_ref())
    }
}
