//! Single-file upload lifecycle.

use crate::document_sync::DocumentSyncController;
use crate::event_bus::EventBus;
use crate::identity_watcher::IdentityWatcher;
use docsense_core::document::{DocumentsBackend, UploadFile};
use docsense_core::error::{DocsenseError, Result};
use docsense_core::event::AppEvent;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Whether an upload is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    /// Covers the request and the resync that follows a success.
    Uploading { file_name: String },
}

/// How an upload call ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { file_name: String },
    /// Another upload is in flight; this call did nothing.
    Busy,
}

#[derive(Debug, Default)]
struct UploadState {
    phase: UploadPhase,
    selected_file: Option<String>,
    notice: Option<String>,
}

/// Runs one upload at a time and refreshes the sidebar afterwards.
pub struct UploadController {
    backend: Arc<dyn DocumentsBackend>,
    identity: Arc<IdentityWatcher>,
    sync: Arc<DocumentSyncController>,
    events: EventBus,
    state: RwLock<UploadState>,
}

impl UploadController {
    pub fn new(
        backend: Arc<dyn DocumentsBackend>,
        identity: Arc<IdentityWatcher>,
        sync: Arc<DocumentSyncController>,
        events: EventBus,
    ) -> Self {
        Self {
            backend,
            identity,
            sync,
            events,
            state: RwLock::new(UploadState::default()),
        }
    }

    pub async fn phase(&self) -> UploadPhase {
        self.state.read().await.phase.clone()
    }

    pub async fn is_busy(&self) -> bool {
        matches!(self.state.read().await.phase, UploadPhase::Uploading { .. })
    }

    /// Name of the file currently occupying the selection slot.
    pub async fn selected_file(&self) -> Option<String> {
        self.state.read().await.selected_file.clone()
    }

    /// The last failure notice, if it has not been dismissed.
    pub async fn notice(&self) -> Option<String> {
        self.state.read().await.notice.clone()
    }

    pub async fn set_notice(&self, notice: impl Into<String>) {
        self.state.write().await.notice = Some(notice.into());
    }

    pub async fn dismiss_notice(&self) {
        self.state.write().await.notice = None;
    }

    /// Uploads one file.
    ///
    /// On success the document list is resynced once before the controller
    /// goes idle; a failing resync does not fail the upload. On failure the
    /// list is left alone and a notice is recorded. The selection slot is
    /// cleared in both cases.
    ///
    /// # Returns
    ///
    /// - `Ok(UploadOutcome::Uploaded)`: The backend accepted the file
    /// - `Ok(UploadOutcome::Busy)`: Another upload is in flight
    /// - `Err(DocsenseError)`: The upload failed
    pub async fn upload(&self, file: UploadFile) -> Result<UploadOutcome> {
        let file_name = file.file_name.clone();
        {
            let mut state = self.state.write().await;
            if matches!(state.phase, UploadPhase::Uploading { .. }) {
                tracing::debug!("[UploadController] Busy, ignoring {}", file_name);
                return Ok(UploadOutcome::Busy);
            }
            state.phase = UploadPhase::Uploading {
                file_name: file_name.clone(),
            };
            state.selected_file = Some(file_name.clone());
            state.notice = None;
        }
        self.events.publish(AppEvent::UploadStarted {
            file_name: file_name.clone(),
        });

        let result = self.send(&file).await;
        if result.is_ok() {
            if let Err(error) = self.sync.resync().await {
                tracing::warn!("[UploadController] Resync after upload failed: {}", error);
            }
        }

        let notice = result
            .as_ref()
            .err()
            .map(|error| format!("Upload failed: {}", error));
        {
            let mut state = self.state.write().await;
            state.phase = UploadPhase::Idle;
            state.selected_file = None;
            if notice.is_some() {
                state.notice = notice.clone();
            }
        }

        match (result, notice) {
            (Ok(()), _) => {
                tracing::info!("[UploadController] Uploaded {}", file_name);
                self.events.publish(AppEvent::UploadFinished {
                    file_name: file_name.clone(),
                });
                Ok(UploadOutcome::Uploaded { file_name })
            }
            (Err(error), notice) => {
                tracing::warn!("[UploadController] Upload of {} failed: {}", file_name, error);
                self.events.publish(AppEvent::UploadFailed {
                    file_name,
                    message: notice.unwrap_or_default(),
                });
                Err(error)
            }
        }
    }

    async fn send(&self, file: &UploadFile) -> Result<()> {
        let caller_id = self.identity.caller_id().await?;
        let reply = self.backend.upload_document(&caller_id, file).await?;

        if !reply.is_success() {
            return Err(DocsenseError::backend(
                reply.status,
                reply.error_message().map(str::to_string),
            ));
        }
        if reply.body.is_none() {
            return Err(DocsenseError::malformed("upload reply is not valid JSON"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBackend, signed_out_watcher};
    use docsense_core::document::BackendReply;
    use serde_json::json;
    use tokio::sync::Notify;

    struct Fixture {
        backend: Arc<MockBackend>,
        sync: Arc<DocumentSyncController>,
        uploads: Arc<UploadController>,
    }

    async fn fixture() -> Fixture {
        let backend = MockBackend::new();
        let events = EventBus::new();
        let identity = signed_out_watcher(&events).await;
        let sync = Arc::new(DocumentSyncController::new(
            backend.clone(),
            identity.clone(),
            events.clone(),
        ));
        let uploads = Arc::new(UploadController::new(
            backend.clone(),
            identity,
            sync.clone(),
            events,
        ));
        Fixture {
            backend,
            sync,
            uploads,
        }
    }

    fn pdf(name: &str) -> UploadFile {
        UploadFile::new(name, "application/pdf", b"%PDF".to_vec())
    }

    #[tokio::test]
    async fn test_success_triggers_exactly_one_sync() {
        let f = fixture().await;
        f.backend.push_upload(Ok(BackendReply::new(201, Some(json!({ "id": "d2" })))));
        f.backend.push_list(Ok(BackendReply::ok(json!([{ "id": "d2", "title": "report.pdf" }]))));

        let outcome = f.uploads.upload(pdf("report.pdf")).await.unwrap();

        assert_eq!(
            outcome,
            UploadOutcome::Uploaded {
                file_name: "report.pdf".to_string()
            }
        );
        assert_eq!(f.backend.list_calls(), 1);
        assert_eq!(f.sync.items().await[0].title, "report.pdf");
        assert_eq!(f.uploads.selected_file().await, None);
        assert_eq!(f.uploads.phase().await, UploadPhase::Idle);
    }

    #[tokio::test]
    async fn test_failure_keeps_list_and_sets_notice() {
        let f = fixture().await;
        f.backend.push_list(Ok(BackendReply::ok(json!([{ "id": "d1", "title": "Report" }]))));
        f.sync.resync().await.unwrap();
        f.backend.push_upload(Ok(BackendReply::new(413, Some(json!({ "error": "too large" })))));

        let err = f.uploads.upload(pdf("huge.pdf")).await.unwrap_err();

        assert!(err.is_backend());
        assert_eq!(f.backend.list_calls(), 1);
        assert_eq!(f.sync.items().await.len(), 1);
        assert_eq!(
            f.uploads.notice().await.as_deref(),
            Some("Upload failed: Backend error (status 413): too large")
        );
        assert_eq!(f.uploads.selected_file().await, None);
        assert!(!f.uploads.is_busy().await);
    }

    #[tokio::test]
    async fn test_ok_without_json_is_failure() {
        let f = fixture().await;
        f.backend.push_upload(Ok(BackendReply::new(200, None)));

        let err = f.uploads.upload(pdf("report.pdf")).await.unwrap_err();
        assert!(matches!(err, DocsenseError::MalformedResponse(_)));
        assert_eq!(f.backend.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_clears_selection() {
        let f = fixture().await;
        f.backend.push_upload(Err(DocsenseError::transport("reset by peer")));

        assert!(f.uploads.upload(pdf("report.pdf")).await.is_err());
        assert_eq!(f.uploads.selected_file().await, None);
        assert!(f.uploads.notice().await.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_upload_is_busy() {
        let f = fixture().await;
        let gate = Arc::new(Notify::new());
        f.backend
            .push_upload_gated(Ok(BackendReply::ok(json!({ "id": "d2" }))), gate.clone());
        f.backend.push_list(Ok(BackendReply::ok(json!([]))));

        let first = {
            let uploads = f.uploads.clone();
            tokio::spawn(async move { uploads.upload(pdf("first.pdf")).await })
        };
        while !f.uploads.is_busy().await {
            tokio::task::yield_now().await;
        }

        assert_eq!(f.uploads.upload(pdf("second.pdf")).await.unwrap(), UploadOutcome::Busy);
        assert_eq!(f.uploads.selected_file().await.as_deref(), Some("first.pdf"));

        gate.notify_one();
        assert!(matches!(first.await.unwrap().unwrap(), UploadOutcome::Uploaded { .. }));
    }

    #[tokio::test]
    async fn test_busy_during_resync() {
        let f = fixture().await;
        let gate = Arc::new(Notify::new());
        f.backend.push_upload(Ok(BackendReply::ok(json!({ "id": "d2" }))));
        f.backend.push_list_gated(Ok(BackendReply::ok(json!([]))), gate.clone());

        let task = {
            let uploads = f.uploads.clone();
            tokio::spawn(async move { uploads.upload(pdf("report.pdf")).await })
        };
        while f.backend.list_calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(f.uploads.is_busy().await);

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert!(!f.uploads.is_busy().await);
    }

    #[tokio::test]
    async fn test_failed_resync_does_not_fail_upload() {
        let f = fixture().await;
        f.backend.push_upload(Ok(BackendReply::ok(json!({ "id": "d2" }))));
        f.backend.push_list(Err(DocsenseError::transport("refused")));

        let outcome = f.uploads.upload(pdf("report.pdf")).await.unwrap();
        assert!(matches!(outcome, UploadOutcome::Uploaded { .. }));
        assert!(f.sync.snapshot().await.last_error.is_some());
        assert_eq!(f.uploads.notice().await, None);
    }
}
