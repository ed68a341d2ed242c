//! Shared fixtures for controller tests.

use async_trait::async_trait;
use docsense_core::document::{BackendReply, DocumentsBackend, QueryRequest, UploadFile};
use docsense_core::error::{DocsenseError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A request observed by [`MockBackend`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    List { caller_id: String },
    Upload { caller_id: String, file_name: String },
    Query { caller_id: String, request: QueryRequest },
}

struct Scripted {
    result: Result<BackendReply>,
    gate: Option<Arc<Notify>>,
}

/// Scripted `DocumentsBackend`.
///
/// Each endpoint replays its queue in order. A gated reply waits for the gate
/// to be notified before returning, which lets a test observe the in-flight
/// state. Calls are recorded before the gate is awaited. An empty queue
/// answers with an internal error.
#[derive(Default)]
pub(crate) struct MockBackend {
    list: Mutex<VecDeque<Scripted>>,
    upload: Mutex<VecDeque<Scripted>>,
    query: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push_list(&self, result: Result<BackendReply>) {
        push(&self.list, result, None);
    }

    pub(crate) fn push_list_gated(&self, result: Result<BackendReply>, gate: Arc<Notify>) {
        push(&self.list, result, Some(gate));
    }

    pub(crate) fn push_upload(&self, result: Result<BackendReply>) {
        push(&self.upload, result, None);
    }

    pub(crate) fn push_upload_gated(&self, result: Result<BackendReply>, gate: Arc<Notify>) {
        push(&self.upload, result, Some(gate));
    }

    pub(crate) fn push_query(&self, result: Result<BackendReply>) {
        push(&self.query, result, None);
    }

    pub(crate) fn push_query_gated(&self, result: Result<BackendReply>, gate: Arc<Notify>) {
        push(&self.query, result, Some(gate));
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::List { .. }))
            .count()
    }

    pub(crate) fn query_calls(&self) -> Vec<QueryRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Query { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }

    async fn reply(&self, queue: &Mutex<VecDeque<Scripted>>, call: Call) -> Result<BackendReply> {
        self.calls.lock().unwrap().push(call);
        let scripted = queue.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted { result, gate }) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                result
            }
            None => Err(DocsenseError::internal("no scripted reply")),
        }
    }
}

fn push(queue: &Mutex<VecDeque<Scripted>>, result: Result<BackendReply>, gate: Option<Arc<Notify>>) {
    queue.lock().unwrap().push_back(Scripted { result, gate });
}

#[async_trait]
impl DocumentsBackend for MockBackend {
    async fn list_documents(&self, caller_id: &str) -> Result<BackendReply> {
        let call = Call::List {
            caller_id: caller_id.to_string(),
        };
        self.reply(&self.list, call).await
    }

    async fn upload_document(&self, caller_id: &str, file: &UploadFile) -> Result<BackendReply> {
        let call = Call::Upload {
            caller_id: caller_id.to_string(),
            file_name: file.file_name.clone(),
        };
        self.reply(&self.upload, call).await
    }

    async fn query_documents(&self, caller_id: &str, request: &QueryRequest) -> Result<BackendReply> {
        let call = Call::Query {
            caller_id: caller_id.to_string(),
            request: request.clone(),
        };
        self.reply(&self.query, call).await
    }
}

/// Identity watcher resolved to the signed-out state with a fallback caller.
pub(crate) async fn signed_out_watcher(events: &crate::EventBus) -> Arc<crate::IdentityWatcher> {
    let watcher = Arc::new(crate::IdentityWatcher::new(
        Some("dev-caller".to_string()),
        events.clone(),
    ));
    watcher
        .start(&docsense_infrastructure::DevIdentityProvider::new())
        .await;
    watcher
}

/// Drains every event currently queued on `rx`.
pub(crate) fn drain(rx: &mut tokio::sync::broadcast::Receiver<docsense_core::event::AppEvent>) -> Vec<docsense_core::event::AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
