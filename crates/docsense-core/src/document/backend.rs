//! Backend REST surface.
//!
//! The client talks to three endpoints. The trait returns the raw reply
//! (status plus parsed body) so the controllers can apply their own
//! interpretation rules: the same non-OK status means "fail closed" for a
//! sync but "show an error bubble" for a query.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A reply that made it back from the backend.
///
/// `body` is `None` when the payload was not valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: u16,
    pub body: Option<Value>,
}

impl BackendReply {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Shorthand for a `200 OK` reply with a JSON body.
    pub fn ok(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body's non-empty `error` string, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

/// Body of `POST /api/documents/query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub top_k: u32,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, top_k: u32) -> Self {
        Self {
            query: query.into(),
            top_k,
        }
    }
}

/// A single file ready to be sent as the multipart `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// The document endpoints of the backend.
///
/// Every call carries the caller identity. Implementations return `Err` only
/// when no reply was received (transport failure or timeout); any HTTP
/// status, including errors, comes back as a [`BackendReply`].
#[async_trait]
pub trait DocumentsBackend: Send + Sync {
    /// `GET /api/documents`
    async fn list_documents(&self, caller_id: &str) -> Result<BackendReply>;

    /// `POST /api/documents/upload`
    async fn upload_document(&self, caller_id: &str, file: &UploadFile) -> Result<BackendReply>;

    /// `POST /api/documents/query`
    async fn query_documents(&self, caller_id: &str, request: &QueryRequest) -> Result<BackendReply>;
}
