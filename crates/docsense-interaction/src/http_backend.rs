//! HTTP implementation of the document endpoints.

use async_trait::async_trait;
use docsense_core::config::ClientConfig;
use docsense_core::document::{BackendReply, DocumentsBackend, QueryRequest, UploadFile};
use docsense_core::error::{DocsenseError, Result};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

const DOCUMENTS_PATH: &str = "/api/documents";
const UPLOAD_PATH: &str = "/api/documents/upload";
const QUERY_PATH: &str = "/api/documents/query";

/// `DocumentsBackend` over reqwest.
///
/// Cheap to clone; clones share the connection pool. Every request carries
/// the caller id in the configured header and is bounded by the configured
/// timeout.
#[derive(Debug, Clone)]
pub struct HttpDocumentsBackend {
    client: reqwest::Client,
    base_url: String,
    caller_header: String,
    timeout: Duration,
}

impl HttpDocumentsBackend {
    /// Builds a backend from the client configuration.
    ///
    /// # Errors
    ///
    /// Returns `DocsenseError::Config` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let timeout = config.request_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocsenseError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            caller_header: config.caller_header.clone(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_send_error(&self, err: reqwest::Error) -> DocsenseError {
        if err.is_timeout() {
            DocsenseError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            DocsenseError::transport(err.to_string())
        }
    }

    /// Sends a request and turns whatever came back into a [`BackendReply`].
    async fn execute(&self, request: reqwest::RequestBuilder, caller_id: &str) -> Result<BackendReply> {
        let response = request
            .header(self.caller_header.as_str(), caller_id)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        let body = serde_json::from_str(&text).ok();
        if body.is_none() {
            tracing::debug!("[HttpDocumentsBackend] Status {} with non-JSON body", status);
        }

        Ok(BackendReply::new(status, body))
    }
}

#[async_trait]
impl DocumentsBackend for HttpDocumentsBackend {
    async fn list_documents(&self, caller_id: &str) -> Result<BackendReply> {
        tracing::debug!("[HttpDocumentsBackend] GET {}", DOCUMENTS_PATH);
        self.execute(self.client.get(self.url(DOCUMENTS_PATH)), caller_id)
            .await
    }

    async fn upload_document(&self, caller_id: &str, file: &UploadFile) -> Result<BackendReply> {
        tracing::debug!(
            "[HttpDocumentsBackend] POST {} ({}, {} bytes)",
            UPLOAD_PATH,
            file.file_name,
            file.bytes.len()
        );

        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        let part = match part.mime_str(&file.mime_type) {
            Ok(part) => part,
            Err(_) => {
                tracing::warn!(
                    "[HttpDocumentsBackend] Ignoring unparsable MIME type '{}'",
                    file.mime_type
                );
                Part::bytes(file.bytes.clone()).file_name(file.file_name.clone())
            }
        };
        let form = Form::new().part("file", part);

        self.execute(self.client.post(self.url(UPLOAD_PATH)).multipart(form), caller_id)
            .await
    }

    async fn query_documents(&self, caller_id: &str, request: &QueryRequest) -> Result<BackendReply> {
        tracing::debug!(
            "[HttpDocumentsBackend] POST {} (top_k={})",
            QUERY_PATH,
            request.top_k
        );
        self.execute(self.client.post(self.url(QUERY_PATH)).json(request), caller_id)
            .await
    }
}
