//! One composer send, one backend query.
//!
//! The dispatcher appends the user's question, opens an assistant slot,
//! issues the query on its own task and writes whatever came back into the
//! slot. Every path writes exactly one chunk and closes the slot exactly once,
//! so the composer can never stay disabled.

use super::registry::{SessionRegistry, SharedSession};
use crate::event_bus::EventBus;
use crate::identity_watcher::IdentityWatcher;
use docsense_core::document::{BackendReply, Citation, DocumentsBackend, QueryRequest};
use docsense_core::error::DocsenseError;
use docsense_core::event::AppEvent;
use docsense_core::session::{MessageRole, ResponseHandle};
use std::sync::Arc;
use tokio::task::JoinHandle;

const NO_ANSWER: &str = "No answer received";
const SEND_FAILED: &str = "Error: Failed to send query";
const QUERY_FAILED: &str = "Query failed";
const RESPONSE_FAILED: &str = "Failed to get response";

/// Result of [`QueryDispatcher::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The question was blank; nothing was appended.
    Skipped,
    /// A response is already streaming in this session; nothing was appended.
    Busy,
    /// The assistant message holds the backend's answer.
    Answered { message_id: String },
    /// The assistant message holds an error line.
    Failed {
        message_id: String,
        error: DocsenseError,
    },
}

impl SendOutcome {
    /// Id of the assistant message written by this send, if any.
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::Answered { message_id } | Self::Failed { message_id, .. } => Some(message_id),
            Self::Skipped | Self::Busy => None,
        }
    }
}

/// The text and sources to write into an assistant slot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueryResolution {
    pub(crate) chunk: String,
    pub(crate) citations: Vec<Citation>,
    pub(crate) error: Option<DocsenseError>,
}

impl QueryResolution {
    fn failed(chunk: impl Into<String>, error: DocsenseError) -> Self {
        Self {
            chunk: chunk.into(),
            citations: Vec::new(),
            error: Some(error),
        }
    }
}

/// Maps a query reply onto the assistant slot contents.
///
/// A non-OK status, or an OK body carrying `error`, becomes `Error: <error>`.
/// An OK status with an unusable body is treated like a failed send.
pub(crate) fn interpret_query_reply(reply: &BackendReply) -> QueryResolution {
    if !reply.is_success() || reply.error_message().is_some() {
        let message = reply.error_message().map(str::to_string);
        let shown = match (&message, &reply.body) {
            (Some(message), _) => message.as_str(),
            (None, None) => QUERY_FAILED,
            (None, Some(_)) => RESPONSE_FAILED,
        };
        return QueryResolution::failed(
            format!("Error: {}", shown),
            DocsenseError::backend(reply.status, message),
        );
    }

    let Some(body) = reply.body.as_ref().filter(|body| body.is_object()) else {
        return QueryResolution::failed(
            SEND_FAILED,
            DocsenseError::malformed("query reply is not a JSON object"),
        );
    };

    let answer = body
        .get("answer")
        .and_then(|answer| answer.as_str())
        .filter(|answer| !answer.is_empty())
        .unwrap_or(NO_ANSWER);

    QueryResolution {
        chunk: answer.to_string(),
        citations: Citation::list_from_reply(body),
        error: None,
    }
}

/// A question that was accepted and is waiting for its answer.
///
/// The query runs on its own task, so the assistant slot is filled and closed
/// even when nobody waits for [`PendingQuery::finish`].
pub(crate) struct PendingQuery {
    session_id: String,
    session: SharedSession,
    handle: ResponseHandle,
    task: JoinHandle<SendOutcome>,
}

impl PendingQuery {
    /// Waits until the reply has been written into the session.
    pub(crate) async fn finish(self) -> SendOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                tracing::error!(
                    "[QueryDispatcher] Query task in session {} died: {}",
                    self.session_id,
                    join_error
                );
                self.session.lock().await.end_assistant_response(&self.handle);
                SendOutcome::Failed {
                    message_id: self.handle.message_id().to_string(),
                    error: DocsenseError::internal(join_error.to_string()),
                }
            }
        }
    }
}

/// Everything the query task needs, detached from the dispatcher.
struct QueryJob {
    backend: Arc<dyn DocumentsBackend>,
    identity: Arc<IdentityWatcher>,
    events: EventBus,
    top_k: u32,
    session_id: String,
    question: String,
    session: SharedSession,
    handle: ResponseHandle,
}

impl QueryJob {
    async fn run(self) -> SendOutcome {
        let resolution = self.resolve().await;

        {
            let mut session = self.session.lock().await;
            session.append_chunk(&self.handle, &resolution.chunk);
            if !resolution.citations.is_empty() {
                session.attach_citations(&self.handle, resolution.citations);
            }
            session.end_assistant_response(&self.handle);
        }

        let message_id = self.handle.message_id().to_string();
        self.events.publish(AppEvent::ChunkAppended {
            session_id: self.session_id.clone(),
            message_id: message_id.clone(),
            chunk: resolution.chunk,
        });
        self.events.publish(AppEvent::ResponseFinished {
            session_id: self.session_id.clone(),
            message_id: message_id.clone(),
        });

        match resolution.error {
            None => SendOutcome::Answered { message_id },
            Some(error) => {
                tracing::warn!("[QueryDispatcher] Query in session {} failed: {}", self.session_id, error);
                SendOutcome::Failed { message_id, error }
            }
        }
    }

    async fn resolve(&self) -> QueryResolution {
        let caller_id = match self.identity.caller_id().await {
            Ok(caller_id) => caller_id,
            Err(error) => return QueryResolution::failed(SEND_FAILED, error),
        };

        let request = QueryRequest::new(&self.question, self.top_k);
        match self.backend.query_documents(&caller_id, &request).await {
            Ok(reply) => interpret_query_reply(&reply),
            Err(error) => QueryResolution::failed(SEND_FAILED, error),
        }
    }
}

/// Sends composer questions to the backend and fills assistant slots.
pub struct QueryDispatcher {
    backend: Arc<dyn DocumentsBackend>,
    sessions: Arc<SessionRegistry>,
    identity: Arc<IdentityWatcher>,
    events: EventBus,
    top_k: u32,
}

impl QueryDispatcher {
    /// Creates a dispatcher.
    ///
    /// # Arguments
    ///
    /// * `backend` - Backend the queries go to
    /// * `sessions` - Registry holding the per-chat sessions
    /// * `identity` - Source of the caller id
    /// * `events` - Bus receiving message and chunk notifications
    /// * `top_k` - Number of chunks requested per query
    pub fn new(
        backend: Arc<dyn DocumentsBackend>,
        sessions: Arc<SessionRegistry>,
        identity: Arc<IdentityWatcher>,
        events: EventBus,
        top_k: u32,
    ) -> Self {
        Self {
            backend,
            sessions,
            identity,
            events,
            top_k,
        }
    }

    /// Sends one question in the given session.
    ///
    /// Blank questions and sends while a response is streaming are rejected
    /// without touching the session. Otherwise the outcome always names the
    /// assistant message that was written, and the session is idle again when
    /// this returns. Dropping the returned future does not abandon the slot:
    /// the query finishes in the background and closes it.
    pub async fn send(&self, session_id: &str, question: &str) -> SendOutcome {
        match self.begin(session_id, question).await {
            Ok(pending) => pending.finish().await,
            Err(rejected) => rejected,
        }
    }

    /// Appends the question, opens the assistant slot and starts the query.
    ///
    /// # Returns
    ///
    /// - `Ok(pending)`: The question was accepted and the query is running
    /// - `Err(SendOutcome::Skipped | SendOutcome::Busy)`: Nothing was appended
    pub(crate) async fn begin(
        &self,
        session_id: &str,
        question: &str,
    ) -> std::result::Result<PendingQuery, SendOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SendOutcome::Skipped);
        }

        let session = self.sessions.get_or_create(session_id).await;
        let (user_message_id, handle) = {
            let mut session = session.lock().await;
            if session.is_streaming() {
                tracing::debug!("[QueryDispatcher] Session {} busy, send rejected", session_id);
                return Err(SendOutcome::Busy);
            }
            let Some(user_message_id) = session.append_user_message(question) else {
                return Err(SendOutcome::Skipped);
            };
            match session.begin_assistant_response() {
                Ok(handle) => (user_message_id, handle),
                Err(_) => return Err(SendOutcome::Busy),
            }
        };

        self.events.publish(AppEvent::MessageAppended {
            session_id: session_id.to_string(),
            message_id: user_message_id,
            role: MessageRole::User,
        });
        self.events.publish(AppEvent::MessageAppended {
            session_id: session_id.to_string(),
            message_id: handle.message_id().to_string(),
            role: MessageRole::Assistant,
        });

        let job = QueryJob {
            backend: self.backend.clone(),
            identity: self.identity.clone(),
            events: self.events.clone(),
            top_k: self.top_k,
            session_id: session_id.to_string(),
            question: question.to_string(),
            session: session.clone(),
            handle: handle.clone(),
        };

        Ok(PendingQuery {
            session_id: session_id.to_string(),
            session,
            handle,
            task: tokio::spawn(job.run()),
        })
    }
}
