//! Per-chat conversation state machine.

use super::message::{ChatMessage, MessageRole};
use crate::document::Citation;
use crate::error::{DocsenseError, Result};
use serde::{Deserialize, Serialize};

/// Where the session is in its `Idle → Streaming → Idle` cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StreamCursor {
    /// No assistant response is open; the composer is enabled.
    Idle,
    /// An assistant response is being assembled into `message_id`.
    Streaming { message_id: String },
}

/// Proof that an assistant response was opened.
///
/// The handle stays valid as a value after the response is closed, but every
/// operation through it becomes a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseHandle {
    message_id: String,
}

impl ResponseHandle {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }
}

/// The message log and streaming state of one chat.
///
/// Messages are only ever appended. At most one assistant response is open at
/// a time, and while it is open no user message can be added.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: String,
    messages: Vec<ChatMessage>,
    cursor: StreamCursor,
}

impl ConversationSession {
    /// Creates an empty session in the `Idle` state.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            cursor: StreamCursor::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, message_id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    pub fn cursor(&self) -> &StreamCursor {
        &self.cursor
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.cursor, StreamCursor::Streaming { .. })
    }

    /// Appends a user message.
    ///
    /// # Returns
    ///
    /// - `Some(message_id)`: The trimmed text was appended
    /// - `None`: The text was blank or a response is streaming
    pub fn append_user_message(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || self.is_streaming() {
            return None;
        }

        let message = ChatMessage::new(MessageRole::User, text);
        let id = message.id.clone();
        self.messages.push(message);
        Some(id)
    }

    /// Opens an empty assistant message and enters `Streaming`.
    ///
    /// # Errors
    ///
    /// Returns `DocsenseError::Busy` if a response is already open.
    pub fn begin_assistant_response(&mut self) -> Result<ResponseHandle> {
        if self.is_streaming() {
            return Err(DocsenseError::busy("assistant response"));
        }

        let message = ChatMessage::new(MessageRole::Assistant, "");
        let message_id = message.id.clone();
        self.messages.push(message);
        self.cursor = StreamCursor::Streaming {
            message_id: message_id.clone(),
        };
        Ok(ResponseHandle { message_id })
    }

    /// Appends `text` to the handle's message.
    ///
    /// Returns false without touching anything when the handle is closed.
    pub fn append_chunk(&mut self, handle: &ResponseHandle, text: &str) -> bool {
        match self.open_message_mut(handle) {
            Some(message) => {
                message.content.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Records citations on the handle's message while it is still open.
    pub fn attach_citations(&mut self, handle: &ResponseHandle, citations: Vec<Citation>) -> bool {
        match self.open_message_mut(handle) {
            Some(message) => {
                message.citations.extend(citations);
                true
            }
            None => false,
        }
    }

    /// Closes the response and returns to `Idle`.
    ///
    /// Idempotent: closing an already closed handle changes nothing and
    /// returns false.
    pub fn end_assistant_response(&mut self, handle: &ResponseHandle) -> bool {
        if self.is_open(handle) {
            self.cursor = StreamCursor::Idle;
            true
        } else {
            false
        }
    }

    fn is_open(&self, handle: &ResponseHandle) -> bool {
        matches!(&self.cursor, StreamCursor::Streaming { message_id } if *message_id == handle.message_id)
    }

    fn open_message_mut(&mut self, handle: &ResponseHandle) -> Option<&mut ChatMessage> {
        if !self.is_open(handle) {
            return None;
        }
        self.messages
            .iter_mut()
            .rev()
            .find(|m| m.id == handle.message_id)
    }
}
