//! Chat message types.

use crate::document::Citation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the assistant.
    Assistant,
}

/// A single message in a chat.
///
/// User messages are complete when created. Assistant messages start empty and
/// are filled through [`super::ConversationSession::append_chunk`] until the
/// response is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique within the owning session.
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The message text.
    pub content: String,
    /// Sources backing an assistant answer. Empty for user messages.
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Timestamp when the message was created (ISO 8601 format).
    pub created_at: String,
}

impl ChatMessage {
    pub(crate) fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            citations: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
