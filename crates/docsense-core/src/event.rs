use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::session::MessageRole;

/// Notifications published to the presentation layer.
///
/// Every state change a view needs to re-render is announced here; the core
/// makes no assumption about how it is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// A message was appended to a session (assistant messages start empty).
    MessageAppended {
        session_id: String,
        message_id: String,
        role: MessageRole,
    },
    /// Text was appended to the open assistant message.
    ChunkAppended {
        session_id: String,
        message_id: String,
        chunk: String,
    },
    /// The assistant response was closed; the composer is enabled again.
    ResponseFinished {
        session_id: String,
        message_id: String,
    },
    /// A document sync started.
    DocumentsLoading,
    /// The sidebar list was replaced.
    DocumentsChanged { count: usize },
    /// A sync failed and the list was cleared.
    DocumentsSyncFailed { message: String },
    /// An upload was accepted and is in flight.
    UploadStarted { file_name: String },
    /// The backend acknowledged an upload.
    UploadFinished { file_name: String },
    /// An upload failed; `message` is the notice shown to the user.
    UploadFailed { file_name: String, message: String },
    /// The signed-in user changed.
    IdentityChanged { identity: Option<Identity> },
}
