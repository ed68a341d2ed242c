//! Session domain module.
//!
//! A session is one chat's message log plus its streaming state.
//!
//! # Module Structure
//!
//! - `message`: Chat message types (`MessageRole`, `ChatMessage`)
//! - `conversation`: The per-chat state machine (`ConversationSession`)
//!
//! # Usage
//!
//! ```
//! use docsense_core::session::{ConversationSession, MessageRole};
//!
//! let mut session = ConversationSession::new("chat-1");
//! session.append_user_message("What is in the handbook?");
//! let handle = session.begin_assistant_response().unwrap();
//! session.append_chunk(&handle, "Policies.");
//! session.end_assistant_response(&handle);
//!
//! assert_eq!(session.messages()[1].role, MessageRole::Assistant);
//! assert_eq!(session.messages()[1].content, "Policies.");
//! ```

mod conversation;
mod message;

// Re-export public API
pub use conversation::{ConversationSession, ResponseHandle, StreamCursor};
pub use message::{ChatMessage, MessageRole};
