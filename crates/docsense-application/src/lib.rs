//! Application layer for DocSense.
//!
//! This crate provides the controllers that coordinate the core domain with
//! the backend and identity seams, plus the view-state glue the front-end
//! renders from.
//!
//! # Module Structure
//!
//! - `app_home`: composition root wiring every controller to UI affordances
//! - `auth_form`: login/sign-up form state
//! - `document_sync`: sidebar list synchronisation with cancellation
//! - `event_bus`: broadcast of `AppEvent`s to the presentation layer
//! - `identity_watcher`: process-wide identity snapshot
//! - `session`: per-chat sessions and the query dispatcher
//! - `upload`: single-file upload lifecycle
//! - `view_state`: sidebar, search, profile menu and composer state

pub mod app_home;
pub mod auth_form;
pub mod document_sync;
pub mod event_bus;
pub mod identity_watcher;
pub mod session;
pub mod upload;
pub mod view_state;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export public API
pub use app_home::AppHome;
pub use auth_form::{AuthForm, AuthMode};
pub use document_sync::{DocumentListState, DocumentSyncController, SyncOutcome};
pub use event_bus::EventBus;
pub use identity_watcher::{AuthGuard, IdentityWatcher};
pub use session::{QueryDispatcher, SendOutcome, SessionRegistry};
pub use upload::{UploadController, UploadOutcome, UploadPhase};
pub use view_state::ViewState;
