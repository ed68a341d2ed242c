//! Session application services.
//!
//! This module contains the per-chat session registry and the dispatcher
//! that turns one composer send into one backend query.

mod dispatcher;
mod registry;

pub use dispatcher::{QueryDispatcher, SendOutcome};
pub use registry::{SessionRegistry, SharedSession};
