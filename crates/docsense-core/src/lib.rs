//! Core domain layer for the DocSense client.
//!
//! This crate holds everything that does not talk to the network or the
//! filesystem: the conversation state machine, document list normalisation,
//! identity types, the shared error taxonomy and the traits that the
//! infrastructure and interaction crates implement.

pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod identity;
pub mod session;

// Re-export common error type
pub use error::DocsenseError;
