//! Document domain module.
//!
//! # Module Structure
//!
//! - `model`: Sidebar entries (`ChatSummary`) and list normalisation
//! - `citation`: Auxiliary query citations (`Citation`)
//! - `backend`: The backend REST surface (`DocumentsBackend`) and its wire types

mod backend;
mod citation;
mod model;

// Re-export public API
pub use backend::{BackendReply, DocumentsBackend, QueryRequest, UploadFile};
pub use citation::Citation;
pub use model::{
    ChatSummary, LOCAL_ID_PREFIX, UNTITLED_LABEL, generate_local_id, normalize_document_list,
};
