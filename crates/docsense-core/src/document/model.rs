//! Sidebar entries and document list normalisation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Namespace for ids minted on the client.
///
/// Every id in this namespace was generated by [`generate_local_id`]; backend
/// ids that collide with it are replaced during normalisation.
pub const LOCAL_ID_PREFIX: &str = "local:";

/// Title used when a backend item has neither `title` nor `filename`.
pub const UNTITLED_LABEL: &str = "Untitled";

/// Generates a fresh id in the local namespace.
pub fn generate_local_id() -> String {
    format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4())
}

/// A document or chat entry shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Backend id, or a `local:` id for synthetic entries
    pub id: String,
    /// Display title
    pub title: String,
}

impl ChatSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    /// Creates a synthetic entry that exists only until the next sync.
    pub fn local(title: impl Into<String>) -> Self {
        Self::new(generate_local_id(), title)
    }

    /// Returns true if the id was minted on the client.
    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_ID_PREFIX)
    }

    /// Normalises one item of a backend list response.
    ///
    /// `null` items are dropped. A missing, non-string or empty `id`, or one
    /// already in the local namespace, is replaced with a generated local id. The title falls back from `title`
    /// to `filename` to [`UNTITLED_LABEL`], treating empty strings as missing.
    pub fn from_backend_item(item: &Value) -> Option<Self> {
        if item.is_null() {
            return None;
        }

        let id = non_empty_str(item, "id")
            .filter(|id| !id.starts_with(LOCAL_ID_PREFIX))
            .map(str::to_string)
            .unwrap_or_else(generate_local_id);
        let title = non_empty_str(item, "title")
            .or_else(|| non_empty_str(item, "filename"))
            .unwrap_or(UNTITLED_LABEL)
            .to_string();

        Some(Self { id, title })
    }
}

/// Normalises a whole list response.
///
/// Anything that is not a JSON array yields an empty list.
pub fn normalize_document_list(body: &Value) -> Vec<ChatSummary> {
    match body.as_array() {
        Some(items) => items.iter().filter_map(ChatSummary::from_backend_item).collect(),
        None => Vec::new(),
    }
}

fn non_empty_str<'a>(item: &'a Value, field: &str) -> Option<&'a str> {
    item.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_with_id_and_title() {
        let list = normalize_document_list(&json!([{ "id": "d1", "title": "Report" }]));
        assert_eq!(list, vec![ChatSummary::new("d1", "Report")]);
    }

    #[test]
    fn test_item_with_only_filename_gets_generated_id() {
        let list = normalize_document_list(&json!([{ "filename": "x.pdf" }]));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "x.pdf");
        assert!(list[0].is_local());
        assert!(list[0].id.len() > LOCAL_ID_PREFIX.len());
    }

    #[test]
    fn test_null_body_yields_empty_list() {
        assert!(normalize_document_list(&Value::Null).is_empty());
    }

    #[test]
    fn test_non_array_body_yields_empty_list() {
        assert!(normalize_document_list(&json!({ "items": [] })).is_empty());
        assert!(normalize_document_list(&json!("documents")).is_empty());
    }

    #[test]
    fn test_null_items_are_dropped() {
        let list = normalize_document_list(&json!([null, { "id": "d2", "title": "Kept" }]));
        assert_eq!(list, vec![ChatSummary::new("d2", "Kept")]);
    }

    #[test]
    fn test_non_string_and_empty_fields_fall_back() {
        let list = normalize_document_list(&json!([
            { "id": 42, "title": "", "filename": "notes.md" },
            { "id": "", "title": null },
        ]));

        assert_eq!(list.len(), 2);
        assert!(list[0].is_local());
        assert_eq!(list[0].title, "notes.md");
        assert!(list[1].is_local());
        assert_eq!(list[1].title, UNTITLED_LABEL);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let list = normalize_document_list(&json!([{}, {}]));
        assert_ne!(list[0].id, list[1].id);
    }

    #[test]
    fn test_backend_id_in_local_namespace_is_replaced() {
        let list = normalize_document_list(&json!([{ "id": "local:abc", "title": "Server doc" }]));
        assert_eq!(list.len(), 1);
        assert_ne!(list[0].id, "local:abc");
        assert!(list[0].is_local());
        assert_eq!(list[0].title, "Server doc");
    }

    #[test]
    fn test_backend_uuid_is_not_local() {
        let summary = ChatSummary::new("2f1c7c4e-8d4b-4c7a-9a55-0d3f4f0b1a2e", "Handbook");
        assert!(!summary.is_local());
        assert!(ChatSummary::local("New chat").is_local());
    }
}
