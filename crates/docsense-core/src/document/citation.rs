use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A source reference attached to an assistant answer.
///
/// Every field is optional because the backend passes through whatever the
/// retrieval service produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub chunk_id: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub chunk_index: Option<i64>,
    #[serde(default)]
    pub text_snippet: Option<String>,
}

impl Citation {
    /// Parses the `citations` field of a query reply.
    ///
    /// Elements that do not deserialize are skipped rather than failing the
    /// whole answer.
    pub fn list_from_reply(body: &Value) -> Vec<Self> {
        body.get("citations")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}
