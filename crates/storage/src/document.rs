use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// A stored document: a JSON object with no schema enforced by the store.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Field every document is keyed by.
pub const ID_FIELD: &str = "id";

/// The named document collections ScrumPilot persists into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    TeamMembers,
    IntegrationSettings,
    Standups,
    Tickets,
    Sprints,
    Blockers,
    Retrospectives,
    AiInsights,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::TeamMembers,
        Collection::IntegrationSettings,
        Collection::Standups,
        Collection::Tickets,
        Collection::Sprints,
        Collection::Blockers,
        Collection::Retrospectives,
        Collection::AiInsights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::TeamMembers => "team_members",
            Collection::IntegrationSettings => "integration_settings",
            Collection::Standups => "standups",
            Collection::Tickets => "tickets",
            Collection::Sprints => "sprints",
            Collection::Blockers => "blockers",
            Collection::Retrospectives => "retrospectives",
            Collection::AiInsights => "ai_insights",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a typed record into a document.
///
/// Fails if the record does not serialize to a JSON object.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document, StorageError> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StorageError::Serialization(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Deserialize a stored document back into a typed record.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, StorageError> {
    Ok(serde_json::from_value(serde_json::Value::Object(document))?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: String,
        points: u32,
    }

    #[test]
    fn typed_record_converts_to_document() {
        let doc = to_document(&Sample {
            id: "s-1".to_string(),
            points: 5,
        })
        .unwrap();
        assert_eq!(doc.get(ID_FIELD), Some(&serde_json::json!("s-1")));
        assert_eq!(doc.get("points"), Some(&serde_json::json!(5)));
        let back: Sample = from_document(doc).unwrap();
        assert_eq!(back.points, 5);
    }

    #[test]
    fn non_object_record_is_rejected() {
        let err = to_document(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(msg) if msg.contains("an array")));
    }

    #[test]
    fn collection_names_are_snake_case() {
        assert_eq!(Collection::Retrospectives.to_string(), "retrospectives");
        assert_eq!(Collection::AiInsights.as_str(), "ai_insights");
        assert_eq!(Collection::ALL.len(), 8);
    }
}
