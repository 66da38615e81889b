use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::{require_text, Priority, Status, Validate};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketInput {
    /// Blank titles are derived from the description.
    #[serde(default)]
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub project_context: String,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Validate for TicketInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketOutput {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    pub estimated_hours: u32,
    pub story_points: u32,
    pub assignee_suggestion: String,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub epic_link: Option<String>,
    #[serde(default)]
    pub sprint_id: Option<String>,
    #[serde(default)]
    pub jira_key: Option<String>,
    #[serde(default)]
    pub github_issue_url: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub technical_requirements: Vec<String>,
    /// 1 to 10.
    pub business_value: u8,
    /// 1 to 10.
    pub complexity_score: u8,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Partial overwrite of a stored ticket. Absent fields are left untouched;
/// `id` and `timestamp` cannot be changed. The optional link fields accept
/// `null`, which clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_suggestion: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub epic_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub jira_key: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub github_issue_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_requirements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_value: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_score: Option<u8>,
}

/// `null` becomes `Some(None)`; an absent field stays `None` through `default`.
fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(deserializer).map(Some)
}

impl TicketUpdate {
    /// The fields this update sets, as a JSON object ready for a partial write.
    pub fn to_fields(&self) -> Result<serde_json::Map<String, serde_json::Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Ok(serde_json::Map::new()),
        }
    }
}

impl Validate for TicketUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("business_value", self.business_value),
            ("complexity_score", self.complexity_score),
        ] {
            if let Some(v) = value {
                if !(1..=10).contains(&v) {
                    return Err(ValidationError::new(field, "must be between 1 and 10"));
                }
            }
        }
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_defaults() {
        let input: TicketInput =
            serde_json::from_value(json!({"description": "Add login page"})).unwrap();
        assert_eq!(input.priority, Priority::Medium);
        assert!(input.title.is_empty());
        assert!(input.labels.is_empty());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn blank_description_is_rejected() {
        let input: TicketInput =
            serde_json::from_value(json!({"title": "t", "description": "   "})).unwrap();
        assert_eq!(input.validate().unwrap_err().field, "description");
    }

    #[test]
    fn update_emits_only_present_fields() {
        let update: TicketUpdate =
            serde_json::from_value(json!({"status": "In Progress", "story_points": 5})).unwrap();
        let fields = update.to_fields().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["status"], json!("In Progress"));
        assert_eq!(fields["story_points"], json!(5));
    }

    #[test]
    fn null_clears_an_optional_link() {
        let update: TicketUpdate =
            serde_json::from_value(json!({"jira_key": null, "epic_link": "EPIC-4"})).unwrap();
        assert_eq!(update.jira_key, Some(None));
        assert_eq!(update.epic_link, Some(Some("EPIC-4".to_string())));
        assert_eq!(update.sprint_id, None);
        let fields = update.to_fields().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["jira_key"], serde_json::Value::Null);
        assert_eq!(fields["epic_link"], json!("EPIC-4"));
    }

    #[test]
    fn update_rejects_identity_fields() {
        assert!(serde_json::from_value::<TicketUpdate>(json!({"id": "other"})).is_err());
        assert!(serde_json::from_value::<TicketUpdate>(json!({"timestamp": "2026-01-01"})).is_err());
    }

    #[test]
    fn update_bounds_scores() {
        let update: TicketUpdate =
            serde_json::from_value(json!({"complexity_score": 11})).unwrap();
        assert_eq!(update.validate().unwrap_err().field, "complexity_score");
    }
}
