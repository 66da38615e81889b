//! Export of stored artifacts in audience-specific formats.
//!
//! Standup and retrospective renderings are computed at generation time and
//! stored on the record; export only picks the stored string. Formats not
//! authored for a kind get a generic JSON-based rendering.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::generate::title_case;
use crate::generate::truncate_chars;
use crate::schema::ArtifactKind;

/// Characters of pretty JSON quoted in a generic Slack export.
const SLACK_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Json,
    #[default]
    Markdown,
    Slack,
    Jira,
    /// Any other requested format; rendered as pretty JSON.
    Other(String),
}

impl ExportFormat {
    pub fn parse(format: &str) -> Self {
        match format.trim().to_ascii_lowercase().as_str() {
            "json" => ExportFormat::Json,
            "markdown" | "md" => ExportFormat::Markdown,
            "slack" => ExportFormat::Slack,
            "jira" => ExportFormat::Jira,
            other => ExportFormat::Other(other.to_string()),
        }
    }
}

/// Response body of an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportPayload {
    /// `format=json`: the record itself.
    Record(Value),
    Rendered {
        content: String,
        content_type: &'static str,
    },
}

impl ExportPayload {
    fn text(content: String, content_type: &'static str) -> Self {
        ExportPayload::Rendered {
            content,
            content_type,
        }
    }
}

fn stored_text(record: &Map<String, Value>, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Render a stored record. `include_metadata = false` drops `id` and
/// `timestamp` before rendering.
pub fn render_export(
    kind: ArtifactKind,
    record: &Map<String, Value>,
    format: &ExportFormat,
    include_metadata: bool,
) -> Result<ExportPayload, serde_json::Error> {
    let mut record = record.clone();
    if !include_metadata {
        record.remove("id");
        record.remove("timestamp");
    }
    let heading = title_case(kind.as_str());
    let pretty = || serde_json::to_string_pretty(&record);

    let payload = match (format, kind) {
        (ExportFormat::Json, _) => ExportPayload::Record(Value::Object(record.clone())),

        (ExportFormat::Markdown, ArtifactKind::Standup) => {
            ExportPayload::text(stored_text(&record, "markdown_format"), "text/markdown")
        }
        (ExportFormat::Markdown, ArtifactKind::Retrospective) => {
            ExportPayload::text(stored_text(&record, "formatted_output"), "text/markdown")
        }
        (ExportFormat::Markdown, _) => ExportPayload::text(
            format!("# {} Export\n\n{}", heading, pretty()?),
            "text/markdown",
        ),

        (ExportFormat::Slack, ArtifactKind::Standup) => {
            ExportPayload::text(stored_text(&record, "slack_format"), "text/plain")
        }
        (ExportFormat::Slack, _) => {
            let json = pretty()?;
            ExportPayload::text(
                format!(
                    "*{} Update*\n```{}...```",
                    heading,
                    truncate_chars(&json, SLACK_PREVIEW_CHARS)
                ),
                "text/plain",
            )
        }

        (ExportFormat::Jira, ArtifactKind::Standup) => {
            ExportPayload::text(stored_text(&record, "jira_format"), "text/plain")
        }
        (ExportFormat::Jira, ArtifactKind::Ticket) => {
            let title = record
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("Ticket");
            let criteria = record
                .get("acceptance_criteria")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|c| format!("* {}", c))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .unwrap_or_default();
            ExportPayload::text(
                format!(
                    "h2. {}\n\n{}\n\nh3. Acceptance Criteria\n{}",
                    title,
                    stored_text(&record, "description"),
                    criteria
                ),
                "text/plain",
            )
        }

        (ExportFormat::Jira, _) | (ExportFormat::Other(_), _) => {
            ExportPayload::text(pretty()?, "application/json")
        }
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn standup() -> Map<String, Value> {
        record(json!({
            "id": "st-1",
            "timestamp": "2026-03-01T09:00:00Z",
            "markdown_format": "# Daily Standup",
            "slack_format": "*Daily Standup*",
            "jira_format": "[STANDUP]",
            "formatted_output": "**Daily**"
        }))
    }

    #[test]
    fn parses_formats() {
        assert_eq!(ExportFormat::parse("JSON"), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("slack"), ExportFormat::Slack);
        assert_eq!(
            ExportFormat::parse("csv"),
            ExportFormat::Other("csv".to_string())
        );
        assert_eq!(ExportFormat::default(), ExportFormat::Markdown);
    }

    #[test]
    fn standup_exports_pick_stored_renderings() {
        let rec = standup();
        for (format, expected, content_type) in [
            (ExportFormat::Markdown, "# Daily Standup", "text/markdown"),
            (ExportFormat::Slack, "*Daily Standup*", "text/plain"),
            (ExportFormat::Jira, "[STANDUP]", "text/plain"),
        ] {
            let payload = render_export(ArtifactKind::Standup, &rec, &format, true).unwrap();
            assert_eq!(
                payload,
                ExportPayload::Rendered {
                    content: expected.to_string(),
                    content_type
                }
            );
        }
    }

    #[test]
    fn json_export_can_drop_metadata() {
        let with = render_export(ArtifactKind::Standup, &standup(), &ExportFormat::Json, true)
            .unwrap();
        let without =
            render_export(ArtifactKind::Standup, &standup(), &ExportFormat::Json, false).unwrap();
        match (with, without) {
            (ExportPayload::Record(with), ExportPayload::Record(without)) => {
                assert_eq!(with["id"], "st-1");
                assert!(without.get("id").is_none());
                assert!(without.get("timestamp").is_none());
                assert_eq!(without["slack_format"], "*Daily Standup*");
            }
            other => panic!("unexpected payloads {:?}", other),
        }
    }

    #[test]
    fn ticket_jira_export_lists_criteria() {
        let rec = record(json!({
            "id": "t-1",
            "title": "Login",
            "description": "As a user...",
            "acceptance_criteria": ["works", "is tested"]
        }));
        let payload = render_export(ArtifactKind::Ticket, &rec, &ExportFormat::Jira, true).unwrap();
        let ExportPayload::Rendered { content, .. } = payload else {
            panic!("expected rendered text");
        };
        assert_eq!(
            content,
            "h2. Login\n\nAs a user...\n\nh3. Acceptance Criteria\n* works\n* is tested"
        );
    }

    #[test]
    fn unauthored_formats_fall_back_to_json_text() {
        let rec = record(json!({"id": "sp-1", "name": "Sprint 3"}));
        let payload =
            render_export(ArtifactKind::Sprint, &rec, &ExportFormat::Markdown, true).unwrap();
        let ExportPayload::Rendered { content, content_type } = payload else {
            panic!("expected rendered text");
        };
        assert!(content.starts_with("# Sprint Export\n\n{"));
        assert_eq!(content_type, "text/markdown");

        let payload = render_export(ArtifactKind::Blocker, &rec, &ExportFormat::Jira, true).unwrap();
        assert!(matches!(
            payload,
            ExportPayload::Rendered { content_type: "application/json", .. }
        ));

        let payload = render_export(
            ArtifactKind::Sprint,
            &rec,
            &ExportFormat::Other("csv".into()),
            true,
        )
        .unwrap();
        let ExportPayload::Rendered { content, .. } = payload else {
            panic!("expected rendered text");
        };
        assert_eq!(serde_json::from_str::<Value>(&content).unwrap()["name"], "Sprint 3");
    }

    #[test]
    fn slack_preview_is_truncated() {
        let rec = record(json!({"id": "b-1", "summary": "x".repeat(2000)}));
        let payload = render_export(ArtifactKind::Blocker, &rec, &ExportFormat::Slack, true).unwrap();
        let ExportPayload::Rendered { content, .. } = payload else {
            panic!("expected rendered text");
        };
        assert!(content.starts_with("*Blocker Update*\n```"));
        assert!(content.ends_with("...```"));
        assert!(content.chars().count() < 540);
    }
}
