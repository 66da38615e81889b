//! Post-processing that runs after a generation response is sent.
//!
//! Tasks are fire-and-forget: failures are logged and never reach the
//! client. No external system is contacted; each step records what it
//! would do.

use scrumpilot_core::schema::{BlockerOutput, IntegrationSettings, RetrospectiveOutput};
use scrumpilot_core::ArtifactKind;
use scrumpilot_storage::{from_document, Collection, Filter, StorageError};

use super::state::SharedState;

/// Announce a new standup, ticket or sprint to the enabled integrations.
pub(crate) fn sync_integrations(state: SharedState, kind: ArtifactKind, id: String) {
    tokio::spawn(async move {
        if let Err(e) = notify_integrations(&state, kind, &id).await {
            tracing::error!(artifact = %kind, %id, error = %e, "integration sync failed");
        }
    });
}

async fn notify_integrations(
    state: &SharedState,
    kind: ArtifactKind,
    id: &str,
) -> Result<(), StorageError> {
    let settings = match state
        .store
        .find_one(Collection::IntegrationSettings, &Filter::new())
        .await?
    {
        Some(doc) => from_document::<IntegrationSettings>(doc)?,
        None => {
            tracing::debug!(artifact = %kind, %id, "no integrations configured");
            return Ok(());
        }
    };
    if !settings.auto_sync {
        return Ok(());
    }

    let targets: Vec<&str> = [
        ("jira", settings.jira_enabled()),
        ("slack", settings.slack_enabled()),
        ("github", settings.github_enabled()),
    ]
    .into_iter()
    .filter_map(|(name, enabled)| enabled.then_some(name))
    .collect();
    if !targets.is_empty() {
        tracing::info!(artifact = %kind, %id, ?targets, "syncing artifact to integrations");
    }
    Ok(())
}

/// Log escalations and automatic resolutions for a blocker report.
pub(crate) fn process_escalations(report: &BlockerOutput) {
    let report_id = report.id.clone();
    let escalations: Vec<(String, String)> = report
        .alerts
        .iter()
        .filter(|a| a.escalation_required)
        .map(|a| (a.title.clone(), a.severity.as_str().to_string()))
        .collect();
    let auto_resolvable = report
        .alerts
        .iter()
        .filter(|a| a.auto_resolution_available)
        .count();

    tokio::spawn(async move {
        for (title, severity) in &escalations {
            tracing::warn!(report = %report_id, %title, %severity, "escalating blocker");
        }
        if auto_resolvable > 0 {
            tracing::info!(report = %report_id, auto_resolvable, "attempting automatic resolutions");
        }
    });
}

/// Record the retrospective's action items as follow-up tasks.
pub(crate) fn create_action_items(retrospective: &RetrospectiveOutput) {
    let sprint_id = retrospective.sprint_id.clone();
    let items = retrospective.action_items.clone();
    tokio::spawn(async move {
        for item in &items {
            tracing::info!(sprint = %sprint_id, %item, "action item created");
        }
    });
}
