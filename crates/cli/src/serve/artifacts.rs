//! Generate-and-persist routes for the five artifact kinds, plus listings.
//!
//! A POST validates its body, runs the generation function, stores the
//! record and returns it. Listings are newest first.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use scrumpilot_core::generate::{
    generate_blockers, generate_retrospective, generate_sprint, generate_standup,
    generate_ticket, simulate_burndown,
};
use scrumpilot_core::schema::{
    BlockerInput, BlockerOutput, Priority, RetrospectiveInput, RetrospectiveOutput, Severity,
    SprintBurndown, SprintInput, SprintOutput, StandupInput, StandupOutput, Status, TicketInput,
    TicketOutput, TicketUpdate,
};
use scrumpilot_core::{timestamp, ArtifactKind, Validate};
use scrumpilot_storage::{from_document, to_document, Filter, FindOptions};

use super::background;
use super::collection_for;
use super::error::ApiError;
use super::state::SharedState;

const DEFAULT_LIMIT: usize = 10;
const DEFAULT_SPRINT_LIMIT: usize = 5;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_sprint_limit() -> usize {
    DEFAULT_SPRINT_LIMIT
}

async fn persist<T: serde::Serialize>(
    state: &SharedState,
    kind: ArtifactKind,
    record: &T,
) -> Result<(), ApiError> {
    state
        .store
        .insert(collection_for(kind), to_document(record)?)
        .await?;
    Ok(())
}

/// At most `limit` records, newest first. A zero limit lists nothing.
async fn newest<T: DeserializeOwned>(
    state: &SharedState,
    kind: ArtifactKind,
    filter: Filter,
    limit: usize,
) -> Result<Vec<T>, ApiError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let documents = state
        .store
        .find(
            collection_for(kind),
            &filter,
            &FindOptions::newest_first("timestamp", limit),
        )
        .await?;
    let records = documents
        .into_iter()
        .map(from_document)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(records)
}

// ---- standup ----

/// POST /api/standup
pub(crate) async fn create_standup(
    State(state): State<SharedState>,
    Json(input): Json<StandupInput>,
) -> Result<Json<StandupOutput>, ApiError> {
    input.validate()?;
    let standup = generate_standup(state.gateway.as_ref(), &input).await?;
    persist(&state, ArtifactKind::Standup, &standup).await?;
    tracing::info!(
        id = %standup.id,
        member = %standup.team_member_id,
        risk = %standup.risk_assessment.risk_level.as_str(),
        "standup generated"
    );
    background::sync_integrations(state, ArtifactKind::Standup, standup.id.clone());
    Ok(Json(standup))
}

#[derive(Debug, Deserialize)]
pub(crate) struct StandupQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    team_member_id: Option<String>,
}

/// GET /api/standup
pub(crate) async fn list_standups(
    State(state): State<SharedState>,
    Query(query): Query<StandupQuery>,
) -> Result<Json<Vec<StandupOutput>>, ApiError> {
    let mut filter = Filter::new();
    if let Some(member) = query.team_member_id {
        filter = filter.eq("team_member_id", member);
    }
    Ok(Json(
        newest(&state, ArtifactKind::Standup, filter, query.limit).await?,
    ))
}

// ---- ticket ----

/// POST /api/ticket
pub(crate) async fn create_ticket(
    State(state): State<SharedState>,
    Json(input): Json<TicketInput>,
) -> Result<Json<TicketOutput>, ApiError> {
    input.validate()?;
    let ticket = generate_ticket(&input, &mut rand::thread_rng());
    persist(&state, ArtifactKind::Ticket, &ticket).await?;
    tracing::info!(id = %ticket.id, points = ticket.story_points, "ticket generated");
    background::sync_integrations(state, ArtifactKind::Ticket, ticket.id.clone());
    Ok(Json(ticket))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TicketQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    status: Option<Status>,
    priority: Option<Priority>,
}

/// GET /api/ticket
pub(crate) async fn list_tickets(
    State(state): State<SharedState>,
    Query(query): Query<TicketQuery>,
) -> Result<Json<Vec<TicketOutput>>, ApiError> {
    let mut filter = Filter::new();
    if let Some(status) = query.status {
        filter = filter.eq("status", status.as_str());
    }
    if let Some(priority) = query.priority {
        filter = filter.eq("priority", priority.as_str());
    }
    Ok(Json(
        newest(&state, ArtifactKind::Ticket, filter, query.limit).await?,
    ))
}

/// PUT /api/ticket/{id}
///
/// Overwrites the supplied fields only. `id` and `timestamp` are not
/// updatable fields, so a body naming them is rejected.
pub(crate) async fn update_ticket(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(update): Json<TicketUpdate>,
) -> Result<Json<TicketOutput>, ApiError> {
    update.validate()?;
    let fields = update.to_fields()?;
    let document = state
        .store
        .update_fields(collection_for(ArtifactKind::Ticket), &id, fields)
        .await?;
    tracing::info!(%id, "ticket updated");
    Ok(Json(from_document(document)?))
}

// ---- sprint ----

/// POST /api/sprint
pub(crate) async fn create_sprint(
    State(state): State<SharedState>,
    Json(input): Json<SprintInput>,
) -> Result<Json<SprintOutput>, ApiError> {
    input.validate()?;
    let sprint = generate_sprint(&input, &mut rand::thread_rng());
    persist(&state, ArtifactKind::Sprint, &sprint).await?;
    tracing::info!(
        id = %sprint.id,
        tasks = sprint.tasks.len(),
        utilization = sprint.capacity_utilization,
        "sprint planned"
    );
    background::sync_integrations(state, ArtifactKind::Sprint, sprint.id.clone());
    Ok(Json(sprint))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SprintQuery {
    #[serde(default = "default_sprint_limit")]
    limit: usize,
    #[serde(default)]
    active_only: bool,
}

/// GET /api/sprint
///
/// `active_only` keeps sprints whose start/end range contains now.
pub(crate) async fn list_sprints(
    State(state): State<SharedState>,
    Query(query): Query<SprintQuery>,
) -> Result<Json<Vec<SprintOutput>>, ApiError> {
    let mut filter = Filter::new();
    if query.active_only {
        let now = timestamp::to_rfc3339(timestamp::now())
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        filter = filter.lte("start_date", now.as_str()).gte("end_date", now);
    }
    Ok(Json(
        newest(&state, ArtifactKind::Sprint, filter, query.limit).await?,
    ))
}

/// GET /api/sprint/{id}/burndown
pub(crate) async fn sprint_burndown(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SprintBurndown>, ApiError> {
    let document = state
        .store
        .find_one(collection_for(ArtifactKind::Sprint), &Filter::by_id(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("sprint {} not found", id)))?;
    let sprint: SprintOutput = from_document(document)?;
    let chart = simulate_burndown(&sprint.id, sprint.total_story_points, &mut rand::thread_rng());
    Ok(Json(chart))
}

// ---- blockers ----

/// POST /api/blockers
pub(crate) async fn detect_blockers(
    State(state): State<SharedState>,
    Json(input): Json<BlockerInput>,
) -> Result<Json<BlockerOutput>, ApiError> {
    input.validate()?;
    let report = generate_blockers(&input, &mut rand::thread_rng());
    persist(&state, ArtifactKind::Blocker, &report).await?;
    tracing::info!(id = %report.id, alerts = report.alerts.len(), "blockers detected");
    background::process_escalations(&report);
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockerQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    severity: Option<String>,
}

/// GET /api/blockers
///
/// With `severity`, each report keeps only alerts of that severity and
/// reports left without alerts are dropped.
pub(crate) async fn list_blockers(
    State(state): State<SharedState>,
    Query(query): Query<BlockerQuery>,
) -> Result<Json<Vec<BlockerOutput>>, ApiError> {
    let severity = match query.severity.as_deref().map(str::parse::<Severity>) {
        Some(Ok(severity)) => Some(severity),
        // No alert carries an unknown severity.
        Some(Err(_)) => return Ok(Json(Vec::new())),
        None => None,
    };
    let reports: Vec<BlockerOutput> =
        newest(&state, ArtifactKind::Blocker, Filter::new(), query.limit).await?;
    let reports = match severity {
        Some(severity) => reports
            .into_iter()
            .filter_map(|r| r.narrowed_to(severity))
            .collect(),
        None => reports,
    };
    Ok(Json(reports))
}

// ---- retrospective ----

/// POST /api/retrospective
pub(crate) async fn create_retrospective(
    State(state): State<SharedState>,
    Json(input): Json<RetrospectiveInput>,
) -> Result<Json<RetrospectiveOutput>, ApiError> {
    input.validate()?;
    let retrospective = generate_retrospective(&input, &mut rand::thread_rng());
    persist(&state, ArtifactKind::Retrospective, &retrospective).await?;
    tracing::info!(
        id = %retrospective.id,
        sprint = %retrospective.sprint_id,
        health = retrospective.team_health_score,
        "retrospective analyzed"
    );
    background::create_action_items(&retrospective);
    Ok(Json(retrospective))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RetrospectiveQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    sprint_id: Option<String>,
}

/// GET /api/retrospective
pub(crate) async fn list_retrospectives(
    State(state): State<SharedState>,
    Query(query): Query<RetrospectiveQuery>,
) -> Result<Json<Vec<RetrospectiveOutput>>, ApiError> {
    let mut filter = Filter::new();
    if let Some(sprint_id) = query.sprint_id {
        filter = filter.eq("sprint_id", sprint_id);
    }
    Ok(Json(
        newest(&state, ArtifactKind::Retrospective, filter, query.limit).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{offline_state, test_state};
    use super::*;
    use scrumpilot_storage::Collection;
    use serde_json::json;

    fn from<T: DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    fn standup_input() -> StandupInput {
        from(json!({
            "team_member_id": "u-1",
            "team_member_name": "Alice",
            "yesterday": "Reviewed the login PR",
            "today": "Pairing on checkout",
            "blockers": "Waiting on API keys",
            "confidence_level": 3
        }))
    }

    #[tokio::test]
    async fn unconfigured_gateway_is_unavailable_and_persists_nothing() {
        let state = test_state();
        let err = create_standup(State(state.clone()), Json(standup_input()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unavailable(_)));
        let stored = state
            .store
            .count_matching(Collection::Standups, &Filter::new())
            .await
            .unwrap();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn unreachable_gateway_falls_back_and_persists() {
        let state = offline_state();
        let Json(standup) = create_standup(State(state.clone()), Json(standup_input()))
            .await
            .unwrap();
        assert_eq!(standup.summary, "Daily standup completed by Alice");
        assert_eq!(standup.team_member_id, "u-1");

        let query = StandupQuery {
            limit: 10,
            team_member_id: Some("u-1".to_string()),
        };
        let Json(listed) = list_standups(State(state), Query(query)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, standup.id);
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_rejected() {
        let mut input = standup_input();
        input.confidence_level = 11;
        let err = create_standup(State(offline_state()), Json(input))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn ticket_update_overwrites_only_given_fields() {
        let state = test_state();
        let input: TicketInput = from(json!({
            "title": "Checkout",
            "description": "Fix the payment API bug for customers"
        }));
        let Json(ticket) = create_ticket(State(state.clone()), Json(input)).await.unwrap();

        let update: TicketUpdate = from(json!({"status": "In Progress", "story_points": 8}));
        let Json(updated) = update_ticket(State(state.clone()), Path(ticket.id.clone()), Json(update))
            .await
            .unwrap();
        assert_eq!(updated.id, ticket.id);
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.story_points, 8);
        assert_eq!(updated.title, "Checkout");
        assert_eq!(updated.timestamp, ticket.timestamp);

        let query = TicketQuery {
            limit: 10,
            status: Some(Status::InProgress),
            priority: None,
        };
        let Json(listed) = list_tickets(State(state.clone()), Query(query)).await.unwrap();
        assert_eq!(listed.len(), 1);

        let update: TicketUpdate = from(json!({"title": "x"}));
        let err = update_ticket(State(state), Path("missing".to_string()), Json(update))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn zero_limit_lists_nothing() {
        let state = test_state();
        for description in ["Fix login bug", "Add export API", "Tidy dashboard UI"] {
            let input: TicketInput = from(json!({ "description": description }));
            create_ticket(State(state.clone()), Json(input)).await.unwrap();
        }
        let query = TicketQuery {
            limit: 0,
            status: None,
            priority: None,
        };
        let Json(listed) = list_tickets(State(state.clone()), Query(query)).await.unwrap();
        assert!(listed.is_empty());

        let query = TicketQuery {
            limit: 2,
            status: None,
            priority: None,
        };
        let Json(listed) = list_tickets(State(state), Query(query)).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn null_clears_ticket_links() {
        let state = test_state();
        let input: TicketInput = from(json!({"description": "Add the invoice export API"}));
        let Json(ticket) = create_ticket(State(state.clone()), Json(input)).await.unwrap();

        let set: TicketUpdate = from(json!({"jira_key": "PAY-12", "sprint_id": "s-3"}));
        let Json(updated) = update_ticket(State(state.clone()), Path(ticket.id.clone()), Json(set))
            .await
            .unwrap();
        assert_eq!(updated.jira_key.as_deref(), Some("PAY-12"));

        let clear: TicketUpdate = from(json!({"jira_key": null}));
        let Json(cleared) = update_ticket(State(state), Path(ticket.id), Json(clear))
            .await
            .unwrap();
        assert_eq!(cleared.jira_key, None);
        assert_eq!(cleared.sprint_id.as_deref(), Some("s-3"));
    }

    fn sprint_input(start: &str, end: &str) -> SprintInput {
        from(json!({
            "name": "Sprint 9",
            "objectives": "Ship checkout\nHarden auth",
            "start_date": start,
            "end_date": end,
            "team_members": ["a", "b"]
        }))
    }

    #[tokio::test]
    async fn active_only_keeps_sprints_spanning_now() {
        let state = test_state();
        for (start, end) in [
            ("2020-01-01T00:00:00", "2020-01-15T00:00:00"),
            ("2020-02-01T00:00:00", "2999-01-01T00:00:00"),
        ] {
            create_sprint(State(state.clone()), Json(sprint_input(start, end)))
                .await
                .unwrap();
        }
        let all = SprintQuery {
            limit: 5,
            active_only: false,
        };
        let Json(listed) = list_sprints(State(state.clone()), Query(all)).await.unwrap();
        assert_eq!(listed.len(), 2);

        let active = SprintQuery {
            limit: 5,
            active_only: true,
        };
        let Json(listed) = list_sprints(State(state.clone()), Query(active)).await.unwrap();
        assert_eq!(listed.len(), 1);

        let Json(chart) = sprint_burndown(State(state.clone()), Path(listed[0].id.clone()))
            .await
            .unwrap();
        assert_eq!(chart.burndown_data.len(), 15);
        assert_eq!(
            chart.burndown_data[0].actual_remaining,
            listed[0].total_story_points
        );

        let err = sprint_burndown(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn year_zero_sprint_is_rejected_before_generation() {
        let state = test_state();
        let input = sprint_input("0000-01-01", "0000-01-01");
        let err = create_sprint(State(state.clone()), Json(input))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let stored = state
            .store
            .count_matching(Collection::Sprints, &Filter::new())
            .await
            .unwrap();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn severity_filter_narrows_and_drops_reports() {
        let state = test_state();
        for _ in 0..5 {
            detect_blockers(State(state.clone()), Json(BlockerInput::default()))
                .await
                .unwrap();
        }
        let query = BlockerQuery {
            limit: 10,
            severity: Some("critical".to_string()),
        };
        let Json(reports) = list_blockers(State(state.clone()), Query(query)).await.unwrap();
        assert!(reports.len() <= 5);
        for report in &reports {
            assert!(!report.alerts.is_empty());
            assert!(report.alerts.iter().all(|a| a.severity == Severity::Critical));
        }

        let query = BlockerQuery {
            limit: 10,
            severity: Some("urgent".to_string()),
        };
        let Json(reports) = list_blockers(State(state), Query(query)).await.unwrap();
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn retrospectives_list_by_sprint() {
        let state = test_state();
        for sprint in ["s-1", "s-2", "s-1"] {
            let input: RetrospectiveInput = from(json!({
                "sprint_id": sprint,
                "went_well": "Pairing",
                "went_poorly": "Flaky CI",
                "improvements": "Fix CI",
                "goals_met": 80
            }));
            create_retrospective(State(state.clone()), Json(input))
                .await
                .unwrap();
        }
        let query = RetrospectiveQuery {
            limit: 10,
            sprint_id: Some("s-1".to_string()),
        };
        let Json(listed) = list_retrospectives(State(state), Query(query)).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].timestamp >= listed[1].timestamp);
    }
}
