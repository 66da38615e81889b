//! Supporting routes: health, team, integrations, dashboard, insights, export.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use scrumpilot_core::export::{render_export, ExportFormat, ExportPayload};
use scrumpilot_core::generate::{assemble_metrics, canned_insights, CollectionCounts};
use scrumpilot_core::schema::{
    new_id, AiInsight, DashboardMetrics, IntegrationSettings, TeamMember,
};
use scrumpilot_core::{timestamp, ArtifactKind, Validate, SCRUMPILOT_VERSION};
use scrumpilot_storage::{
    from_document, to_document, Collection, Filter, FindOptions, StorageError,
};

use super::error::ApiError;
use super::state::SharedState;
use super::{collection_for, json_error};

const TEAM_LIST_LIMIT: usize = 100;
/// Retrospectives averaged into the dashboard health score.
const HEALTH_WINDOW: usize = 3;

/// Fallback handler for unmatched routes.
pub(crate) async fn not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /api/
pub(crate) async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "ScrumPilot API",
        "version": SCRUMPILOT_VERSION,
        "features": [
            "AI standup summaries",
            "Ticket generation",
            "Sprint planning",
            "Blocker detection",
            "Retrospective analysis",
            "Dashboard metrics",
        ],
        "status": "healthy",
    }))
}

/// POST /api/team/members
///
/// The stored id is always freshly generated; any id in the body is ignored.
pub(crate) async fn add_team_member(
    State(state): State<SharedState>,
    Json(mut member): Json<TeamMember>,
) -> Result<Json<TeamMember>, ApiError> {
    member.validate()?;
    member.id = new_id();
    state
        .store
        .insert(Collection::TeamMembers, to_document(&member)?)
        .await?;
    tracing::info!(member = %member.id, role = %member.role, "team member added");
    Ok(Json(member))
}

/// GET /api/team/members
pub(crate) async fn list_team_members(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TeamMember>>, ApiError> {
    let documents = state
        .store
        .find(
            Collection::TeamMembers,
            &Filter::new(),
            &FindOptions::limit(TEAM_LIST_LIMIT),
        )
        .await?;
    let members = documents
        .into_iter()
        .map(from_document)
        .collect::<Result<Vec<TeamMember>, _>>()?;
    Ok(Json(members))
}

/// POST /api/integrations
pub(crate) async fn save_integrations(
    State(state): State<SharedState>,
    Json(settings): Json<IntegrationSettings>,
) -> Result<Json<IntegrationSettings>, ApiError> {
    settings.validate()?;
    state
        .store
        .replace_or_insert(
            Collection::IntegrationSettings,
            &settings.id,
            to_document(&settings)?,
        )
        .await?;
    tracing::info!(integrations = ?settings.status(), "integration settings saved");
    Ok(Json(settings))
}

async fn current_integrations(
    state: &SharedState,
) -> Result<Option<IntegrationSettings>, StorageError> {
    state
        .store
        .find_one(Collection::IntegrationSettings, &Filter::new())
        .await?
        .map(from_document)
        .transpose()
}

/// GET /api/integrations
pub(crate) async fn get_integrations(
    State(state): State<SharedState>,
) -> Result<Json<IntegrationSettings>, ApiError> {
    Ok(Json(current_integrations(&state).await?.unwrap_or_default()))
}

/// GET /api/metrics
pub(crate) async fn metrics(
    State(state): State<SharedState>,
) -> Result<Json<DashboardMetrics>, ApiError> {
    let all = Filter::new();
    let store = &state.store;
    let counts = CollectionCounts {
        standups: store.count_matching(Collection::Standups, &all).await?,
        tickets: store.count_matching(Collection::Tickets, &all).await?,
        sprints: store.count_matching(Collection::Sprints, &all).await?,
        blockers: store.count_matching(Collection::Blockers, &all).await?,
        retrospectives: store.count_matching(Collection::Retrospectives, &all).await?,
    };

    let recent = store
        .find(
            Collection::Retrospectives,
            &all,
            &FindOptions::newest_first("timestamp", HEALTH_WINDOW),
        )
        .await?;
    let scores: Vec<u8> = recent
        .iter()
        .filter_map(|doc| doc.get("team_health_score").and_then(|v| v.as_u64()))
        .map(|score| score.min(100) as u8)
        .collect();

    let integrations = current_integrations(&state).await?;
    let metrics = assemble_metrics(
        counts,
        &scores,
        integrations.as_ref(),
        &mut rand::thread_rng(),
        timestamp::now(),
    );
    Ok(Json(metrics))
}

#[derive(Debug, Deserialize)]
pub(crate) struct InsightsQuery {
    category: Option<String>,
    #[serde(default = "default_insight_limit")]
    limit: usize,
}

fn default_insight_limit() -> usize {
    10
}

/// GET /api/insights
///
/// Every returned insight is upserted into the insights collection.
pub(crate) async fn insights(
    State(state): State<SharedState>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<Vec<AiInsight>>, ApiError> {
    let insights = canned_insights(query.category.as_deref(), query.limit, timestamp::now());
    for insight in &insights {
        state
            .store
            .replace_or_insert(Collection::AiInsights, &insight.id, to_document(insight)?)
            .await?;
    }
    Ok(Json(insights))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportQuery {
    #[serde(default)]
    format: Option<String>,
    #[serde(default = "include_metadata_default")]
    include_metadata: bool,
}

fn include_metadata_default() -> bool {
    true
}

/// GET /api/export/{module}/{id}
pub(crate) async fn export(
    State(state): State<SharedState>,
    Path((module, id)): Path<(String, String)>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<ExportPayload>, ApiError> {
    let kind: ArtifactKind = module.parse().map_err(ApiError::NotFound)?;
    let document = state
        .store
        .find_one(collection_for(kind), &Filter::by_id(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", kind, id)))?;

    let format = query
        .format
        .as_deref()
        .map(ExportFormat::parse)
        .unwrap_or_default();
    let payload = render_export(kind, &document, &format, query.include_metadata)?;
    Ok(Json(payload))
}
