//! `scrumpilot serve`: the HTTP JSON API.
//!
//! Endpoints (all under `/api`):
//! - GET  /                          - Service status (exempt from auth)
//! - POST/GET /team/members          - Add / list team members
//! - POST/GET /integrations          - Upsert / read integration settings
//! - POST/GET /standup               - Generate / list standups
//! - POST/GET /ticket, PUT /ticket/{id}
//! - POST/GET /sprint, GET /sprint/{id}/burndown
//! - POST/GET /blockers              - Detect / list blocker reports
//! - POST/GET /retrospective         - Analyze / list retrospectives
//! - GET  /metrics                   - Dashboard metrics
//! - GET  /insights                  - AI insights
//! - GET  /export/{module}/{id}      - Render a stored artifact
//!
//! Generated artifacts are persisted before the response is sent; integration
//! sync, escalations and action items run afterwards on spawned tasks.

mod artifacts;
mod background;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{middleware as axum_middleware, Json, Router};
use tower_http::cors::CorsLayer;

use scrumpilot_core::{ArtifactKind, LlmGateway, OpenAiGateway};
use scrumpilot_storage::{Collection, DocumentStore, MemoryStore};

use crate::config::Settings;

use self::middleware::auth_middleware;
use self::state::{AppState, SharedState};

/// Maximum request body size: 10 MB.
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Routes reachable without an API key.
const HEALTH_PATHS: [&str; 2] = ["/api", "/api/"];

fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Where artifacts of `kind` are stored.
pub(crate) fn collection_for(kind: ArtifactKind) -> Collection {
    match kind {
        ArtifactKind::Standup => Collection::Standups,
        ArtifactKind::Ticket => Collection::Tickets,
        ArtifactKind::Sprint => Collection::Sprints,
        ArtifactKind::Blocker => Collection::Blockers,
        ArtifactKind::Retrospective => Collection::Retrospectives,
    }
}

pub(crate) fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api", get(handlers::health))
        .route("/api/", get(handlers::health))
        .route(
            "/api/team/members",
            get(handlers::list_team_members).post(handlers::add_team_member),
        )
        .route(
            "/api/integrations",
            get(handlers::get_integrations).post(handlers::save_integrations),
        )
        .route(
            "/api/standup",
            get(artifacts::list_standups).post(artifacts::create_standup),
        )
        .route(
            "/api/ticket",
            get(artifacts::list_tickets).post(artifacts::create_ticket),
        )
        .route("/api/ticket/{id}", put(artifacts::update_ticket))
        .route(
            "/api/sprint",
            get(artifacts::list_sprints).post(artifacts::create_sprint),
        )
        .route("/api/sprint/{id}/burndown", get(artifacts::sprint_burndown))
        .route(
            "/api/blockers",
            get(artifacts::list_blockers).post(artifacts::detect_blockers),
        )
        .route(
            "/api/retrospective",
            get(artifacts::list_retrospectives).post(artifacts::create_retrospective),
        )
        .route("/api/metrics", get(handlers::metrics))
        .route("/api/insights", get(handlers::insights))
        .route("/api/export/{module}/{id}", get(handlers::export))
        .fallback(handlers::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Start the HTTP server with an in-memory store and the configured gateway.
pub async fn start_server(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = OpenAiGateway::new(settings.llm.gateway_config());
    if gateway.ensure_configured().is_err() {
        tracing::warn!("no LLM API key configured; standup generation will answer 503");
    }
    let api_key = settings.server.api_key.clone().filter(|k| !k.is_empty());
    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    }

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState {
        store,
        gateway: Arc::new(gateway),
        api_key,
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, model = %settings.llm.model, "ScrumPilot listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for Ctrl+C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received shutdown signal"),
        Err(e) => {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
