//! Alert endpoint handlers and router assembly.

use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, limit::RequestBodyLimitLayer};
use tracing::info;
use uuid::Uuid;

use waggle_core::{
    alerts::{
        Alert, AlertError, AlertFilter, AlertManager, AlertSeverity, AlertStatus, AlertSweeper,
    },
    events::{DomainEvent, EventSender},
    hives::HiveRegistry,
    metrics::PrometheusHandle,
    types::UserId,
};

use crate::middleware;

/// Maximum request body size: alert transitions and domain events are tiny.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub sweeper: Arc<AlertSweeper>,
    pub manager: Arc<AlertManager>,
    pub registry: Arc<dyn HiveRegistry>,
    pub events: EventSender,
    /// Prometheus handle when metrics are enabled.
    pub prometheus: Option<PrometheusHandle>,
    /// Server start time for uptime reporting.
    pub started_at: Instant,
}

/// Builds the application router with its middleware stack.
#[must_use]
pub fn create_app(state: AppState, max_concurrent_requests: usize) -> Router {
    let (set_request_id, propagate_request_id) = middleware::create_request_id_layers();

    Router::new()
        .route("/health", get(handle_health))
        .route("/metrics", get(handle_metrics))
        .route("/alerts", get(list_alerts))
        .route("/alerts/check", post(trigger_check))
        .route("/alerts/checkers/status", get(checkers_status))
        .route("/alerts/:id", get(get_alert).patch(update_alert))
        .route("/alerts/:id/dismiss", post(dismiss_alert))
        .route("/alerts/:id/resolve", post(resolve_alert))
        .route("/events", post(ingest_event))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(propagate_request_id)
        .layer(set_request_id)
}

// ========== Request/Response Types ==========

/// Query parameters for listing alerts.
#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    pub hive_id: Option<Uuid>,
    /// Filter by issue type, e.g. `inspection_overdue`.
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub status: Option<AlertStatus>,
    /// Superseded alerts are history; hidden unless explicitly requested.
    #[serde(default)]
    pub include_superseded: bool,
}

/// Request body for PATCHing an alert.
#[derive(Debug, Deserialize)]
pub struct UpdateAlertRequest {
    pub status: AlertStatus,
}

/// Response for a manually triggered sweep.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub message: String,
    pub checkers: Vec<&'static str>,
}

/// Response listing registered checker type names.
#[derive(Debug, Serialize)]
pub struct CheckersStatusResponse {
    pub checkers: Vec<&'static str>,
}

/// Response for successful operations.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Liveness response with registry/store counters.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub hives: usize,
    pub alerts: usize,
}

// ========== Helpers ==========

/// Extracts the calling user from the `x-user-id` header.
///
/// The platform gateway injects the header after authenticating the caller;
/// a missing or malformed value is a client error here.
fn caller(headers: &HeaderMap) -> Result<UserId, StatusCode> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or(StatusCode::BAD_REQUEST)
}

fn alert_error_status(error: &AlertError) -> StatusCode {
    match error {
        AlertError::NotFound => StatusCode::NOT_FOUND,
        AlertError::InvalidTransition { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ========== Handlers ==========

/// GET /health
async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.started_at.elapsed().as_secs(),
        hives: state.registry.len(),
        alerts: state.manager.total_alerts(),
    })
}

/// GET /metrics
async fn handle_metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    state.prometheus.as_ref().map(PrometheusHandle::render).ok_or(StatusCode::NOT_FOUND)
}

/// POST /alerts/check
///
/// Manually triggers a full alert sweep.
async fn trigger_check(State(state): State<AppState>) -> impl IntoResponse {
    let summary = state.sweeper.sweep_all();

    Json(CheckResponse {
        message: format!(
            "Alert check completed: {} hives checked, {} issues found, {} failed",
            summary.hives_checked, summary.issues_found, summary.hives_failed
        ),
        checkers: state.sweeper.checker_types(),
    })
}

/// GET /alerts/checkers/status
async fn checkers_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(CheckersStatusResponse { checkers: state.sweeper.checker_types() })
}

/// GET /alerts
///
/// Lists the caller's alerts with optional hive/type/severity/status filters.
async fn list_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<Vec<Alert>>, StatusCode> {
    let user_id = caller(&headers)?;

    let filter = AlertFilter {
        hive_id: query.hive_id,
        user_id: Some(user_id),
        issue_type: query.issue_type,
        severity: query.severity,
        status: query.status,
        include_superseded: query.include_superseded,
    };

    state.manager.list(&filter).map(Json).map_err(|e| alert_error_status(&e))
}

/// GET /alerts/:id
async fn get_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(alert_id): Path<Uuid>,
) -> Result<Json<Alert>, StatusCode> {
    let user_id = caller(&headers)?;
    state.manager.get(alert_id, user_id).map(Json).map_err(|e| alert_error_status(&e))
}

/// PATCH /alerts/:id
///
/// Applies a user-requested status transition.
async fn update_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(alert_id): Path<Uuid>,
    Json(payload): Json<UpdateAlertRequest>,
) -> Result<Json<Alert>, StatusCode> {
    let user_id = caller(&headers)?;
    state
        .manager
        .update_status(alert_id, user_id, payload.status)
        .map(Json)
        .map_err(|e| alert_error_status(&e))
}

/// POST /alerts/:id/dismiss
async fn dismiss_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(alert_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, StatusCode> {
    let user_id = caller(&headers)?;

    state
        .manager
        .dismiss(alert_id, user_id)
        .map(|_| {
            Json(SuccessResponse { success: true, message: Some("Alert dismissed".to_string()) })
        })
        .map_err(|e| alert_error_status(&e))
}

/// POST /alerts/:id/resolve
async fn resolve_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(alert_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, StatusCode> {
    let user_id = caller(&headers)?;

    state
        .manager
        .resolve(alert_id, user_id)
        .map(|_| {
            Json(SuccessResponse { success: true, message: Some("Alert resolved".to_string()) })
        })
        .map_err(|e| alert_error_status(&e))
}

/// POST /events
///
/// Ingests a domain event from the platform gateway. Fire-and-forget: the
/// event is queued for the listener task and the request returns immediately.
async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<DomainEvent>,
) -> impl IntoResponse {
    info!(hive = %event.hive_id(), "domain event received");
    state.events.emit(event);

    (StatusCode::ACCEPTED, Json(SuccessResponse { success: true, message: None }))
}
