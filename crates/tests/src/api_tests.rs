//! HTTP surface tests, driven in-process with `tower::ServiceExt::oneshot`.

use std::time::Instant;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use server::router::{create_app, AppState};
use waggle_core::{
    alerts::AlertSeverity,
    checkers::{CheckerSet, InspectionOverdueChecker, OverdueConfig},
    hives::HiveRegistry,
    types::UserId,
};

use crate::support::{active_alerts, hive, rig, TestRig};

struct TestApp {
    app: Router,
    rig: TestRig,
    /// Keeps the event channel open; the listener task is not running in
    /// router tests, emits just queue here.
    _events_rx: tokio::sync::mpsc::UnboundedReceiver<waggle_core::events::DomainEvent>,
}

fn test_app() -> TestApp {
    let rig = rig(CheckerSet::new()
        .register(Box::new(InspectionOverdueChecker::new(OverdueConfig::default()))));
    let (events_tx, events_rx) = waggle_core::events::channel();

    let state = AppState {
        sweeper: rig.sweeper.clone(),
        manager: rig.manager.clone(),
        registry: rig.registry.clone(),
        events: events_tx,
        prometheus: None,
        started_at: Instant::now(),
    };

    TestApp { app: create_app(state, 100), rig, _events_rx: events_rx }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, user: Option<UserId>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, user: Option<UserId>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("POST");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_reports_counts() {
    let TestApp { app, rig, .. } = test_app();
    rig.registry.upsert(hive(Uuid::new_v4(), Some(1)));

    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["hives"], 1);
    assert_eq!(json["alerts"], 0);
}

#[tokio::test]
async fn test_trigger_check_sweeps_and_reports_checkers() {
    let TestApp { app, rig, .. } = test_app();
    let user = Uuid::new_v4();
    let ctx = hive(user, Some(20));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);

    let response = app.oneshot(post("/alerts/check", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["checkers"], serde_json::json!(["inspection_overdue"]));
    assert!(json["message"].as_str().unwrap().contains("1 hives checked"));
    assert_eq!(active_alerts(&rig.manager, hive_id).len(), 1);
}

#[tokio::test]
async fn test_checkers_status_endpoint() {
    let TestApp { app, .. } = test_app();

    let response = app.oneshot(get("/alerts/checkers/status", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["checkers"], serde_json::json!(["inspection_overdue"]));
}

#[tokio::test]
async fn test_list_alerts_requires_user_header() {
    let TestApp { app, .. } = test_app();

    let response = app.oneshot(get("/alerts", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_alerts_is_scoped_to_caller() {
    let TestApp { app, rig, .. } = test_app();
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    rig.registry.upsert(hive(owner, Some(20)));
    rig.sweeper.sweep_all();

    let own = app.clone().oneshot(get("/alerts", Some(owner))).await.unwrap();
    assert_eq!(body_json(own).await.as_array().unwrap().len(), 1);

    let foreign = app.oneshot(get("/alerts", Some(stranger))).await.unwrap();
    assert!(body_json(foreign).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_alerts_filters_and_superseded_visibility() {
    let TestApp { app, rig, .. } = test_app();
    let user = Uuid::new_v4();
    let ctx = hive(user, Some(15));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx.clone());
    rig.sweeper.sweep_all();

    // Escalate: backdate the inspection further and re-sweep so the Medium
    // alert supersedes into High.
    let mut escalated = ctx;
    escalated.last_inspection_date =
        Some(chrono::Utc::now() - chrono::Duration::days(40));
    rig.registry.upsert(escalated);
    rig.sweeper.sweep_all();

    let visible = app
        .clone()
        .oneshot(get(&format!("/alerts?hive_id={hive_id}"), Some(user)))
        .await
        .unwrap();
    let visible = body_json(visible).await;
    assert_eq!(visible.as_array().unwrap().len(), 1);
    assert_eq!(visible[0]["severity"], "high");

    let with_history = app
        .clone()
        .oneshot(get(
            &format!("/alerts?hive_id={hive_id}&include_superseded=true"),
            Some(user),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(with_history).await.as_array().unwrap().len(), 2);

    let by_severity = app
        .oneshot(get("/alerts?severity=medium&include_superseded=true", Some(user)))
        .await
        .unwrap();
    let by_severity = body_json(by_severity).await;
    assert_eq!(by_severity.as_array().unwrap().len(), 1);
    assert_eq!(by_severity[0]["status"], "superseded");
}

#[tokio::test]
async fn test_get_alert_not_found_for_foreign_user() {
    let TestApp { app, rig, .. } = test_app();
    let owner = Uuid::new_v4();
    let ctx = hive(owner, Some(20));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);
    rig.sweeper.sweep_all();

    let alert_id = active_alerts(&rig.manager, hive_id)[0].id;

    let own =
        app.clone().oneshot(get(&format!("/alerts/{alert_id}"), Some(owner))).await.unwrap();
    assert_eq!(own.status(), StatusCode::OK);

    let foreign = app
        .oneshot(get(&format!("/alerts/{alert_id}"), Some(Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dismiss_and_resolve_transitions() {
    let TestApp { app, rig, .. } = test_app();
    let user = Uuid::new_v4();
    let ctx = hive(user, Some(20));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);
    rig.sweeper.sweep_all();

    let alert_id = active_alerts(&rig.manager, hive_id)[0].id;

    let response = app
        .clone()
        .oneshot(post(&format!("/alerts/{alert_id}/dismiss"), Some(user)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    // Dismissed is terminal for user actions: resolving it now conflicts.
    let conflict = app
        .oneshot(post(&format!("/alerts/{alert_id}/resolve"), Some(user)))
        .await
        .unwrap();
    assert_eq!(conflict.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_patch_status_transition() {
    let TestApp { app, rig, .. } = test_app();
    let user = Uuid::new_v4();
    let ctx = hive(user, Some(20));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);
    rig.sweeper.sweep_all();

    let alert_id = active_alerts(&rig.manager, hive_id)[0].id;

    let request = Request::builder()
        .uri(format!("/alerts/{alert_id}"))
        .method("PATCH")
        .header("x-user-id", user.to_string())
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status":"resolved"}"#))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "resolved");

    // Re-activating through PATCH is not a legal transition.
    let request = Request::builder()
        .uri(format!("/alerts/{alert_id}"))
        .method("PATCH")
        .header("x-user-id", user.to_string())
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status":"active"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_events_endpoint_accepts_domain_events() {
    let TestApp { app, .. } = test_app();

    let payload = serde_json::json!({
        "type": "inspection.created",
        "hive_id": Uuid::new_v4(),
        "apiary_id": Uuid::new_v4(),
        "user_id": Uuid::new_v4(),
        "recorded_at": chrono::Utc::now(),
        "observations": { "strength": 6.5, "queen_seen": true }
    });
    let request = Request::builder()
        .uri("/events")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_metrics_endpoint_disabled_without_recorder() {
    let TestApp { app, .. } = test_app();

    let response = app.oneshot(get("/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_header_is_attached() {
    let TestApp { app, .. } = test_app();

    let response = app.oneshot(get("/health", None)).await.unwrap();
    let header = response.headers().get("x-request-id");
    assert!(header.is_some(), "response should carry x-request-id");
    assert!(Uuid::parse_str(header.unwrap().to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_request_id_preserved_from_request() {
    let TestApp { app, .. } = test_app();

    let request = Request::builder()
        .uri("/health")
        .method("GET")
        .header("x-request-id", "hive-check-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap().to_str().unwrap(),
        "hive-check-123"
    );
}

#[tokio::test]
async fn test_invalid_severity_query_rejected() {
    let TestApp { app, .. } = test_app();
    let user = Uuid::new_v4();

    let response =
        app.oneshot(get("/alerts?severity=catastrophic", Some(user))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_severity_filter_uses_wire_names() {
    let TestApp { app, rig, .. } = test_app();
    let user = Uuid::new_v4();
    rig.registry.upsert(hive(user, Some(9)));
    rig.sweeper.sweep_all();

    let response = app.oneshot(get("/alerts?severity=low", Some(user))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["severity"], AlertSeverity::Low.as_str());
}
