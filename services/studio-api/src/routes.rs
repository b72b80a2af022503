use crate::infra::{AppState, StudioHub};
use audit_studio::error::AppError;
use audit_studio::session::ActionKind;
use audit_studio::{StudioEvent, StudioSnapshot};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct PathUpdate {
    pub(crate) project_path: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplySafeUpdate {
    pub(crate) apply_safe: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtifactRequest {
    pub(crate) artifact_path: String,
}

/// Outcome of a client-side clipboard copy of the preview pane.
#[derive(Debug, Deserialize)]
pub(crate) struct CopyOutcome {
    pub(crate) copied: bool,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

type SnapshotResult = Result<Json<StudioSnapshot>, AppError>;

/// Session endpoints. Every mutating call answers with the fresh snapshot.
pub(crate) fn studio_router(hub: Arc<StudioHub>) -> Router {
    Router::new()
        .route("/api/v1/studio/snapshot", get(snapshot_handler))
        .route("/api/v1/studio/path", put(path_handler))
        .route("/api/v1/studio/apply-safe", put(apply_safe_handler))
        .route("/api/v1/studio/actions/:action", post(action_handler))
        .route("/api/v1/studio/artifacts/open", post(artifact_handler))
        .route(
            "/api/v1/studio/simulator/:id/toggle",
            post(simulator_toggle_handler),
        )
        .route("/api/v1/studio/tour/start", post(tour_start_handler))
        .route("/api/v1/studio/tour/stop", post(tour_stop_handler))
        .route("/api/v1/studio/tutorial/begin", post(tutorial_begin_handler))
        .route(
            "/api/v1/studio/tutorial/advance",
            post(tutorial_advance_handler),
        )
        .route("/api/v1/studio/preview/copied", post(preview_copied_handler))
        .route("/api/v1/studio/history", delete(clear_history_handler))
        .route("/api/v1/studio/starter-command", get(starter_command_handler))
        .with_state(hub)
}

pub(crate) fn with_studio_routes(hub: Arc<StudioHub>) -> Router {
    studio_router(hub)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

async fn submit(hub: &Arc<StudioHub>, event: StudioEvent) -> SnapshotResult {
    Ok(Json(hub.drive(event).await?))
}

async fn snapshot_handler(State(hub): State<Arc<StudioHub>>) -> Json<StudioSnapshot> {
    Json(hub.snapshot())
}

async fn path_handler(
    State(hub): State<Arc<StudioHub>>,
    Json(update): Json<PathUpdate>,
) -> SnapshotResult {
    submit(
        &hub,
        StudioEvent::PathEdited {
            project_path: update.project_path,
        },
    )
    .await
}

async fn apply_safe_handler(
    State(hub): State<Arc<StudioHub>>,
    Json(update): Json<ApplySafeUpdate>,
) -> SnapshotResult {
    submit(
        &hub,
        StudioEvent::ApplySafeToggled {
            apply_safe: update.apply_safe,
        },
    )
    .await
}

async fn action_handler(
    State(hub): State<Arc<StudioHub>>,
    Path(action): Path<String>,
) -> SnapshotResult {
    let action: ActionKind = action.parse()?;
    submit(&hub, StudioEvent::ActionRequested { action }).await
}

async fn artifact_handler(
    State(hub): State<Arc<StudioHub>>,
    Json(request): Json<ArtifactRequest>,
) -> SnapshotResult {
    submit(
        &hub,
        StudioEvent::ArtifactRequested {
            artifact_path: request.artifact_path,
        },
    )
    .await
}

async fn simulator_toggle_handler(
    State(hub): State<Arc<StudioHub>>,
    Path(id): Path<String>,
) -> SnapshotResult {
    submit(&hub, StudioEvent::SimulationToggled { id }).await
}

async fn tour_start_handler(State(hub): State<Arc<StudioHub>>) -> SnapshotResult {
    submit(&hub, StudioEvent::TourStartRequested).await
}

async fn tour_stop_handler(State(hub): State<Arc<StudioHub>>) -> SnapshotResult {
    submit(&hub, StudioEvent::TourStopRequested).await
}

async fn tutorial_begin_handler(State(hub): State<Arc<StudioHub>>) -> SnapshotResult {
    submit(&hub, StudioEvent::TutorialBegun).await
}

async fn tutorial_advance_handler(State(hub): State<Arc<StudioHub>>) -> SnapshotResult {
    submit(&hub, StudioEvent::TutorialAdvanced).await
}

async fn preview_copied_handler(
    State(hub): State<Arc<StudioHub>>,
    Json(outcome): Json<CopyOutcome>,
) -> SnapshotResult {
    let event = if outcome.copied {
        StudioEvent::PreviewCopied
    } else {
        StudioEvent::ClipboardFailed {
            reason: outcome.reason.unwrap_or_default(),
        }
    };
    submit(&hub, event).await
}

async fn clear_history_handler(State(hub): State<Arc<StudioHub>>) -> SnapshotResult {
    submit(&hub, StudioEvent::HistoryCleared).await
}

async fn starter_command_handler(State(hub): State<Arc<StudioHub>>) -> Json<serde_json::Value> {
    Json(json!({ "command": hub.snapshot().starter_command }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "initializing")
    };
    (status, Json(json!({ "status": label })))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::testing::{hub_with, ScriptedBackend};
    use audit_studio::StudioError;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    fn router(backend: Arc<ScriptedBackend>) -> Router {
        with_studio_routes(hub_with(backend, Duration::from_secs(60)))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    async fn set_path(router: &Router, path: &str) {
        let response = router
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/v1/studio/path",
                json!({ "project_path": path }),
            ))
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn fresh_snapshot_is_idle_and_empty() {
        let response = router(Arc::new(ScriptedBackend::default()))
            .oneshot(empty_request("GET", "/api/v1/studio/snapshot"))
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["busy"], json!(false));
        assert_eq!(body["score"], Value::Null);
        assert_eq!(body["tutorial"]["status"]["state"], json!("not_started"));
        assert_eq!(body["tour"]["can_start"], json!(true));
    }

    #[tokio::test]
    async fn audit_action_returns_updated_snapshot() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.respond(Ok(json!({
            "report": {
                "scorecard": { "overall": 77.0 },
                "checks": [
                    { "check_id": "ci", "status": "fail", "severity": "high", "title": "CI" }
                ]
            }
        })));
        let router = router(backend.clone());
        set_path(&router, "/work/app").await;

        let response = router
            .oneshot(empty_request("POST", "/api/v1/studio/actions/audit"))
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["score"]["overall"], json!(77.0));
        assert_eq!(body["findings"][0]["check_id"], json!("ci"));
        assert_eq!(body["history"].as_array().map(Vec::len), Some(1));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn action_without_path_is_bad_request() {
        let backend = Arc::new(ScriptedBackend::default());
        let response = router(backend.clone())
            .oneshot(empty_request("POST", "/api/v1/studio/actions/ship"))
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            read_json(response).await,
            json!({ "error": "Project path is required." })
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_action_is_bad_request() {
        let response = router(Arc::new(ScriptedBackend::default()))
            .oneshot(empty_request("POST", "/api/v1/studio/actions/deploy"))
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            read_json(response).await,
            json!({ "error": "Unknown action: deploy" })
        );
    }

    #[tokio::test]
    async fn backend_failure_is_bad_gateway_and_recorded() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.respond(Err(StudioError::RequestFailure("Request failed".into())));
        let router = router(backend);
        set_path(&router, "/work/app").await;

        let response = router
            .clone()
            .oneshot(empty_request("POST", "/api/v1/studio/actions/roadmap"))
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            read_json(response).await,
            json!({ "error": "Request failed" })
        );

        let snapshot = router
            .oneshot(empty_request("GET", "/api/v1/studio/snapshot"))
            .await
            .expect("route responds");
        let body = read_json(snapshot).await;
        assert_eq!(body["busy"], json!(false));
        assert_eq!(body["timeline"][0]["message"], json!("Error: Request failed"));
    }

    #[tokio::test]
    async fn artifact_open_requires_a_path() {
        let response = router(Arc::new(ScriptedBackend::default()))
            .oneshot(json_request(
                "POST",
                "/api/v1/studio/artifacts/open",
                json!({ "artifact_path": "/work/app/coach.md" }),
            ))
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            read_json(response).await,
            json!({ "error": "Set a project path first." })
        );
    }

    #[tokio::test]
    async fn tour_start_and_stop_round_trip() {
        let router = router(Arc::new(ScriptedBackend::default()));

        let started = router
            .clone()
            .oneshot(empty_request("POST", "/api/v1/studio/tour/start"))
            .await
            .expect("route responds");
        let body = read_json(started).await;
        assert_eq!(body["tour"]["running"], json!(true));
        assert_eq!(body["tour"]["cursor"], json!(0));
        assert_eq!(body["tour"]["steps"][0]["mark"], json!("active"));

        let stopped = router
            .oneshot(empty_request("POST", "/api/v1/studio/tour/stop"))
            .await
            .expect("route responds");
        let body = read_json(stopped).await;
        assert_eq!(body["tour"]["running"], json!(false));
        assert_eq!(body["timeline"][0]["message"], json!("Demo tour stopped."));
    }

    #[tokio::test]
    async fn clipboard_failure_shows_recoverable_toast() {
        let response = router(Arc::new(ScriptedBackend::default()))
            .oneshot(json_request(
                "POST",
                "/api/v1/studio/preview/copied",
                json!({ "copied": false, "reason": "permission denied" }),
            ))
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["toast"]["message"], json!("Clipboard copy failed"));
    }

    #[tokio::test]
    async fn starter_command_tracks_the_session_path() {
        let router = router(Arc::new(ScriptedBackend::default()));

        let placeholder = router
            .clone()
            .oneshot(empty_request("GET", "/api/v1/studio/starter-command"))
            .await
            .expect("route responds");
        let body = read_json(placeholder).await;
        assert!(body["command"]
            .as_str()
            .is_some_and(|command| command.contains("<your-project-path>")));

        set_path(&router, "/work/app").await;
        let response = router
            .oneshot(empty_request("GET", "/api/v1/studio/starter-command"))
            .await
            .expect("route responds");
        let body = read_json(response).await;
        assert!(body["command"]
            .as_str()
            .is_some_and(|command| command.contains("/work/app")));
    }
}
