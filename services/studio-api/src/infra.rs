use crate::backend::{decode_value, ActionBackend};
use audit_studio::report::{ActionPayload, ArtifactPreview};
use audit_studio::session::{artifact_request_body, ARTIFACT_ENDPOINT};
use audit_studio::{Effect, StudioError, StudioEvent, StudioSnapshot, StudioState, Transition};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct HubSettings {
    pub(crate) tour_interval: Duration,
    pub(crate) toast_hide: Duration,
    pub(crate) backend_timeout: Duration,
}

struct TourTimer {
    run_id: u64,
    handle: JoinHandle<()>,
}

/// Owns the single studio session and runs the effects its transitions ask
/// for. The state lock is never held across an await.
pub(crate) struct StudioHub {
    state: Mutex<StudioState>,
    backend: Arc<dyn ActionBackend>,
    settings: HubSettings,
    tour_timer: Mutex<Option<TourTimer>>,
}

impl StudioHub {
    pub(crate) fn new(
        state: StudioState,
        backend: Arc<dyn ActionBackend>,
        settings: HubSettings,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            backend,
            settings,
            tour_timer: Mutex::new(None),
        }
    }

    pub(crate) fn snapshot(&self) -> StudioSnapshot {
        self.state
            .lock()
            .expect("studio state mutex poisoned")
            .snapshot()
    }

    /// Apply a user event and carry out everything it triggers, including
    /// backend round trips. A backend failure is committed to the session
    /// first and then returned.
    ///
    /// The work runs on its own task, so a caller that goes away mid-request
    /// still gets its completion applied and the busy gate released.
    pub(crate) async fn drive(
        self: &Arc<Self>,
        event: StudioEvent,
    ) -> Result<StudioSnapshot, StudioError> {
        let hub = Arc::clone(self);
        tokio::spawn(hub.run_event(event))
            .await
            .unwrap_or_else(|err| {
                tracing::error!(error = %err, "studio event task failed");
                Err(StudioError::RequestFailure(format!(
                    "studio event task failed: {err}"
                )))
            })
    }

    async fn run_event(self: Arc<Self>, event: StudioEvent) -> Result<StudioSnapshot, StudioError> {
        let mut pending = VecDeque::from(self.apply(event)?);
        let mut failure = None;

        while let Some(effect) = pending.pop_front() {
            let follow_up = match effect {
                Effect::Dispatch {
                    action,
                    endpoint,
                    body,
                } => {
                    let result = self
                        .call_backend(endpoint, body)
                        .await
                        .and_then(decode_value::<ActionPayload>);
                    match result {
                        Ok(payload) => StudioEvent::ActionSucceeded {
                            action,
                            payload: Box::new(payload),
                        },
                        Err(error) => {
                            failure = Some(error.clone());
                            StudioEvent::ActionFailed { action, error }
                        }
                    }
                }
                Effect::FetchArtifact {
                    project_path,
                    artifact_path,
                } => {
                    let body = artifact_request_body(&project_path, &artifact_path);
                    let result = self
                        .call_backend(ARTIFACT_ENDPOINT, body)
                        .await
                        .and_then(decode_value::<ArtifactPreview>);
                    match result {
                        Ok(preview) => StudioEvent::ArtifactLoaded {
                            requested: artifact_path,
                            preview,
                        },
                        Err(error) => {
                            failure = Some(error.clone());
                            StudioEvent::ArtifactFailed { error }
                        }
                    }
                }
                other => {
                    self.execute(other);
                    continue;
                }
            };
            pending.extend(self.apply(follow_up)?);
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(self.snapshot()),
        }
    }

    async fn call_backend(&self, endpoint: &str, body: Value) -> Result<Value, StudioError> {
        let limit = self.settings.backend_timeout;
        match tokio::time::timeout(limit, self.backend.post(endpoint, body)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    endpoint,
                    timeout_ms = limit.as_millis() as u64,
                    "backend call timed out"
                );
                Err(StudioError::RequestFailure(format!(
                    "backend did not answer within {}ms",
                    limit.as_millis()
                )))
            }
        }
    }

    /// Commit one transition. A rejected event only raises a toast.
    fn apply(self: &Arc<Self>, event: StudioEvent) -> Result<Vec<Effect>, StudioError> {
        let outcome = {
            let mut state = self.state.lock().expect("studio state mutex poisoned");
            match state.apply(event, Utc::now()) {
                Ok(Transition { state: next, effects }) => {
                    *state = next;
                    Ok(effects)
                }
                Err(error) => {
                    let Transition { state: next, effects } = state.notify_failure(&error);
                    *state = next;
                    Err((error, effects))
                }
            }
        };

        match outcome {
            Ok(effects) => Ok(effects),
            Err((error, effects)) => {
                tracing::debug!(%error, "studio event rejected");
                effects.into_iter().for_each(|effect| self.execute(effect));
                Err(error)
            }
        }
    }

    /// Timer and toast callbacks arrive here; they never reach the backend.
    fn apply_background(self: &Arc<Self>, event: StudioEvent) {
        match self.apply(event) {
            Ok(effects) => effects.into_iter().for_each(|effect| self.execute(effect)),
            Err(error) => tracing::debug!(%error, "background event rejected"),
        }
    }

    fn execute(self: &Arc<Self>, effect: Effect) {
        match effect {
            Effect::PersistPath { project_path } => {
                // Path storage lives with the client; the session already holds it.
                tracing::debug!(%project_path, "project path updated");
            }
            Effect::Focus { target } => tracing::debug!(focus = target, "focus requested"),
            Effect::ArmTourTimer { run_id } => self.arm_tour(run_id),
            Effect::CancelTourTimer { run_id } => self.cancel_tour(run_id),
            Effect::Celebrate { milestone, delay_ms } => self.spawn_event(
                Duration::from_millis(delay_ms),
                StudioEvent::MilestoneCelebrated {
                    label: milestone.label,
                },
            ),
            Effect::ScheduleToastHide { seq } => {
                self.spawn_event(self.settings.toast_hide, StudioEvent::ToastExpired { seq })
            }
            Effect::Dispatch { action, .. } => {
                tracing::warn!(%action, "dropping dispatch raised outside a request")
            }
            Effect::FetchArtifact { artifact_path, .. } => {
                tracing::warn!(%artifact_path, "dropping artifact fetch raised outside a request")
            }
        }
    }

    fn spawn_event(self: &Arc<Self>, delay: Duration, event: StudioEvent) {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            hub.apply_background(event);
        });
    }

    fn arm_tour(self: &Arc<Self>, run_id: u64) {
        let hub = Arc::clone(self);
        let period = self.settings.tour_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // the first tick resolves immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                hub.apply_background(StudioEvent::TourTicked { run_id });
            }
        });

        let previous = self
            .tour_timer
            .lock()
            .expect("tour timer mutex poisoned")
            .replace(TourTimer { run_id, handle });
        if let Some(previous) = previous {
            previous.handle.abort();
        }
    }

    fn cancel_tour(&self, run_id: u64) {
        let mut slot = self.tour_timer.lock().expect("tour timer mutex poisoned");
        if slot.as_ref().is_some_and(|timer| timer.run_id == run_id) {
            if let Some(timer) = slot.take() {
                timer.handle.abort();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn tour_timer_armed(&self) -> bool {
        self.tour_timer
            .lock()
            .expect("tour timer mutex poisoned")
            .is_some()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;

    /// Backend double that replays canned responses and records each call.
    #[derive(Default)]
    pub(crate) struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<Value, StudioError>>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedBackend {
        pub(crate) fn respond(&self, response: Result<Value, StudioError>) {
            self.responses
                .lock()
                .expect("responses mutex poisoned")
                .push_back(response);
        }

        pub(crate) fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().expect("calls mutex poisoned").clone()
        }
    }

    #[async_trait]
    impl ActionBackend for ScriptedBackend {
        async fn post(&self, endpoint: &str, body: Value) -> Result<Value, StudioError> {
            self.calls
                .lock()
                .expect("calls mutex poisoned")
                .push((endpoint.to_string(), body));
            self.responses
                .lock()
                .expect("responses mutex poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(StudioError::RequestFailure("no scripted response".into())))
        }
    }

    pub(crate) fn hub_with(
        backend: Arc<dyn ActionBackend>,
        tour_interval: Duration,
    ) -> Arc<StudioHub> {
        Arc::new(StudioHub::new(
            StudioState::default(),
            backend,
            HubSettings {
                tour_interval,
                toast_hide: Duration::from_secs(60),
                backend_timeout: Duration::from_millis(100),
            },
        ))
    }

    /// Backend that never answers.
    pub(crate) struct StalledBackend;

    #[async_trait]
    impl ActionBackend for StalledBackend {
        async fn post(&self, _endpoint: &str, _body: Value) -> Result<Value, StudioError> {
            std::future::pending().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{hub_with, ScriptedBackend, StalledBackend};
    use super::*;
    use audit_studio::session::ActionKind;
    use serde_json::json;

    fn audit_response(overall: f64) -> serde_json::Value {
        json!({
            "report": {
                "scorecard": { "overall": overall },
                "checks": [
                    { "check_id": "ci", "status": "fail", "severity": "high", "title": "CI" }
                ]
            },
            "artifacts": { "coach_markdown": "/work/app/.vibe-sentinel/coach.md" }
        })
    }

    async fn with_path(hub: &Arc<StudioHub>) {
        hub.drive(StudioEvent::PathEdited {
            project_path: "/work/app".into(),
        })
        .await
        .expect("path accepted");
    }

    #[tokio::test]
    async fn action_round_trip_commits_report() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.respond(Ok(audit_response(62.0)));
        let hub = hub_with(backend.clone(), Duration::from_secs(60));
        with_path(&hub).await;

        let snapshot = hub
            .drive(StudioEvent::ActionRequested {
                action: ActionKind::Audit,
            })
            .await
            .expect("audit succeeds");

        assert!(!snapshot.busy);
        assert_eq!(snapshot.score.map(|score| score.overall), Some(62.0));
        assert_eq!(
            backend.calls(),
            vec![(
                "/api/audit".to_string(),
                json!({ "project_path": "/work/app" })
            )]
        );
    }

    #[tokio::test]
    async fn backend_failure_is_recorded_then_returned() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.respond(Err(StudioError::RequestFailure(
            "Project path does not exist".into(),
        )));
        let hub = hub_with(backend, Duration::from_secs(60));
        with_path(&hub).await;

        let err = hub
            .drive(StudioEvent::ActionRequested {
                action: ActionKind::Ship,
            })
            .await
            .expect_err("ship fails");
        assert_eq!(
            err,
            StudioError::RequestFailure("Project path does not exist".into())
        );

        let snapshot = hub.snapshot();
        assert!(!snapshot.busy);
        assert_eq!(
            snapshot.timeline.first().map(|entry| entry.message.as_str()),
            Some("Error: Project path does not exist")
        );
    }

    #[tokio::test]
    async fn rejected_event_surfaces_a_toast() {
        let hub = hub_with(Arc::new(ScriptedBackend::default()), Duration::from_secs(60));
        let err = hub
            .drive(StudioEvent::ActionRequested {
                action: ActionKind::Audit,
            })
            .await
            .expect_err("path missing");
        assert_eq!(err, StudioError::missing_project_path());
        assert_eq!(
            hub.snapshot().toast.map(|toast| toast.message),
            Some("Project path is required.".to_string())
        );
    }

    #[tokio::test]
    async fn tutorial_opens_known_coach_artifact() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.respond(Ok(audit_response(40.0)));
        backend.respond(Ok(audit_response(41.0)));
        backend.respond(Ok(json!({
            "path": "/work/app/.vibe-sentinel/coach.md",
            "content": "# Coach",
            "line_count": 1
        })));
        let hub = hub_with(backend.clone(), Duration::from_secs(60));
        with_path(&hub).await;
        for action in [ActionKind::Audit, ActionKind::Ship] {
            hub.drive(StudioEvent::ActionRequested { action })
                .await
                .expect("action succeeds");
        }

        let snapshot = hub
            .drive(StudioEvent::TutorialAdvanced)
            .await
            .expect("coach artifact opens");
        assert_eq!(snapshot.preview.content, "# Coach");
        assert_eq!(
            backend.calls().last(),
            Some(&(
                "/api/artifact".to_string(),
                json!({
                    "project_path": "/work/app",
                    "artifact_path": "/work/app/.vibe-sentinel/coach.md"
                })
            ))
        );
    }

    #[tokio::test]
    async fn abandoned_request_still_releases_busy_gate() {
        let hub = hub_with(Arc::new(StalledBackend), Duration::from_secs(60));
        with_path(&hub).await;

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            hub.drive(StudioEvent::ActionRequested {
                action: ActionKind::Audit,
            }),
        )
        .await;
        assert!(abandoned.is_err(), "caller gives up before the backend answers");
        assert!(hub.snapshot().busy);

        let mut released = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if !hub.snapshot().busy {
                released = true;
                break;
            }
        }
        assert!(released, "timed out call clears the busy gate");
        assert_eq!(
            hub.snapshot()
                .timeline
                .first()
                .map(|entry| entry.message.clone()),
            Some("Error: backend did not answer within 100ms".to_string())
        );

        let snapshot = hub
            .drive(StudioEvent::TourStartRequested)
            .await
            .expect("tour starts");
        assert!(snapshot.tour.running);

        let second = hub
            .drive(StudioEvent::ActionRequested {
                action: ActionKind::Audit,
            })
            .await
            .expect_err("backend still stalled");
        assert_ne!(second, StudioError::Busy);
    }

    #[tokio::test]
    async fn tour_ticks_advance_until_stopped() {
        let hub = hub_with(
            Arc::new(ScriptedBackend::default()),
            Duration::from_millis(20),
        );
        hub.drive(StudioEvent::TourStartRequested)
            .await
            .expect("tour starts");
        assert!(hub.tour_timer_armed());

        let mut advanced = false;
        for _ in 0..200 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let tour = hub.snapshot().tour;
            if tour.completed || tour.cursor.is_some_and(|cursor| cursor > 0) {
                advanced = true;
                break;
            }
        }
        assert!(advanced, "timer should move the cursor");

        hub.drive(StudioEvent::TourStopRequested)
            .await
            .expect("tour stops");
        assert!(!hub.tour_timer_armed());
        let snapshot = hub.snapshot();
        assert!(!snapshot.tour.running);
        assert_eq!(snapshot.tour.cursor, None);
    }
}
