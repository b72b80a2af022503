use super::action::ActionKind;
use super::events::{Effect, StudioEvent, Transition};
use super::history::{HistoryEntry, RunHistory};
use super::timeline::Timeline;
use super::toast::ToastSlot;
use super::views::StudioSnapshot;
use crate::error::StudioError;
use crate::insight::{crossed_milestones, Calibration, FixSimulator};
use crate::progression::{
    DemoTour, SessionFacts, TourTransition, TutorialChecklist, TutorialDirective, TOUR_STEPS,
};
use crate::report::{
    derive_insights, ActionPayload, ArtifactPreview, AuditReport, OpenedArtifact, ReportInsights,
    TaskRow,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const COACH_ARTIFACT_KEY: &str = "coach_markdown";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub title: String,
    pub content: String,
}

/// The whole studio session.
///
/// Mutated only through [`StudioState::apply`], which works on a copy and
/// hands back the complete next state, so a failed event leaves the caller's
/// state untouched.
#[derive(Debug, Clone)]
pub struct StudioState {
    calibration: Arc<Calibration>,
    project_path: String,
    apply_safe: bool,
    in_flight: Option<ActionKind>,
    report: Option<AuditReport>,
    insights: Option<ReportInsights>,
    improvement: Option<f64>,
    last_score: Option<f64>,
    tasks: Vec<TaskRow>,
    artifacts: BTreeMap<String, String>,
    applied_files: Vec<String>,
    simulator: FixSimulator,
    history: RunHistory,
    timeline: Timeline,
    toast: ToastSlot,
    preview: Preview,
    opened_artifact: Option<OpenedArtifact>,
    tutorial: TutorialChecklist,
    tour: DemoTour,
}

impl Default for StudioState {
    fn default() -> Self {
        Self::new(Calibration::default())
    }
}

impl StudioState {
    pub fn new(calibration: Calibration) -> Self {
        Self {
            calibration: Arc::new(calibration),
            project_path: String::new(),
            apply_safe: false,
            in_flight: None,
            report: None,
            insights: None,
            improvement: None,
            last_score: None,
            tasks: Vec::new(),
            artifacts: BTreeMap::new(),
            applied_files: Vec::new(),
            simulator: FixSimulator::default(),
            history: RunHistory::default(),
            timeline: Timeline::default(),
            toast: ToastSlot::default(),
            preview: Preview::default(),
            opened_artifact: None,
            tutorial: TutorialChecklist::default(),
            tour: DemoTour::default(),
        }
    }

    /// Restore the last persisted project path.
    pub fn with_project_path(mut self, project_path: impl Into<String>) -> Self {
        self.project_path = project_path.into();
        self
    }

    pub fn apply(&self, event: StudioEvent, now: DateTime<Utc>) -> Result<Transition, StudioError> {
        let mut next = self.clone();
        let mut effects = Vec::new();
        next.reduce(event, now, &mut effects)?;
        Ok(Transition {
            state: next,
            effects,
        })
    }

    /// Surface a rejected event to the user without touching anything else.
    pub fn notify_failure(&self, error: &StudioError) -> Transition {
        let mut next = self.clone();
        let mut effects = Vec::new();
        next.notify(error.user_message(), &mut effects);
        Transition {
            state: next,
            effects,
        }
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        StudioSnapshot::from_state(self)
    }

    pub fn facts(&self) -> SessionFacts<'_> {
        SessionFacts {
            path_input: &self.project_path,
            audit_run: self.history.has_run(ActionKind::Audit),
            ship_run: self.history.has_run(ActionKind::Ship),
            report_loaded: self.report.is_some(),
            opened_artifact: self.opened_artifact.as_ref(),
            preview_title: &self.preview.title,
            tour_seen: self.tour.seen(),
            coach_artifact: self.artifacts.get(COACH_ARTIFACT_KEY).map(String::as_str),
        }
    }

    fn reduce(
        &mut self,
        event: StudioEvent,
        now: DateTime<Utc>,
        effects: &mut Vec<Effect>,
    ) -> Result<(), StudioError> {
        match event {
            StudioEvent::PathEdited { project_path } => {
                let trimmed = project_path.trim();
                if !trimmed.is_empty() {
                    effects.push(Effect::PersistPath {
                        project_path: trimmed.to_string(),
                    });
                }
                self.project_path = project_path;
            }
            StudioEvent::ApplySafeToggled { apply_safe } => self.apply_safe = apply_safe,
            StudioEvent::ActionRequested { action } => self.request_action(action, now, effects)?,
            StudioEvent::ActionSucceeded { action, payload } => {
                self.complete_action(action, *payload, now, effects)
            }
            StudioEvent::ActionFailed { action, error } => {
                self.in_flight = None;
                let message = error.user_message();
                tracing::warn!(%action, error = %message, "studio action failed");
                self.timeline.record(now, format!("Error: {message}"));
                self.notify(message, effects);
            }
            StudioEvent::ArtifactRequested { artifact_path } => {
                self.request_artifact(artifact_path, effects)?
            }
            StudioEvent::ArtifactLoaded { requested, preview } => {
                self.open_artifact(requested, preview, effects)
            }
            StudioEvent::ArtifactFailed { error } => self.notify(error.user_message(), effects),
            StudioEvent::SimulationToggled { id } => match self.simulator.toggled(&id) {
                Some(simulator) => self.simulator = simulator,
                None => tracing::debug!(%id, "ignoring toggle for unknown simulation item"),
            },
            StudioEvent::TourStartRequested => self.start_tour(now, effects),
            StudioEvent::TourTicked { run_id } => {
                let (tour, transition) = self.tour.tick(run_id);
                self.tour = tour;
                self.follow_tour(transition, now, effects);
            }
            StudioEvent::TourStopRequested => {
                let (tour, transition) = self.tour.stop();
                self.tour = tour;
                self.follow_tour(transition, now, effects);
            }
            StudioEvent::TutorialBegun => {
                let (tutorial, directive) = self.tutorial.begin(&self.facts());
                self.tutorial = tutorial;
                self.follow_tutorial(directive, now, effects)?;
            }
            StudioEvent::TutorialAdvanced => {
                let (tutorial, directive) = self.tutorial.advance(&self.facts());
                self.tutorial = tutorial;
                self.follow_tutorial(directive, now, effects)?;
            }
            StudioEvent::HistoryCleared => {
                self.history.clear();
                self.timeline.record(now, "Run history cleared.");
            }
            StudioEvent::ToastExpired { seq } => {
                self.toast.hide(seq);
            }
            StudioEvent::MilestoneCelebrated { label } => {
                self.notify(format!("Milestone unlocked: {label}"), effects)
            }
            StudioEvent::PreviewCopied => self.notify("Preview copied to clipboard", effects),
            StudioEvent::ClipboardFailed { reason } => {
                self.notify(StudioError::Clipboard(reason).user_message(), effects)
            }
        }
        Ok(())
    }

    fn request_action(
        &mut self,
        action: ActionKind,
        now: DateTime<Utc>,
        effects: &mut Vec<Effect>,
    ) -> Result<(), StudioError> {
        if let Some(running) = self.in_flight {
            tracing::debug!(%action, %running, "rejecting action while another is in flight");
            return Err(StudioError::Busy);
        }
        let project_path = self.project_path.trim().to_string();
        if project_path.is_empty() {
            return Err(StudioError::missing_project_path());
        }

        tracing::info!(%action, %project_path, "studio action started");
        self.in_flight = Some(action);
        self.timeline.record(now, format!("Starting {action}..."));
        effects.push(Effect::PersistPath {
            project_path: project_path.clone(),
        });
        effects.push(Effect::Dispatch {
            action,
            endpoint: action.endpoint(),
            body: action.request_body(&project_path, self.apply_safe),
        });
        Ok(())
    }

    fn complete_action(
        &mut self,
        action: ActionKind,
        payload: ActionPayload,
        now: DateTime<Utc>,
        effects: &mut Vec<Effect>,
    ) {
        self.in_flight = None;

        let report = payload.primary_report().cloned();
        let insights = payload
            .primary_insights()
            .cloned()
            .or_else(|| report.as_ref().map(derive_insights));
        let score = report.as_ref().map(AuditReport::overall).unwrap_or(0.0);
        let previous = self.last_score;
        let content = match payload.preview_markdown() {
            Some((_, markdown)) => markdown.to_string(),
            None => scorecard_json(report.as_ref()),
        };

        self.simulator = self.simulator.refreshed(report.as_ref(), &self.calibration);
        self.report = report;
        self.insights = insights;
        self.improvement = payload.improvement;
        self.last_score = Some(score);
        self.tasks = payload.agent_tasks;
        self.artifacts = payload.artifacts;
        self.applied_files = payload.applied_files;

        let crossings = crossed_milestones(previous, score, &self.calibration.milestones);
        if !crossings.is_empty() {
            let labels = crossings
                .iter()
                .map(|crossing| crossing.milestone.label.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::info!(milestones = %labels, score, "milestones unlocked");
            self.timeline.record(now, format!("Milestone unlocked: {labels}"));
            let stagger = self.calibration.celebration_stagger_ms;
            effects.extend(crossings.into_iter().map(|crossing| Effect::Celebrate {
                delay_ms: stagger.saturating_mul(crossing.order as u64),
                milestone: crossing.milestone,
            }));
        }

        self.preview = Preview {
            title: format!("{} Output", action.as_str().to_uppercase()),
            content,
        };
        self.history.push(HistoryEntry {
            action,
            score,
            delta: self.improvement,
            at: now,
        });

        tracing::info!(%action, score, improvement = ?self.improvement, "studio action completed");
        let summary = match action {
            ActionKind::Ship => format!(
                "Ship complete. Score delta {:+.1}.",
                self.improvement.unwrap_or(0.0)
            ),
            other => format!("{other} complete."),
        };
        self.timeline.record(now, summary);
        self.notify(format!("{action} completed successfully"), effects);
    }

    fn request_artifact(
        &mut self,
        artifact_path: String,
        effects: &mut Vec<Effect>,
    ) -> Result<(), StudioError> {
        let project_path = self.project_path.trim();
        if project_path.is_empty() {
            return Err(StudioError::Validation("Set a project path first.".to_string()));
        }
        effects.push(Effect::FetchArtifact {
            project_path: project_path.to_string(),
            artifact_path,
        });
        Ok(())
    }

    fn open_artifact(
        &mut self,
        requested: String,
        preview: ArtifactPreview,
        effects: &mut Vec<Effect>,
    ) {
        let path = if preview.path.is_empty() {
            requested
        } else {
            preview.path
        };
        self.opened_artifact = Some(OpenedArtifact::new(&self.artifacts, path.clone()));
        self.preview = Preview {
            title: path,
            content: preview.content,
        };
        self.notify("Loaded artifact preview", effects);
    }

    fn start_tour(&mut self, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        let (tour, transition) = self.tour.start(self.in_flight.is_some());
        self.tour = tour;
        self.follow_tour(transition, now, effects);
    }

    fn follow_tour(
        &mut self,
        transition: TourTransition,
        now: DateTime<Utc>,
        effects: &mut Vec<Effect>,
    ) {
        match transition {
            TourTransition::Started { run_id, step } => {
                tracing::info!(run_id, "demo tour started");
                effects.push(Effect::ArmTourTimer { run_id });
                self.show_tour_step(step, now, effects);
            }
            TourTransition::Advanced { step } => self.show_tour_step(step, now, effects),
            TourTransition::Completed => {
                let run_id = self.tour.run_id();
                tracing::info!(run_id, "demo tour complete");
                effects.push(Effect::CancelTourTimer { run_id });
                self.timeline.record(now, "Demo tour complete.");
                self.notify("Demo tour complete", effects);
            }
            TourTransition::Stopped => {
                let run_id = self.tour.run_id();
                tracing::info!(run_id, "demo tour stopped");
                effects.push(Effect::CancelTourTimer { run_id });
                self.timeline.record(now, "Demo tour stopped.");
            }
            TourTransition::Ignored => tracing::debug!("tour event ignored"),
        }
    }

    fn show_tour_step(&mut self, step: usize, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        if let Some(tour_step) = TOUR_STEPS.get(step) {
            self.timeline.record(now, format!("[Tour] {}", tour_step.label));
            effects.push(Effect::Focus {
                target: tour_step.target,
            });
        }
    }

    fn follow_tutorial(
        &mut self,
        directive: TutorialDirective,
        now: DateTime<Utc>,
        effects: &mut Vec<Effect>,
    ) -> Result<(), StudioError> {
        if let Some(step) = directive.step() {
            effects.push(Effect::Focus {
                target: step.step().target,
            });
        }

        match directive {
            TutorialDirective::AlreadyComplete => {
                self.notify("Tutorial already complete.", effects)
            }
            TutorialDirective::Focus { step } => self.notify(step.step().hint, effects),
            TutorialDirective::Dispatch { action, .. } => {
                self.request_action(action, now, effects)?
            }
            TutorialDirective::OpenArtifact { path, .. } => self.request_artifact(path, effects)?,
            TutorialDirective::StartTour { .. } => self.start_tour(now, effects),
        }
        Ok(())
    }

    fn notify(&mut self, message: impl Into<String>, effects: &mut Vec<Effect>) {
        let seq = self.toast.show(message);
        effects.push(Effect::ScheduleToastHide { seq });
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    pub fn apply_safe(&self) -> bool {
        self.apply_safe
    }

    pub fn in_flight(&self) -> Option<ActionKind> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn report(&self) -> Option<&AuditReport> {
        self.report.as_ref()
    }

    pub fn insights(&self) -> Option<&ReportInsights> {
        self.insights.as_ref()
    }

    pub fn improvement(&self) -> Option<f64> {
        self.improvement
    }

    pub fn last_score(&self) -> Option<f64> {
        self.last_score
    }

    pub fn tasks(&self) -> &[TaskRow] {
        &self.tasks
    }

    pub fn artifacts(&self) -> &BTreeMap<String, String> {
        &self.artifacts
    }

    pub fn applied_files(&self) -> &[String] {
        &self.applied_files
    }

    pub fn simulator(&self) -> &FixSimulator {
        &self.simulator
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn toast(&self) -> &ToastSlot {
        &self.toast
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn opened_artifact(&self) -> Option<&OpenedArtifact> {
        self.opened_artifact.as_ref()
    }

    pub fn tutorial(&self) -> TutorialChecklist {
        self.tutorial
    }

    pub fn tour(&self) -> DemoTour {
        self.tour
    }
}

fn scorecard_json(report: Option<&AuditReport>) -> String {
    match report {
        Some(report) => serde_json::to_string_pretty(&report.scorecard)
            .unwrap_or_else(|_| "{}".to_string()),
        None => "{}".to_string(),
    }
}
