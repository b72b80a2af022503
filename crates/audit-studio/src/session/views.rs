use super::action::{starter_command, ActionKind};
use super::history::HistoryEntry;
use super::state::{Preview, StudioState};
use super::timeline::TimelineEntry;
use super::toast::Toast;
use crate::insight::{milestone_board, rank_findings, MilestoneBoard, Projection};
use crate::progression::{StepMark, TutorialProgress, TOUR_STEPS};
use crate::report::{
    ArtifactKind, CheckStatus, ReportInsights, ScoreBand, Scorecard, Severity, TaskRow,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ScoreView {
    pub overall: f64,
    pub band: ScoreBand,
    pub band_label: &'static str,
    pub improvement: Option<f64>,
    pub scorecard: Scorecard,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindingView {
    pub check_id: String,
    pub title: String,
    pub status: CheckStatus,
    pub status_label: &'static str,
    pub severity: Severity,
    pub severity_label: String,
    pub detail: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationItemView {
    pub id: String,
    pub title: String,
    pub status_label: &'static str,
    pub severity_label: String,
    pub lift: f64,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulatorView {
    pub items: Vec<SimulationItemView>,
    pub projection: Projection,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactView {
    pub key: String,
    pub path: String,
    pub kind: ArtifactKind,
    pub kind_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TourStepView {
    pub label: &'static str,
    pub target: &'static str,
    pub note: &'static str,
    pub mark: StepMark,
}

#[derive(Debug, Clone, Serialize)]
pub struct TourView {
    pub running: bool,
    pub completed: bool,
    pub cursor: Option<usize>,
    pub progress_percent: f64,
    pub can_start: bool,
    pub steps: Vec<TourStepView>,
}

/// Everything the dashboard renders, derived fresh from one [`StudioState`].
#[derive(Debug, Clone, Serialize)]
pub struct StudioSnapshot {
    pub project_path: String,
    pub apply_safe: bool,
    pub busy: bool,
    pub in_flight: Option<ActionKind>,
    pub score: Option<ScoreView>,
    pub insights: Option<ReportInsights>,
    pub findings: Vec<FindingView>,
    pub simulator: SimulatorView,
    pub milestones: MilestoneBoard,
    pub tasks: Vec<TaskRow>,
    pub artifacts: Vec<ArtifactView>,
    pub applied_files: Vec<String>,
    pub preview: Preview,
    pub history: Vec<HistoryEntry>,
    pub timeline: Vec<TimelineEntry>,
    pub toast: Option<Toast>,
    pub tutorial: TutorialProgress,
    pub tour: TourView,
    pub starter_command: String,
}

impl StudioSnapshot {
    pub fn from_state(state: &StudioState) -> Self {
        let report = state.report();

        let score = report.map(|report| {
            let band = state
                .insights()
                .and_then(|insights| insights.score_band)
                .unwrap_or_else(|| ScoreBand::for_score(report.overall()));
            ScoreView {
                overall: report.overall(),
                band,
                band_label: band.label(),
                improvement: state.improvement(),
                scorecard: report.scorecard,
            }
        });

        let findings = report
            .map(|report| {
                rank_findings(report)
                    .into_iter()
                    .map(|check| FindingView {
                        check_id: check.check_id.clone(),
                        title: check.title.clone(),
                        status: check.status,
                        status_label: check.status.label(),
                        severity: check.severity.clone(),
                        severity_label: check.severity.label(),
                        detail: check.detail.clone(),
                        recommendation: check.recommendation.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let simulator = state.simulator();
        let simulator = SimulatorView {
            items: simulator
                .items()
                .iter()
                .map(|item| SimulationItemView {
                    id: item.id.clone(),
                    title: item.title.clone(),
                    status_label: item.status.label(),
                    severity_label: item.severity.label(),
                    lift: item.lift,
                    selected: simulator.is_selected(&item.id),
                })
                .collect(),
            projection: simulator.projection(report.map(|report| report.overall()).unwrap_or(0.0)),
        };

        let artifacts = state
            .artifacts()
            .iter()
            .map(|(key, path)| {
                let kind = ArtifactKind::classify(state.artifacts(), path);
                ArtifactView {
                    key: key.clone(),
                    path: path.clone(),
                    kind,
                    kind_label: kind.label(),
                }
            })
            .collect();

        let tour = state.tour();
        let tour = TourView {
            running: tour.is_running(),
            completed: tour.completed(),
            cursor: tour.cursor(),
            progress_percent: tour.progress_percent(),
            can_start: !tour.is_running() && !state.is_busy(),
            steps: TOUR_STEPS
                .iter()
                .zip(tour.step_marks())
                .map(|(step, mark)| TourStepView {
                    label: step.label,
                    target: step.target,
                    note: step.note,
                    mark,
                })
                .collect(),
        };

        Self {
            project_path: state.project_path().to_string(),
            apply_safe: state.apply_safe(),
            busy: state.is_busy(),
            in_flight: state.in_flight(),
            score,
            insights: state.insights().cloned(),
            findings,
            simulator,
            milestones: milestone_board(state.last_score(), &state.calibration().milestones),
            tasks: state.tasks().to_vec(),
            artifacts,
            applied_files: state.applied_files().to_vec(),
            preview: state.preview().clone(),
            history: state.history().iter().cloned().collect(),
            timeline: state.timeline().entries().cloned().collect(),
            toast: state.toast().current().cloned(),
            tutorial: state.tutorial().progress(&state.facts()),
            tour,
            starter_command: starter_command(state.project_path()),
        }
    }
}
