use super::action::ActionKind;
use super::state::StudioState;
use crate::error::StudioError;
use crate::insight::Milestone;
use crate::report::{ActionPayload, ArtifactPreview};
use serde_json::Value;

/// Everything that can change the studio: user input, backend completions,
/// timer ticks and presentation callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum StudioEvent {
    PathEdited { project_path: String },
    ApplySafeToggled { apply_safe: bool },
    ActionRequested { action: ActionKind },
    ActionSucceeded {
        action: ActionKind,
        payload: Box<ActionPayload>,
    },
    ActionFailed {
        action: ActionKind,
        error: StudioError,
    },
    ArtifactRequested { artifact_path: String },
    ArtifactLoaded {
        requested: String,
        preview: ArtifactPreview,
    },
    ArtifactFailed { error: StudioError },
    SimulationToggled { id: String },
    TourStartRequested,
    TourTicked { run_id: u64 },
    TourStopRequested,
    TutorialBegun,
    TutorialAdvanced,
    HistoryCleared,
    ToastExpired { seq: u64 },
    MilestoneCelebrated { label: String },
    PreviewCopied,
    ClipboardFailed { reason: String },
}

/// Side effects requested by a transition. The engine never performs them.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PersistPath {
        project_path: String,
    },
    Dispatch {
        action: ActionKind,
        endpoint: &'static str,
        body: Value,
    },
    FetchArtifact {
        project_path: String,
        artifact_path: String,
    },
    ArmTourTimer {
        run_id: u64,
    },
    CancelTourTimer {
        run_id: u64,
    },
    Focus {
        target: &'static str,
    },
    Celebrate {
        milestone: Milestone,
        delay_ms: u64,
    },
    ScheduleToastHide {
        seq: u64,
    },
}

/// Result of applying one event: the whole next state plus its effects.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: StudioState,
    pub effects: Vec<Effect>,
}
