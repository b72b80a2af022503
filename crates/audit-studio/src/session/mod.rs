//! Studio session: one state value, one event at a time.

mod action;
mod events;
mod history;
mod state;
mod timeline;
mod toast;
mod views;

pub use action::{artifact_request_body, starter_command, ActionKind, ARTIFACT_ENDPOINT};
pub use events::{Effect, StudioEvent, Transition};
pub use history::{HistoryEntry, RunHistory, HISTORY_CAPACITY};
pub use state::{Preview, StudioState};
pub use timeline::{Timeline, TimelineEntry, TIMELINE_CAPACITY};
pub use toast::{Toast, ToastSlot};
pub use views::{
    ArtifactView, FindingView, ScoreView, SimulationItemView, SimulatorView, StudioSnapshot,
    TourStepView, TourView,
};
