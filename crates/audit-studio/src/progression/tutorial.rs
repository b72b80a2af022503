use crate::report::OpenedArtifact;
use crate::session::ActionKind;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorialStepId {
    Path,
    Audit,
    Review,
    Ship,
    Coach,
    Tour,
}

impl TutorialStepId {
    pub fn step(self) -> &'static TutorialStep {
        match self {
            Self::Path => &TUTORIAL_STEPS[0],
            Self::Audit => &TUTORIAL_STEPS[1],
            Self::Review => &TUTORIAL_STEPS[2],
            Self::Ship => &TUTORIAL_STEPS[3],
            Self::Coach => &TUTORIAL_STEPS[4],
            Self::Tour => &TUTORIAL_STEPS[5],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TutorialStep {
    pub id: TutorialStepId,
    pub label: &'static str,
    pub hint: &'static str,
    pub target: &'static str,
}

pub const TUTORIAL_STEPS: [TutorialStep; 6] = [
    TutorialStep {
        id: TutorialStepId::Path,
        label: "Set project path",
        hint: "Paste your project path in the top input.",
        target: "projectPath",
    },
    TutorialStep {
        id: TutorialStepId::Audit,
        label: "Run baseline audit",
        hint: "Click 'Run Audit' to generate a baseline score and findings.",
        target: "auditBtn",
    },
    TutorialStep {
        id: TutorialStepId::Review,
        label: "Review findings",
        hint: "Read Top Actions and Open Findings to understand what blocks shipping.",
        target: "findingsPanel",
    },
    TutorialStep {
        id: TutorialStepId::Ship,
        label: "Run ship sequence",
        hint: "Click 'Launch Ship Sequence' for the full improvement loop.",
        target: "shipBtn",
    },
    TutorialStep {
        id: TutorialStepId::Coach,
        label: "Open beginner coach output",
        hint: "Open the coach artifact to get plain-English fix cards.",
        target: "artifactList",
    },
    TutorialStep {
        id: TutorialStepId::Tour,
        label: "Run demo tour",
        hint: "Start Demo Tour for an automatic walkthrough flow.",
        target: "startTourBtn",
    },
];

const COMPLETE_HINT: &str =
    "Great. You completed the beginner flow and can now use advanced actions as needed.";

/// Everything the checklist reads from the session. Nothing here is owned by
/// the checklist itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionFacts<'a> {
    pub path_input: &'a str,
    pub audit_run: bool,
    pub ship_run: bool,
    pub report_loaded: bool,
    pub opened_artifact: Option<&'a OpenedArtifact>,
    pub preview_title: &'a str,
    pub tour_seen: bool,
    /// Path of the coach markdown from the latest `artifacts` map, if any.
    pub coach_artifact: Option<&'a str>,
}

impl SessionFacts<'_> {
    pub fn is_complete(&self, step: TutorialStepId) -> bool {
        match step {
            TutorialStepId::Path => !self.path_input.trim().is_empty(),
            TutorialStepId::Audit => self.audit_run,
            TutorialStepId::Review => self.report_loaded,
            TutorialStepId::Ship => self.ship_run,
            TutorialStepId::Coach => {
                self.opened_artifact.is_some_and(OpenedArtifact::is_coach)
                    || self.preview_title.to_lowercase().contains("coach")
            }
            TutorialStepId::Tour => self.tour_seen,
        }
    }

    fn first_incomplete(&self) -> Option<&'static TutorialStep> {
        TUTORIAL_STEPS.iter().find(|step| !self.is_complete(step.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TutorialStatus {
    NotStarted,
    InProgress { done: usize, total: usize },
    Complete,
}

impl TutorialStatus {
    pub fn label(self) -> String {
        match self {
            Self::NotStarted => "Not started".to_string(),
            Self::InProgress { done, total } => format!("{done}/{total} steps"),
            Self::Complete => "Complete".to_string(),
        }
    }
}

/// What the session should do after the user asks for the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TutorialDirective {
    AlreadyComplete,
    Focus { step: TutorialStepId },
    Dispatch { step: TutorialStepId, action: ActionKind },
    OpenArtifact { step: TutorialStepId, path: String },
    StartTour { step: TutorialStepId },
}

impl TutorialDirective {
    pub fn step(&self) -> Option<TutorialStepId> {
        match self {
            Self::AlreadyComplete => None,
            Self::Focus { step }
            | Self::Dispatch { step, .. }
            | Self::OpenArtifact { step, .. }
            | Self::StartTour { step } => Some(*step),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TutorialStepMark {
    pub id: TutorialStepId,
    pub label: &'static str,
    pub hint: &'static str,
    pub target: &'static str,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TutorialProgress {
    pub status: TutorialStatus,
    pub status_label: String,
    pub steps: Vec<TutorialStepMark>,
    pub done: usize,
    pub total: usize,
    pub percent: f64,
    pub hint: String,
}

/// Step checklist. Only `started` is stored; completion is always read from
/// the current [`SessionFacts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TutorialChecklist {
    started: bool,
}

impl TutorialChecklist {
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// `Complete` does not depend on `started`.
    pub fn status(&self, facts: &SessionFacts<'_>) -> TutorialStatus {
        let total = TUTORIAL_STEPS.len();
        let done = TUTORIAL_STEPS
            .iter()
            .filter(|step| facts.is_complete(step.id))
            .count();
        if done == total {
            TutorialStatus::Complete
        } else if !self.started {
            TutorialStatus::NotStarted
        } else {
            TutorialStatus::InProgress { done, total }
        }
    }

    pub fn progress(&self, facts: &SessionFacts<'_>) -> TutorialProgress {
        let steps: Vec<TutorialStepMark> = TUTORIAL_STEPS
            .iter()
            .map(|step| TutorialStepMark {
                id: step.id,
                label: step.label,
                hint: step.hint,
                target: step.target,
                done: facts.is_complete(step.id),
            })
            .collect();
        let total = steps.len();
        let done = steps.iter().filter(|mark| mark.done).count();
        let status = self.status(facts);
        let hint = match facts.first_incomplete() {
            Some(step) => step.hint.to_string(),
            None => COMPLETE_HINT.to_string(),
        };

        TutorialProgress {
            status,
            status_label: status.label(),
            steps,
            done,
            total,
            percent: if total == 0 {
                0.0
            } else {
                done as f64 / total as f64 * 100.0
            },
            hint,
        }
    }

    /// Start the tutorial and point at the first open step without running it.
    pub fn begin(self, facts: &SessionFacts<'_>) -> (Self, TutorialDirective) {
        let next = Self { started: true };
        let directive = match facts.first_incomplete() {
            Some(step) => TutorialDirective::Focus { step: step.id },
            None => TutorialDirective::AlreadyComplete,
        };
        (next, directive)
    }

    pub fn advance(self, facts: &SessionFacts<'_>) -> (Self, TutorialDirective) {
        let next = Self { started: true };
        let Some(step) = facts.first_incomplete() else {
            return (next, TutorialDirective::AlreadyComplete);
        };

        let directive = match step.id {
            TutorialStepId::Path | TutorialStepId::Review => {
                TutorialDirective::Focus { step: step.id }
            }
            TutorialStepId::Audit => TutorialDirective::Dispatch {
                step: step.id,
                action: ActionKind::Audit,
            },
            TutorialStepId::Ship => TutorialDirective::Dispatch {
                step: step.id,
                action: ActionKind::Ship,
            },
            TutorialStepId::Coach => match facts.coach_artifact {
                Some(path) => TutorialDirective::OpenArtifact {
                    step: step.id,
                    path: path.to_string(),
                },
                None => TutorialDirective::Dispatch {
                    step: step.id,
                    action: ActionKind::Coach,
                },
            },
            TutorialStepId::Tour => TutorialDirective::StartTour { step: step.id },
        };
        (next, directive)
    }
}
