use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TourStep {
    pub label: &'static str,
    pub target: &'static str,
    pub note: &'static str,
}

pub const TOUR_STEPS: [TourStep; 6] = [
    TourStep {
        label: "Score Story",
        target: "scorePanel",
        note: "Explain overall score and category blend.",
    },
    TourStep {
        label: "Fix Simulator",
        target: "simulatorPanel",
        note: "Preview score lift from top fixes.",
    },
    TourStep {
        label: "Findings",
        target: "findingsPanel",
        note: "Show concrete gaps and recommendations.",
    },
    TourStep {
        label: "Agent Queue",
        target: "tasksPanel",
        note: "Show autonomous task handoff.",
    },
    TourStep {
        label: "Artifacts",
        target: "previewPanel",
        note: "Open generated markdown and prompts.",
    },
    TourStep {
        label: "Timeline",
        target: "timelinePanel",
        note: "Close with repeatable execution history.",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourTransition {
    Started { run_id: u64, step: usize },
    Advanced { step: usize },
    Completed,
    Stopped,
    /// Start while running or busy, stop while stopped, or a stale tick.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMark {
    Done,
    Active,
    Pending,
}

/// Timed walkthrough. Running while `cursor` is set.
///
/// Every start opens a new run id; ticks carry the id of the run that armed
/// them and anything else is ignored, so a cancelled timer can never move
/// the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemoTour {
    cursor: Option<usize>,
    completed: bool,
    run_id: u64,
    seen: bool,
    len: usize,
}

impl Default for DemoTour {
    fn default() -> Self {
        Self::new(TOUR_STEPS.len())
    }
}

impl DemoTour {
    pub fn new(len: usize) -> Self {
        Self {
            cursor: None,
            completed: false,
            run_id: 0,
            seen: false,
            len,
        }
    }

    pub fn is_running(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Started at least once this session.
    pub fn seen(&self) -> bool {
        self.seen
    }

    pub fn start(self, busy: bool) -> (Self, TourTransition) {
        if self.is_running() || busy {
            return (self, TourTransition::Ignored);
        }

        let run_id = self.run_id + 1;
        if self.len == 0 {
            let next = Self {
                completed: true,
                run_id,
                seen: true,
                ..self
            };
            return (next, TourTransition::Completed);
        }

        let next = Self {
            cursor: Some(0),
            completed: false,
            run_id,
            seen: true,
            ..self
        };
        (next, TourTransition::Started { run_id, step: 0 })
    }

    pub fn tick(self, run_id: u64) -> (Self, TourTransition) {
        let Some(cursor) = self.cursor else {
            return (self, TourTransition::Ignored);
        };
        if run_id != self.run_id {
            return (self, TourTransition::Ignored);
        }

        let step = cursor + 1;
        if step >= self.len {
            let next = Self {
                cursor: None,
                completed: true,
                ..self
            };
            return (next, TourTransition::Completed);
        }

        let next = Self {
            cursor: Some(step),
            ..self
        };
        (next, TourTransition::Advanced { step })
    }

    pub fn stop(self) -> (Self, TourTransition) {
        if !self.is_running() {
            return (self, TourTransition::Ignored);
        }
        let next = Self {
            cursor: None,
            completed: false,
            ..self
        };
        (next, TourTransition::Stopped)
    }

    pub fn step_marks(&self) -> Vec<StepMark> {
        (0..self.len)
            .map(|index| match self.cursor {
                _ if self.completed => StepMark::Done,
                Some(cursor) if index < cursor => StepMark::Done,
                Some(cursor) if index == cursor => StepMark::Active,
                _ => StepMark::Pending,
            })
            .collect()
    }

    pub fn progress_percent(&self) -> f64 {
        if self.completed {
            return 100.0;
        }
        match self.cursor {
            Some(cursor) if self.len > 0 => (cursor + 1) as f64 / self.len as f64 * 100.0,
            _ => 0.0,
        }
    }
}
