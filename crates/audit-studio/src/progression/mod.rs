//! Guided-progression state machines: the step checklist and the demo tour.

mod tour;
mod tutorial;

pub use tour::{DemoTour, StepMark, TourStep, TourTransition, TOUR_STEPS};
pub use tutorial::{
    SessionFacts, TutorialChecklist, TutorialDirective, TutorialProgress, TutorialStatus,
    TutorialStep, TutorialStepId, TutorialStepMark, TUTORIAL_STEPS,
};
