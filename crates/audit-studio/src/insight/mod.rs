//! Pure scoring helpers: finding rank, fix-lift simulation and milestones.

pub mod calibration;
mod milestones;
mod ranker;
mod simulator;

pub use calibration::{Calibration, CalibrationError, LiftTable, SeverityLift};
pub use milestones::{
    crossed_milestones, milestone_board, Milestone, MilestoneBoard, MilestoneCrossing,
    MilestoneMark,
};
pub use ranker::rank_findings;
pub use simulator::{
    clamp_score, reconcile_selection, simulation_items, FixSimulator, Projection, SimulationItem,
};
