//! Insight and progression engine behind the quality-audit studio.
//!
//! The engine never performs I/O. It turns backend action results and session
//! facts into renderable snapshots; the `studio-api` service owns transport,
//! timers and the HTTP surface.

pub mod config;
pub mod error;
pub mod insight;
pub mod progression;
pub mod report;
pub mod session;
pub mod telemetry;

pub use error::{AppError, StudioError};
pub use session::{Effect, StudioEvent, StudioSnapshot, StudioState, Transition};
