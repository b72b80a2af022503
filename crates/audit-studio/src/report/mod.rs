mod artifacts;
pub mod domain;
mod insights;
pub mod payload;

pub use artifacts::{ArtifactKind, OpenedArtifact};
pub use domain::{AuditReport, Category, Check, CheckStatus, Scorecard, Severity};
pub use insights::{derive_insights, ReportInsights, ScoreBand, SeverityCounts, StatusCounts};
pub use payload::{decode_response, ActionPayload, ArtifactPreview, MarkdownSource, TaskRow};
