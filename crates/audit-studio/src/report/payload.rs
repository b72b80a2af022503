use super::domain::AuditReport;
use super::insights::ReportInsights;
use crate::error::StudioError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Agent task row queued by the pack and ship actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    pub task_id: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub estimated_minutes: u32,
}

/// Result body of any studio action (audit, pack, coach, roadmap, ship).
///
/// Ship reports `before`/`after` instead of `report`; every other field is
/// optional and tolerated when absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActionPayload {
    pub report: Option<AuditReport>,
    pub before: Option<AuditReport>,
    pub after: Option<AuditReport>,
    pub insights: Option<ReportInsights>,
    pub before_insights: Option<ReportInsights>,
    pub after_insights: Option<ReportInsights>,
    pub improvement: Option<f64>,
    pub agent_tasks: Vec<TaskRow>,
    pub artifacts: BTreeMap<String, String>,
    pub agent_pack_markdown: Option<String>,
    pub coach_markdown: Option<String>,
    pub roadmap_markdown: Option<String>,
    pub applied_files: Vec<String>,
    pub task_count: Option<u32>,
}

/// Which markdown body fed the preview pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownSource {
    AgentPack,
    Coach,
    Roadmap,
}

impl ActionPayload {
    pub fn primary_report(&self) -> Option<&AuditReport> {
        self.report.as_ref().or(self.after.as_ref())
    }

    pub fn primary_insights(&self) -> Option<&ReportInsights> {
        self.insights.as_ref().or(self.after_insights.as_ref())
    }

    /// First non-empty markdown body, in pack, coach, roadmap order.
    pub fn preview_markdown(&self) -> Option<(MarkdownSource, &str)> {
        [
            (MarkdownSource::AgentPack, &self.agent_pack_markdown),
            (MarkdownSource::Coach, &self.coach_markdown),
            (MarkdownSource::Roadmap, &self.roadmap_markdown),
        ]
        .into_iter()
        .find_map(|(source, body)| {
            body.as_deref()
                .filter(|text| !text.is_empty())
                .map(|text| (source, text))
        })
    }
}

/// Artifact file returned by the preview endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPreview {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Turn a raw backend response into either the typed body or a single
/// `RequestFailure` carrying the server-supplied message.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, StudioError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "Request failed".to_string());
        return Err(StudioError::RequestFailure(message));
    }

    serde_json::from_slice(body).map_err(|err| {
        StudioError::RequestFailure(format!("backend returned an unreadable response: {err}"))
    })
}
