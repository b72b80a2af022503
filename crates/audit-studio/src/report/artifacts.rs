use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What a generated artifact file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    ReportJson,
    ReportMarkdown,
    Coach,
    AgentPack,
    AgentTasks,
    AgentRunbook,
    AgentPrompts,
    Roadmap,
    Other,
}

impl ArtifactKind {
    /// Kind named by a key of the action result's `artifacts` map.
    pub fn from_key(key: &str) -> Self {
        match key {
            "report_json" => Self::ReportJson,
            "report_markdown" => Self::ReportMarkdown,
            "coach_markdown" => Self::Coach,
            "agent_pack_markdown" => Self::AgentPack,
            "agent_tasks_json" => Self::AgentTasks,
            "agent_runbook_markdown" => Self::AgentRunbook,
            "agent_prompts_dir" => Self::AgentPrompts,
            "roadmap_markdown" => Self::Roadmap,
            _ => Self::Other,
        }
    }

    /// Kind guessed from the file name the backend writes.
    pub fn from_path(path: &str) -> Self {
        let name = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        match name {
            "report.json" => Self::ReportJson,
            "report.md" => Self::ReportMarkdown,
            "coach.md" => Self::Coach,
            "agent_pack.md" => Self::AgentPack,
            "agent_tasks.json" => Self::AgentTasks,
            "agent_runbook.md" => Self::AgentRunbook,
            "prompts" => Self::AgentPrompts,
            "roadmap.md" => Self::Roadmap,
            _ => Self::Other,
        }
    }

    /// Prefer the map key that points at `path`; fall back to the file name.
    pub fn classify(artifacts: &BTreeMap<String, String>, path: &str) -> Self {
        artifacts
            .iter()
            .find(|(_, value)| value.as_str() == path)
            .map(|(key, _)| Self::from_key(key))
            .filter(|kind| *kind != Self::Other)
            .unwrap_or_else(|| Self::from_path(path))
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ReportJson => "Report (JSON)",
            Self::ReportMarkdown => "Report",
            Self::Coach => "Coach",
            Self::AgentPack => "Agent Pack",
            Self::AgentTasks => "Agent Tasks",
            Self::AgentRunbook => "Agent Runbook",
            Self::AgentPrompts => "Agent Prompts",
            Self::Roadmap => "Roadmap",
            Self::Other => "Artifact",
        }
    }
}

/// Last artifact the user opened in the preview pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenedArtifact {
    pub path: String,
    pub kind: ArtifactKind,
}

impl OpenedArtifact {
    pub fn new(artifacts: &BTreeMap<String, String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let kind = ArtifactKind::classify(artifacts, &path);
        Self { path, kind }
    }

    pub fn is_coach(&self) -> bool {
        self.kind == ArtifactKind::Coach || self.path.ends_with("coach.md")
    }
}
