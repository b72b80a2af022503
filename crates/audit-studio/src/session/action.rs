use crate::error::StudioError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

pub const ARTIFACT_ENDPOINT: &str = "/api/artifact";

const PATH_PLACEHOLDER: &str = "<your-project-path>";

/// Backend operations a user can launch from the studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Audit,
    Pack,
    Coach,
    Roadmap,
    Ship,
}

impl ActionKind {
    pub const ALL: [Self; 5] = [
        Self::Audit,
        Self::Pack,
        Self::Coach,
        Self::Roadmap,
        Self::Ship,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Audit => "audit",
            Self::Pack => "pack",
            Self::Coach => "coach",
            Self::Roadmap => "roadmap",
            Self::Ship => "ship",
        }
    }

    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Audit => "/api/audit",
            Self::Pack => "/api/agent-pack",
            Self::Coach => "/api/coach",
            Self::Roadmap => "/api/roadmap",
            Self::Ship => "/api/ship",
        }
    }

    /// Coach never writes files from the studio; ship follows the session toggle.
    pub fn request_body(self, project_path: &str, apply_safe: bool) -> Value {
        match self {
            Self::Coach => json!({ "project_path": project_path, "apply_safe": false }),
            Self::Ship => json!({ "project_path": project_path, "apply_safe": apply_safe }),
            _ => json!({ "project_path": project_path }),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = StudioError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == raw)
            .ok_or_else(|| StudioError::UnknownAction(raw.to_string()))
    }
}

pub fn artifact_request_body(project_path: &str, artifact_path: &str) -> Value {
    json!({ "project_path": project_path, "artifact_path": artifact_path })
}

/// Shell one-liner that reproduces the studio's audit and ship loop.
pub fn starter_command(project_path: &str) -> String {
    let path = match project_path.trim() {
        "" => PATH_PLACEHOLDER,
        trimmed => trimmed,
    };
    format!(
        "vibe-sentinel audit \"{path}\" --output-dir .vibe-sentinel && vibe-sentinel ship \"{path}\" --apply-safe"
    )
}
