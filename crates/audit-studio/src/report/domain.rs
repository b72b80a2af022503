use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    /// Sort rank for open findings: failures first.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Fail => 0,
            Self::Warn => 1,
            Self::Pass => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }
}

/// Finding severity as reported by the backend.
///
/// Unrecognized values are kept verbatim in `Other` so they still render and
/// sort after the known severities. A missing severity is `Other("")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    High,
    Medium,
    Low,
    Other(String),
}

impl Severity {
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low | Self::Other(_) => 2,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Other(raw) if raw.is_empty() => "LOW".to_string(),
            other => other.as_str().to_ascii_uppercase(),
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Other(value),
        }
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Usefulness,
    Impact,
    Execution,
    Innovation,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usefulness => "usefulness",
            Self::Impact => "impact",
            Self::Execution => "execution",
            Self::Innovation => "innovation",
        }
    }
}

/// One audited rule outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    #[serde(default)]
    pub check_id: String,
    pub status: CheckStatus,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
}

impl Check {
    pub fn is_open(&self) -> bool {
        self.status != CheckStatus::Pass
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scorecard {
    pub overall: f64,
    pub usefulness: f64,
    pub impact: f64,
    pub execution: f64,
    pub innovation: f64,
}

/// Audit report as delivered by the backend. Never mutated after receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    #[serde(default)]
    pub checks: Vec<Check>,
    #[serde(default)]
    pub scorecard: Scorecard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl AuditReport {
    pub fn overall(&self) -> f64 {
        self.scorecard.overall
    }

    pub fn open_findings(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|check| check.is_open())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_and_missing_severities_survive_parsing() {
        let report: AuditReport = serde_json::from_value(json!({
            "checks": [
                { "check_id": "a", "status": "fail", "severity": "blocker", "title": "A" },
                { "check_id": "b", "status": "warn", "title": "B" }
            ]
        }))
        .expect("report parses");

        assert_eq!(report.checks[0].severity, Severity::Other("blocker".into()));
        assert_eq!(report.checks[0].severity.rank(), 2);
        assert_eq!(report.checks[0].severity.label(), "BLOCKER");
        assert_eq!(report.checks[1].severity, Severity::default());
        assert_eq!(report.checks[1].severity.label(), "LOW");
    }

    #[test]
    fn missing_scorecard_reads_as_zero() {
        let report: AuditReport =
            serde_json::from_value(json!({ "checks": [] })).expect("report parses");
        assert_eq!(report.overall(), 0.0);

        let partial: AuditReport =
            serde_json::from_value(json!({ "scorecard": { "impact": 40.0 } }))
                .expect("report parses");
        assert_eq!(partial.overall(), 0.0);
        assert_eq!(partial.scorecard.impact, 40.0);
    }

    #[test]
    fn severity_serializes_back_to_raw_string() {
        let value = serde_json::to_value(Severity::Medium).expect("serializes");
        assert_eq!(value, json!("medium"));
        let value = serde_json::to_value(Severity::Other("blocker".into())).expect("serializes");
        assert_eq!(value, json!("blocker"));
    }
}
