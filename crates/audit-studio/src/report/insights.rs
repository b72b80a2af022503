use super::domain::{AuditReport, Check, CheckStatus, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreBand {
    Excellent,
    Strong,
    NeedsWork,
    Critical,
}

impl ScoreBand {
    pub fn for_score(overall: f64) -> Self {
        if overall >= 90.0 {
            Self::Excellent
        } else if overall >= 75.0 {
            Self::Strong
        } else if overall >= 55.0 {
            Self::NeedsWork
        } else {
            Self::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Strong => "Strong",
            Self::NeedsWork => "Needs Work",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCounts {
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Advisory summary shown next to the score. The engine never branches on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportInsights {
    pub status_counts: StatusCounts,
    pub severity_counts: SeverityCounts,
    pub open_findings: usize,
    pub pass_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_band: Option<ScoreBand>,
    pub top_actions: Vec<String>,
}

/// Backend ordering for open findings: severity, then category, then rule id.
/// Differs from the studio's own ranking, which leads with status.
fn backend_order(check: &Check) -> (u8, &str, &str) {
    (
        check.severity.rank(),
        check.category.map(|category| category.as_str()).unwrap_or("zzz"),
        check.check_id.as_str(),
    )
}

/// Recompute the insight block locally when an action result arrives without one.
pub fn derive_insights(report: &AuditReport) -> ReportInsights {
    let mut status_counts = StatusCounts::default();
    let mut severity_counts = SeverityCounts::default();

    for check in &report.checks {
        match check.status {
            CheckStatus::Pass => status_counts.pass += 1,
            CheckStatus::Warn => status_counts.warn += 1,
            CheckStatus::Fail => status_counts.fail += 1,
        }
        match check.severity {
            Severity::High => severity_counts.high += 1,
            Severity::Medium => severity_counts.medium += 1,
            Severity::Low => severity_counts.low += 1,
            Severity::Other(ref raw) if raw.is_empty() => severity_counts.low += 1,
            Severity::Other(_) => {}
        }
    }

    let total = report.checks.len();
    let pass_rate = if total == 0 {
        0.0
    } else {
        ((status_counts.pass as f64 / total as f64) * 1000.0).round() / 10.0
    };

    let mut findings: Vec<&Check> = report.open_findings().collect();
    findings.sort_by(|a, b| backend_order(a).cmp(&backend_order(b)));

    let mut top_actions: Vec<String> = Vec::new();
    for finding in &findings {
        let recommendation = finding.recommendation.trim();
        if !recommendation.is_empty() && !top_actions.iter().any(|seen| seen == recommendation) {
            top_actions.push(recommendation.to_string());
        }
        if top_actions.len() == 3 {
            break;
        }
    }

    ReportInsights {
        status_counts,
        severity_counts,
        open_findings: findings.len(),
        pass_rate,
        score_band: Some(ScoreBand::for_score(report.overall())),
        top_actions,
    }
}
