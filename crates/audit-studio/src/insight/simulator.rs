use super::calibration::Calibration;
use super::ranker::rank_findings;
use crate::report::{AuditReport, CheckStatus, Severity};
use serde::Serialize;
use std::collections::BTreeSet;

/// Clamp a score into [0, 100]; non-finite input reads as 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationItem {
    pub id: String,
    pub title: String,
    pub status: CheckStatus,
    pub severity: Severity,
    pub lift: f64,
}

/// Simulator rows for a report: the top ranked open findings, capped at the
/// calibrated capacity. Ids carry the ranked position so duplicate or missing
/// rule ids stay distinct.
pub fn simulation_items(
    report: Option<&AuditReport>,
    calibration: &Calibration,
) -> Vec<SimulationItem> {
    let Some(report) = report else {
        return Vec::new();
    };

    rank_findings(report)
        .into_iter()
        .take(calibration.simulator_capacity)
        .enumerate()
        .map(|(index, check)| {
            let base = if check.check_id.is_empty() {
                "check"
            } else {
                check.check_id.as_str()
            };
            SimulationItem {
                id: format!("{base}-{index}"),
                title: check.title.clone(),
                status: check.status,
                severity: check.severity.clone(),
                lift: calibration.lift.lift(check.status, &check.severity),
            }
        })
        .collect()
}

/// Keep only the selected ids that still exist; nothing is ever auto-selected.
pub fn reconcile_selection(
    selection: &BTreeSet<String>,
    items: &[SimulationItem],
) -> BTreeSet<String> {
    selection
        .iter()
        .filter(|id| items.iter().any(|item| &item.id == *id))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub current_score: f64,
    pub projected_score: f64,
    /// Sum of the selected lifts before clamping.
    pub raw_lift: f64,
    /// `projected_score - current_score`; smaller than `raw_lift` near 100.
    pub clamped_delta: f64,
}

/// Simulator items plus the user's selection over them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FixSimulator {
    items: Vec<SimulationItem>,
    selection: BTreeSet<String>,
}

impl FixSimulator {
    pub fn from_report(report: Option<&AuditReport>, calibration: &Calibration) -> Self {
        Self {
            items: simulation_items(report, calibration),
            selection: BTreeSet::new(),
        }
    }

    /// Rebuild items for a new report, carrying over the surviving selection.
    pub fn refreshed(&self, report: Option<&AuditReport>, calibration: &Calibration) -> Self {
        let items = simulation_items(report, calibration);
        let selection = reconcile_selection(&self.selection, &items);
        Self { items, selection }
    }

    /// Flip one item. Returns `None` when the id is not a current item.
    pub fn toggled(&self, id: &str) -> Option<Self> {
        if !self.items.iter().any(|item| item.id == id) {
            return None;
        }
        let mut selection = self.selection.clone();
        if !selection.remove(id) {
            selection.insert(id.to_string());
        }
        Some(Self {
            items: self.items.clone(),
            selection,
        })
    }

    pub fn items(&self) -> &[SimulationItem] {
        &self.items
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn projection(&self, overall: f64) -> Projection {
        let current_score = clamp_score(overall);
        let raw_lift: f64 = self
            .items
            .iter()
            .filter(|item| self.selection.contains(&item.id))
            .map(|item| item.lift)
            .sum();
        let projected_score = clamp_score(current_score + raw_lift);
        Projection {
            current_score,
            projected_score,
            raw_lift,
            clamped_delta: projected_score - current_score,
        }
    }
}
