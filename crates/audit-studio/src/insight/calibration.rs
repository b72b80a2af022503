use super::milestones::Milestone;
use crate::report::{CheckStatus, Severity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lift per severity for one finding status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityLift {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl SeverityLift {
    fn entries(&self) -> [(&'static str, f64); 3] {
        [("high", self.high), ("medium", self.medium), ("low", self.low)]
    }

    fn get(&self, severity: &Severity) -> Option<f64> {
        match severity {
            Severity::High => Some(self.high),
            Severity::Medium => Some(self.medium),
            Severity::Low => Some(self.low),
            Severity::Other(_) => None,
        }
    }
}

/// Heuristic score points a fix contributes, keyed by (status, severity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiftTable {
    pub fail: SeverityLift,
    pub warn: SeverityLift,
    #[serde(default = "default_lift")]
    pub fallback: f64,
}

fn default_lift() -> f64 {
    2.0
}

impl LiftTable {
    pub fn lift(&self, status: CheckStatus, severity: &Severity) -> f64 {
        let row = match status {
            CheckStatus::Fail => Some(&self.fail),
            CheckStatus::Warn => Some(&self.warn),
            CheckStatus::Pass => None,
        };
        row.and_then(|row| row.get(severity))
            .unwrap_or(self.fallback)
    }
}

impl Default for LiftTable {
    fn default() -> Self {
        Self {
            fail: SeverityLift {
                high: 8.0,
                medium: 5.0,
                low: 3.0,
            },
            warn: SeverityLift {
                high: 4.0,
                medium: 3.0,
                low: 2.0,
            },
            fallback: default_lift(),
        }
    }
}

/// Tunable constants of the insight engine. The defaults are the reference
/// deployment's values; a JSON file may override any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub lift: LiftTable,
    pub milestones: Vec<Milestone>,
    pub simulator_capacity: usize,
    pub celebration_stagger_ms: u64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            lift: LiftTable::default(),
            milestones: Milestone::reference_catalog(),
            simulator_capacity: 7,
            celebration_stagger_ms: 160,
        }
    }
}

impl Calibration {
    pub fn from_json(raw: &str) -> Result<Self, CalibrationError> {
        let calibration: Self = serde_json::from_str(raw)?;
        calibration.validate()?;
        Ok(calibration)
    }

    pub fn load(path: PathBuf) -> Result<Self, CalibrationError> {
        let raw = std::fs::read_to_string(&path)
            .map_err(|source| CalibrationError::Io { path, source })?;
        Self::from_json(&raw)
    }

    fn validate(&self) -> Result<(), CalibrationError> {
        if let Some(index) = self
            .milestones
            .iter()
            .position(|milestone| !milestone.threshold.is_finite())
        {
            return Err(CalibrationError::InvalidThreshold { index });
        }

        let lifts = self
            .lift
            .fail
            .entries()
            .map(|(severity, value)| (format!("fail.{severity}"), value))
            .into_iter()
            .chain(
                self.lift
                    .warn
                    .entries()
                    .map(|(severity, value)| (format!("warn.{severity}"), value)),
            )
            .chain(std::iter::once(("fallback".to_string(), self.lift.fallback)));
        for (entry, value) in lifts {
            if !value.is_finite() || value < 0.0 {
                return Err(CalibrationError::InvalidLift { entry });
            }
        }

        let descending = self
            .milestones
            .windows(2)
            .position(|pair| pair[1].threshold < pair[0].threshold);
        if let Some(index) = descending {
            return Err(CalibrationError::UnorderedMilestones { index: index + 1 });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid calibration json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("milestone {index} has a lower threshold than the one before it")]
    UnorderedMilestones { index: usize },
    #[error("milestone {index} threshold must be a finite number")]
    InvalidThreshold { index: usize },
    #[error("lift {entry} must be a finite, non-negative number")]
    InvalidLift { entry: String },
}
