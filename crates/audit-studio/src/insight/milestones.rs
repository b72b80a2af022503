use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub threshold: f64,
    pub label: String,
    #[serde(default)]
    pub note: String,
}

impl Milestone {
    pub fn new(threshold: f64, label: &str, note: &str) -> Self {
        Self {
            threshold,
            label: label.to_string(),
            note: note.to_string(),
        }
    }

    pub fn reference_catalog() -> Vec<Self> {
        vec![
            Self::new(60.0, "Bronze Ready", "Baseline reliability unlocked"),
            Self::new(75.0, "Silver Ship", "Judge-facing confidence zone"),
            Self::new(90.0, "Gold Launch", "Competition-grade quality bar"),
        ]
    }
}

/// A milestone newly crossed by one score transition. `order` is its position
/// among the crossings of that transition, used to stagger announcements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneCrossing {
    pub milestone: Milestone,
    pub order: usize,
}

/// Milestones with `previous < threshold <= current`, in catalog order.
///
/// Holds no memory of earlier announcements: a score that stays above a
/// threshold never re-crosses it as long as the caller passes the true
/// previous score. An unknown previous score reports nothing.
pub fn crossed_milestones(
    previous: Option<f64>,
    current: f64,
    catalog: &[Milestone],
) -> Vec<MilestoneCrossing> {
    let Some(previous) = previous.filter(|score| score.is_finite()) else {
        return Vec::new();
    };

    catalog
        .iter()
        .filter(|milestone| previous < milestone.threshold && milestone.threshold <= current)
        .enumerate()
        .map(|(order, milestone)| MilestoneCrossing {
            milestone: milestone.clone(),
            order,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneMark {
    pub threshold: f64,
    pub label: String,
    pub note: String,
    pub reached: bool,
    pub current: bool,
}

/// Milestone panel: every catalog entry with reached/current flags and a
/// one-line status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneBoard {
    pub marks: Vec<MilestoneMark>,
    pub status: String,
}

pub fn milestone_board(score: Option<f64>, catalog: &[Milestone]) -> MilestoneBoard {
    let Some(score) = score.filter(|score| score.is_finite()) else {
        return MilestoneBoard {
            marks: Vec::new(),
            status: "Run an action to populate milestones.".to_string(),
        };
    };

    let reached = catalog
        .iter()
        .filter(|milestone| score >= milestone.threshold)
        .count();

    let marks = catalog
        .iter()
        .enumerate()
        .map(|(index, milestone)| MilestoneMark {
            threshold: milestone.threshold,
            label: milestone.label.clone(),
            note: milestone.note.clone(),
            reached: score >= milestone.threshold,
            current: reached > 0 && index == reached - 1,
        })
        .collect();

    let status = match reached.checked_sub(1).and_then(|index| catalog.get(index)) {
        Some(latest) => format!("Latest milestone: {} ({:.1} points).", latest.label, score),
        None => "No milestone unlocked yet. Focus high-impact fixes first.".to_string(),
    };

    MilestoneBoard { marks, status }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(crossings: &[MilestoneCrossing]) -> Vec<f64> {
        crossings
            .iter()
            .map(|crossing| crossing.milestone.threshold)
            .collect()
    }

    #[test]
    fn reports_every_threshold_crossed_in_one_jump() {
        let catalog = Milestone::reference_catalog();
        let crossings = crossed_milestones(Some(58.0), 77.0, &catalog);
        assert_eq!(thresholds(&crossings), vec![60.0, 75.0]);
        assert_eq!(crossings[1].order, 1);
    }

    #[test]
    fn only_newly_crossed_thresholds_are_reported() {
        let catalog = Milestone::reference_catalog();
        assert_eq!(
            thresholds(&crossed_milestones(Some(80.0), 95.0, &catalog)),
            vec![90.0]
        );
        assert!(crossed_milestones(Some(95.0), 96.0, &catalog).is_empty());
        assert!(crossed_milestones(Some(77.0), 60.0, &catalog).is_empty());
    }

    #[test]
    fn landing_exactly_on_threshold_counts() {
        let catalog = Milestone::reference_catalog();
        assert_eq!(
            thresholds(&crossed_milestones(Some(59.9), 60.0, &catalog)),
            vec![60.0]
        );
        assert!(crossed_milestones(Some(60.0), 70.0, &catalog).is_empty());
    }

    #[test]
    fn unknown_previous_score_never_crosses() {
        let catalog = Milestone::reference_catalog();
        assert!(crossed_milestones(None, 95.0, &catalog).is_empty());
        assert!(crossed_milestones(Some(f64::NAN), 95.0, &catalog).is_empty());
    }

    #[test]
    fn works_for_arbitrary_ascending_catalogs() {
        let catalog = vec![
            Milestone::new(10.0, "a", ""),
            Milestone::new(20.0, "b", ""),
            Milestone::new(30.0, "c", ""),
            Milestone::new(40.0, "d", ""),
        ];
        assert_eq!(
            thresholds(&crossed_milestones(Some(0.0), 100.0, &catalog)),
            vec![10.0, 20.0, 30.0, 40.0]
        );
    }

    #[test]
    fn board_flags_latest_reached_milestone() {
        let catalog = Milestone::reference_catalog();
        let board = milestone_board(Some(77.0), &catalog);
        let flags: Vec<(bool, bool)> = board
            .marks
            .iter()
            .map(|mark| (mark.reached, mark.current))
            .collect();
        assert_eq!(flags, vec![(true, false), (true, true), (false, false)]);
        assert_eq!(board.status, "Latest milestone: Silver Ship (77.0 points).");
    }

    #[test]
    fn board_without_score_asks_for_a_run() {
        let board = milestone_board(None, &Milestone::reference_catalog());
        assert!(board.marks.is_empty());
        assert_eq!(board.status, "Run an action to populate milestones.");

        let board = milestone_board(Some(12.0), &Milestone::reference_catalog());
        assert!(board.marks.iter().all(|mark| !mark.reached));
        assert!(board.status.starts_with("No milestone unlocked yet"));
    }
}
