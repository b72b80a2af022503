use audit_studio::config::ConfigError;
use audit_studio::error::AppError;
use audit_studio::insight::{
    crossed_milestones, milestone_board, rank_findings, Calibration, FixSimulator,
};
use audit_studio::report::{derive_insights, ActionPayload, AuditReport, ScoreBand};
use audit_studio::session::ActionKind;
use audit_studio::{StudioEvent, StudioState};
use chrono::Utc;
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Saved audit report, or a saved action result wrapping one
    #[arg(long)]
    pub(crate) report: PathBuf,
    /// Score of the previous run, used to list newly crossed milestones
    #[arg(long)]
    pub(crate) previous_score: Option<f64>,
    /// Simulation item id to include in the projection (repeatable)
    #[arg(long)]
    pub(crate) select: Vec<String>,
    /// JSON calibration overriding the lift table and milestone catalog
    #[arg(long)]
    pub(crate) calibration: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Saved audit report replayed as the audit result
    #[arg(long)]
    pub(crate) report: PathBuf,
    /// JSON calibration overriding the lift table and milestone catalog
    #[arg(long)]
    pub(crate) calibration: Option<PathBuf>,
    /// Project path shown in the replayed session
    #[arg(long, default_value = "./demo-project")]
    pub(crate) project_path: String,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        report: report_path,
        previous_score,
        select,
        calibration,
    } = args;

    let calibration = load_calibration(calibration)?;
    let payload = load_payload(&report_path)?;
    let Some(report) = payload.primary_report() else {
        println!("No report found in {}", report_path.display());
        return Ok(());
    };

    render_report(report, &calibration);

    let mut simulator = FixSimulator::from_report(Some(report), &calibration);
    for id in &select {
        match simulator.toggled(id) {
            Some(next) => simulator = next,
            None => println!("  (ignoring unknown simulation item {id})"),
        }
    }
    render_simulation(&simulator, report.overall());

    let crossings = crossed_milestones(previous_score, report.overall(), &calibration.milestones);
    match (previous_score, crossings.is_empty()) {
        (None, _) => {}
        (Some(previous), true) => {
            println!("\nNo milestones crossed since {previous:.1}");
        }
        (Some(previous), false) => {
            println!("\nMilestones crossed since {previous:.1}");
            for crossing in &crossings {
                println!(
                    "- {} ({:.0}) {}",
                    crossing.milestone.label, crossing.milestone.threshold, crossing.milestone.note
                );
            }
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        report,
        calibration,
        project_path,
    } = args;

    let calibration = load_calibration(calibration)?;
    let payload = load_payload(&report)?;

    println!("Audit studio demo");
    let mut state = StudioState::new(calibration);
    let script = [
        StudioEvent::TutorialBegun,
        StudioEvent::PathEdited { project_path },
        StudioEvent::ActionRequested {
            action: ActionKind::Audit,
        },
        StudioEvent::ActionSucceeded {
            action: ActionKind::Audit,
            payload: Box::new(payload),
        },
        StudioEvent::TutorialAdvanced,
        StudioEvent::TourStartRequested,
    ];

    for event in script {
        match state.apply(event, Utc::now()) {
            Ok(transition) => state = transition.state,
            Err(err) => {
                println!("  Step rejected: {}", err);
                state = state.notify_failure(&err).state;
            }
        }
    }

    let run_id = state.tour().run_id();
    while state.tour().is_running() {
        state = state
            .apply(StudioEvent::TourTicked { run_id }, Utc::now())?
            .state;
    }

    let snapshot = state.snapshot();
    if let Some(score) = &snapshot.score {
        println!("Score {:.1} ({})", score.overall, score.band_label);
    }
    println!(
        "Tutorial: {} ({}/{})",
        snapshot.tutorial.status_label, snapshot.tutorial.done, snapshot.tutorial.total
    );
    if !snapshot.tutorial.hint.is_empty() {
        println!("  Next: {}", snapshot.tutorial.hint);
    }
    println!("Milestones: {}", snapshot.milestones.status);

    println!("\nTimeline (newest first)");
    for entry in &snapshot.timeline {
        println!("- {} {}", entry.at.format("%H:%M:%S"), entry.message);
    }

    println!("\nStarter command");
    println!("  {}", snapshot.starter_command);
    Ok(())
}

fn load_calibration(path: Option<PathBuf>) -> Result<Calibration, AppError> {
    match path {
        Some(path) => Calibration::load(path)
            .map_err(|err| AppError::Config(ConfigError::Calibration(err))),
        None => Ok(Calibration::default()),
    }
}

/// Accepts either a bare report or a saved action result.
fn load_payload(path: &Path) -> Result<ActionPayload, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    let wrapped = ["report", "after"]
        .into_iter()
        .any(|key| value.get(key).is_some_and(Value::is_object));

    if wrapped {
        Ok(serde_json::from_value(value)?)
    } else {
        let report: AuditReport = serde_json::from_value(value)?;
        Ok(ActionPayload {
            report: Some(report),
            ..ActionPayload::default()
        })
    }
}

fn render_report(report: &AuditReport, calibration: &Calibration) {
    let overall = report.overall();
    println!(
        "Audit score {:.1} ({})",
        overall,
        ScoreBand::for_score(overall).label()
    );
    if let Some(path) = &report.project_path {
        println!("Project: {path}");
    }

    let ranked = rank_findings(report);
    if ranked.is_empty() {
        println!("\nOpen findings: none");
    } else {
        println!("\nOpen findings (highest priority first)");
        for check in ranked {
            println!(
                "- [{} / {}] {} ({})",
                check.status.label(),
                check.severity.label(),
                check.title,
                check.check_id
            );
            if !check.recommendation.is_empty() {
                println!("    {}", check.recommendation);
            }
        }
    }

    let insights = derive_insights(report);
    println!(
        "\nPass rate {:.1}% | {} open | {} high / {} medium / {} low",
        insights.pass_rate,
        insights.open_findings,
        insights.severity_counts.high,
        insights.severity_counts.medium,
        insights.severity_counts.low
    );
    if !insights.top_actions.is_empty() {
        println!("Top actions");
        for action in &insights.top_actions {
            println!("- {action}");
        }
    }

    let board = milestone_board(Some(overall), &calibration.milestones);
    println!("\nMilestones: {}", board.status);
    for mark in &board.marks {
        let flag = if mark.reached { "x" } else { " " };
        println!("  [{flag}] {:.0} {}", mark.threshold, mark.label);
    }
}

fn render_simulation(simulator: &FixSimulator, overall: f64) {
    if simulator.items().is_empty() {
        return;
    }
    println!("\nFix simulator");
    for item in simulator.items() {
        let flag = if simulator.is_selected(&item.id) {
            "x"
        } else {
            " "
        };
        println!("  [{flag}] {} +{:.1} {}", item.id, item.lift, item.title);
    }
    let projection = simulator.projection(overall);
    println!(
        "Projected {:.1} -> {:.1} (+{:.1})",
        projection.current_score, projection.projected_score, projection.clamped_delta
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("studio-demo-{}-{name}", std::process::id()));
        fs::write(&path, contents).expect("temp file writes");
        path
    }

    #[test]
    fn bare_report_is_wrapped_as_audit_result() {
        let path = write_temp(
            "bare.json",
            r#"{ "scorecard": { "overall": 61.5 }, "checks": [] }"#,
        );
        let payload = load_payload(&path).expect("payload loads");
        assert_eq!(payload.primary_report().map(AuditReport::overall), Some(61.5));
        fs::remove_file(path).ok();
    }

    #[test]
    fn ship_result_uses_after_report() {
        let path = write_temp(
            "ship.json",
            r#"{ "before": { "scorecard": { "overall": 50 } },
                 "after": { "scorecard": { "overall": 64 } },
                 "improvement": 14 }"#,
        );
        let payload = load_payload(&path).expect("payload loads");
        assert_eq!(payload.primary_report().map(AuditReport::overall), Some(64.0));
        assert_eq!(payload.improvement, Some(14.0));
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_calibration_file_is_a_config_error() {
        let err = load_calibration(Some(PathBuf::from("/nonexistent/calibration.json")))
            .expect_err("file is missing");
        assert!(matches!(err, AppError::Config(ConfigError::Calibration(_))));
    }
}
