use crate::report::{AuditReport, Check};

/// Open findings ordered by (status rank, severity rank).
///
/// `sort_by_key` is stable, so findings that tie keep the order the backend
/// reported them in.
pub fn rank_findings(report: &AuditReport) -> Vec<&Check> {
    let mut findings: Vec<&Check> = report.open_findings().collect();
    findings.sort_by_key(|check| (check.status.rank(), check.severity.rank()));
    findings
}
