use std::fmt::Write;
use wasteops_core::overlay::prediction_fill;
use wasteops_core::{Dashboard, Registry};

/// KPI line followed by the filtered issues, one per line.
pub fn issue_list(dashboard: &Dashboard) -> String {
    let counts = dashboard.status_counts();
    let issues = dashboard.filtered_issues();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "오늘 접수 {} | 처리중 {} | 완료 {} | 조회 {}건",
        counts.received,
        counts.in_progress,
        counts.completed,
        issues.len()
    );
    for issue in issues {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            issue.id,
            issue.status,
            issue.issue_type,
            issue.priority,
            issue.address,
            issue.description
        );
    }
    out
}

pub fn zone_table(registry: &Registry) -> String {
    let mut out = String::new();
    for zone in registry.zones() {
        let prediction = &zone.prediction;
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{:>3}\t{}\t{}",
            zone.id,
            zone.name,
            prediction.level,
            prediction.score,
            prediction_fill(prediction.level).as_str(),
            prediction.reason
        );
    }
    out
}
