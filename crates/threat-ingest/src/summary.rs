//! Human-readable rendering of a pipeline report.

use std::fmt::Write;

use threat_core::duration::format_seconds;
use threat_runtime::pipeline::PipelineReport;

/// Console summary printed at the end of a run.
pub fn render_summary(report: &PipelineReport, top_limit: u32) -> String {
    let mut out = String::new();
    let threats = &report.threats;
    let totals = &threats.summary.totals;

    let _ = writeln!(out, "--- Threats ---");
    let _ = writeln!(out, "Valid threat entries: {}", threats.records_ingested);
    let _ = writeln!(
        out,
        "Total attack time: {}, data leaked: {} MB",
        format_seconds(totals.duration_sec),
        totals.data_leaked_mb
    );
    let _ = writeln!(out, "Top {} Attacker IPs:", top_limit);
    for attacker in &threats.top_attackers {
        let _ = writeln!(
            out,
            "IP: {}, Attack Count: {}",
            attacker.attacker_ip, attacker.attack_count
        );
    }
    let _ = writeln!(
        out,
        "Blacklisted IPs: {}, records flagged for investigation: {}",
        threats.blacklist_size, threats.records_flagged
    );

    if !report.chart_files.is_empty() {
        let _ = writeln!(out, "--- Charts ---");
        for path in &report.chart_files {
            let _ = writeln!(out, "{}", path.display());
        }
    }

    let activity = &report.activity;
    let _ = writeln!(out, "--- Activity log ---");
    let _ = writeln!(
        out,
        "Suspicious entries: {} -> {}",
        activity.suspicious_entries,
        activity.suspicious_activity_file.display()
    );
    let _ = writeln!(
        out,
        "Suspicious IPs: {} -> {}",
        activity.suspicious_ips.len(),
        activity.suspicious_ips_file.display()
    );

    out
}
