//! Activity-log parsing and suspicious-activity analysis.
//!
//! Log lines are `ip, timestamp, action, result`. Blank lines and lines with
//! the wrong field count are skipped; every parsed entry is run through a
//! [`SuspiciousActivityClassifier`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use threat_core::error::Result;
use threat_core::models::LogEntry;
use threat_core::tokenizer::{LineTokenizer, Tokens};
use tracing::{debug, info, warn};

use crate::classifier::SuspiciousActivityClassifier;
use crate::reader::{read_lines, write_lines};

/// Number of comma-delimited fields in an activity-log line.
pub const LOG_FIELD_COUNT: usize = 4;

const TOKENIZER: LineTokenizer = LineTokenizer::new(LOG_FIELD_COUNT);

/// Parse one activity-log line. Returns `None` for blank or malformed lines.
pub fn parse_log_line(line: &str) -> Option<LogEntry> {
    entry_from_fields(&TOKENIZER.tokenize(line).into_fields()?)
}

fn entry_from_fields(fields: &[&str]) -> Option<LogEntry> {
    let [ip, timestamp, action, result] = fields else {
        return None;
    };
    Some(LogEntry {
        ip: ip.to_string(),
        timestamp: timestamp.to_string(),
        action: action.to_string(),
        result: result.to_string(),
    })
}

// ── SuspiciousActivity ────────────────────────────────────────────────────────

/// Suspicious entries in log order plus the distinct IPs behind them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuspiciousActivity {
    pub entries: Vec<LogEntry>,
    pub ips: HashSet<String>,
}

impl SuspiciousActivity {
    fn record(&mut self, entry: LogEntry) {
        self.ips.insert(entry.ip.clone());
        self.entries.push(entry);
    }

    /// Distinct suspicious IPs, sorted.
    pub fn sorted_ips(&self) -> Vec<&str> {
        let mut ips: Vec<&str> = self.ips.iter().map(String::as_str).collect();
        ips.sort_unstable();
        ips
    }

    /// Write one `ip, timestamp, action, result` line per entry, in log order.
    pub fn write_entries(&self, path: &Path) -> Result<usize> {
        write_lines(path, &self.entries)
    }

    /// Write each distinct IP once, one per line.
    pub fn write_ips(&self, path: &Path) -> Result<usize> {
        write_lines(path, &self.ips)
    }
}

// ── ActivityLogAnalyzer ───────────────────────────────────────────────────────

/// Analyzes one activity-log file.
#[derive(Debug)]
pub struct ActivityLogAnalyzer {
    log_file: PathBuf,
    classifier: SuspiciousActivityClassifier,
}

impl ActivityLogAnalyzer {
    /// Analyzer using the default (failed-result) classifier.
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self::with_classifier(log_file, SuspiciousActivityClassifier::default())
    }

    pub fn with_classifier(
        log_file: impl Into<PathBuf>,
        classifier: SuspiciousActivityClassifier,
    ) -> Self {
        Self {
            log_file: log_file.into(),
            classifier,
        }
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn classifier(&self) -> &SuspiciousActivityClassifier {
        &self.classifier
    }

    /// Classify in-memory log lines.
    pub fn analyze<I, S>(&self, lines: I) -> SuspiciousActivity
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.classify(lines).0
    }

    /// Read and classify the whole log file.
    pub fn analyze_logs(&self) -> Result<SuspiciousActivity> {
        let lines = read_lines(&self.log_file)?;
        let (activity, parsed) = self.classify(&lines);

        debug!(
            "File {}: {} parsed, {} suspicious, {} distinct IPs",
            self.log_file.display(),
            parsed,
            activity.entries.len(),
            activity.ips.len()
        );

        Ok(activity)
    }

    /// Analyze the log and write the suspicious entries to `output_file`.
    pub fn save_suspicious_activity(&self, output_file: &Path) -> Result<usize> {
        let written = self.analyze_logs()?.write_entries(output_file)?;
        info!(
            "Saved {} suspicious activity entries to {}",
            written,
            output_file.display()
        );
        Ok(written)
    }

    /// Analyze the log and write the distinct suspicious IPs to `output_file`.
    pub fn save_suspicious_ips(&self, output_file: &Path) -> Result<usize> {
        let written = self.analyze_logs()?.write_ips(output_file)?;
        info!(
            "Saved {} unique suspicious IPs to {}",
            written,
            output_file.display()
        );
        Ok(written)
    }

    /// Suspicious activity plus the number of lines that parsed.
    fn classify<I, S>(&self, lines: I) -> (SuspiciousActivity, usize)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut activity = SuspiciousActivity::default();
        let mut parsed = 0usize;
        for entry in lines
            .into_iter()
            .filter_map(|line| self.parse_checked(line.as_ref()))
        {
            parsed += 1;
            if self.classifier.is_suspicious(&entry) {
                activity.record(entry);
            }
        }
        (activity, parsed)
    }

    fn parse_checked(&self, line: &str) -> Option<LogEntry> {
        match TOKENIZER.tokenize(line) {
            Tokens::Blank => None,
            Tokens::Mismatch { found, .. } => {
                warn!(
                    "Invalid format in log line ({} fields): {}",
                    found,
                    line.trim()
                );
                None
            }
            Tokens::Fields(fields) => entry_from_fields(&fields),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
