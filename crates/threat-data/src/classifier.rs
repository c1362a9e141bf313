//! Suspicion rules for activity-log entries.
//!
//! A [`SuspiciousActivityClassifier`] holds an ordered list of named
//! predicates and flags an entry when any of them matches. The default
//! classifier ships the failed-result rule only.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use threat_core::models::LogEntry;

/// Timestamp layout understood by [`SuspicionRule::off_hours`].
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

type Predicate = Box<dyn Fn(&LogEntry) -> bool + Send + Sync>;

/// A named predicate over a single [`LogEntry`].
pub struct SuspicionRule {
    name: String,
    predicate: Predicate,
}

impl SuspicionRule {
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&LogEntry) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Matches entries whose result is exactly `FAILURE`.
    pub fn failed_result() -> Self {
        Self::new("failed-result", LogEntry::is_failure)
    }

    /// Matches entries timestamped inside `[start_hour, end_hour)`.
    ///
    /// The window wraps past midnight when `start_hour > end_hour`, so
    /// `off_hours(22, 6)` covers 22:00 to 05:59. Timestamps that do not parse
    /// as [`LOG_TIMESTAMP_FORMAT`] never match.
    pub fn off_hours(start_hour: u32, end_hour: u32) -> Self {
        Self::new("off-hours", move |entry: &LogEntry| {
            let Ok(ts) = NaiveDateTime::parse_from_str(&entry.timestamp, LOG_TIMESTAMP_FORMAT)
            else {
                return false;
            };
            hour_in_window(ts.hour(), start_hour, end_hour)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        (self.predicate)(entry)
    }
}

impl fmt::Debug for SuspicionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuspicionRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn hour_in_window(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

// ── SuspiciousActivityClassifier ──────────────────────────────────────────────

/// OR-combination of suspicion rules, evaluated in registration order.
#[derive(Debug)]
pub struct SuspiciousActivityClassifier {
    rules: Vec<SuspicionRule>,
}

impl Default for SuspiciousActivityClassifier {
    fn default() -> Self {
        Self {
            rules: vec![SuspicionRule::failed_result()],
        }
    }
}

impl SuspiciousActivityClassifier {
    /// Classifier with no rules; flags nothing until rules are added.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule, builder style.
    pub fn with_rule(mut self, rule: SuspicionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn add_rule(&mut self, rule: SuspicionRule) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(SuspicionRule::name).collect()
    }

    /// `true` iff any registered rule matches the entry.
    pub fn is_suspicious(&self, entry: &LogEntry) -> bool {
        self.rules.iter().any(|rule| rule.matches(entry))
    }

    /// Name of the first matching rule, if any.
    pub fn first_match(&self, entry: &LogEntry) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(entry))
            .map(SuspicionRule::name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ip: &str, timestamp: &str, action: &str, result: &str) -> LogEntry {
        LogEntry {
            ip: ip.to_string(),
            timestamp: timestamp.to_string(),
            action: action.to_string(),
            result: result.to_string(),
        }
    }

    #[test]
    fn test_default_flags_failure_only() {
        let c = SuspiciousActivityClassifier::default();
        assert!(c.is_suspicious(&entry("1.1.1.1", "2023-01-01 10:00:00", "LOGIN", "FAILURE")));
        assert!(!c.is_suspicious(&entry("1.1.1.1", "2023-01-01 10:00:00", "LOGIN", "SUCCESS")));
        assert_eq!(c.rule_names(), vec!["failed-result"]);
    }

    #[test]
    fn test_default_failure_match_is_exact() {
        let c = SuspiciousActivityClassifier::default();
        assert!(!c.is_suspicious(&entry("1.1.1.1", "t", "LOGIN", "failure")));
        assert!(!c.is_suspicious(&entry("1.1.1.1", "t", "LOGIN", "FAILURES")));
        assert!(!c.is_suspicious(&entry("1.1.1.1", "t", "LOGIN", "")));
    }

    #[test]
    fn test_empty_classifier_flags_nothing() {
        let c = SuspiciousActivityClassifier::empty();
        assert!(!c.is_suspicious(&entry("1.1.1.1", "t", "LOGIN", "FAILURE")));
    }

    #[test]
    fn test_custom_rule_is_or_combined() {
        let c = SuspiciousActivityClassifier::default()
            .with_rule(SuspicionRule::new("delete", |e: &LogEntry| e.action == "DELETE"));

        assert!(c.is_suspicious(&entry("1.1.1.1", "t", "DELETE", "SUCCESS")));
        assert!(c.is_suspicious(&entry("1.1.1.1", "t", "LOGIN", "FAILURE")));
        assert!(!c.is_suspicious(&entry("1.1.1.1", "t", "LOGIN", "SUCCESS")));
        assert_eq!(
            c.first_match(&entry("1.1.1.1", "t", "DELETE", "FAILURE")),
            Some("failed-result")
        );
        assert_eq!(
            c.first_match(&entry("1.1.1.1", "t", "DELETE", "SUCCESS")),
            Some("delete")
        );
    }

    #[test]
    fn test_off_hours_wrapping_window() {
        let rule = SuspicionRule::off_hours(22, 6);
        assert!(rule.matches(&entry("1.1.1.1", "2023-01-01 23:15:00", "LOGIN", "SUCCESS")));
        assert!(rule.matches(&entry("1.1.1.1", "2023-01-02 03:00:00", "LOGIN", "SUCCESS")));
        assert!(!rule.matches(&entry("1.1.1.1", "2023-01-02 06:00:00", "LOGIN", "SUCCESS")));
        assert!(!rule.matches(&entry("1.1.1.1", "2023-01-02 12:00:00", "LOGIN", "SUCCESS")));
    }

    #[test]
    fn test_off_hours_daytime_window() {
        let rule = SuspicionRule::off_hours(9, 17);
        assert!(rule.matches(&entry("1.1.1.1", "2023-01-01 09:00:00", "X", "SUCCESS")));
        assert!(!rule.matches(&entry("1.1.1.1", "2023-01-01 17:00:00", "X", "SUCCESS")));
    }

    #[test]
    fn test_off_hours_unparsable_timestamp_never_matches() {
        let rule = SuspicionRule::off_hours(0, 23);
        assert!(!rule.matches(&entry("1.1.1.1", "yesterday", "LOGIN", "SUCCESS")));
    }

    #[test]
    fn test_add_rule() {
        let mut c = SuspiciousActivityClassifier::default();
        c.add_rule(SuspicionRule::off_hours(0, 5));
        assert_eq!(c.rule_names(), vec!["failed-result", "off-hours"]);
    }
}
