use serde::{Deserialize, Serialize};
use std::fmt;

/// Result value an activity-log line carries when an action failed.
pub const RESULT_FAILURE: &str = "FAILURE";

/// A single attacker incident parsed from the threat feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatRecord {
    /// Category of the attack, e.g. `"Ransomware"`.
    pub attack_type: String,
    /// Incident date as written in the feed (`YYYY-MM-DD`).
    pub date: String,
    /// Source address of the attacker.
    pub attacker_ip: String,
    /// Country the attack was attributed to.
    pub country: String,
    /// Attack duration normalised to seconds.
    pub duration_sec: u64,
    /// Megabytes exfiltrated during the attack.
    pub data_leaked_mb: u64,
    /// Set once the attacker IP has been matched against the blacklist.
    #[serde(default)]
    pub is_investigated: bool,
}

impl ThreatRecord {
    /// Flag the record as investigated.
    ///
    /// Returns `true` only on the transition from not-investigated.
    pub fn mark_investigated(&mut self) -> bool {
        if self.is_investigated {
            return false;
        }
        self.is_investigated = true;
        true
    }
}

/// One access/activity event from the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEntry {
    pub ip: String,
    /// Opaque timestamp text, kept exactly as it appeared in the log.
    pub timestamp: String,
    pub action: String,
    /// Outcome of the action; usually `SUCCESS` or `FAILURE` but any text is kept.
    pub result: String,
}

impl LogEntry {
    /// `true` when the entry recorded a failed action (exact, case-sensitive).
    pub fn is_failure(&self) -> bool {
        self.result == RESULT_FAILURE
    }
}

/// Renders the entry in the activity-log line format `ip, timestamp, action, result`.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.ip, self.timestamp, self.action, self.result
        )
    }
}

/// Number of attacks attributed to a single attacker IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerCount {
    pub attacker_ip: String,
    pub attack_count: u64,
}
