//! Blacklist loading and correlation against ingested threat records.

use std::collections::HashSet;
use std::path::Path;

use threat_core::error::Result;
use threat_core::models::ThreatRecord;
use tracing::{debug, info};

use crate::reader::feed_lines;

/// Set of IP addresses flagged for investigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    ips: HashSet<String>,
}

impl Blacklist {
    /// Build from raw lines; entries are trimmed and blank lines dropped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ips = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|ip| !ip.is_empty())
            .collect();
        Self { ips }
    }

    /// Read the blacklist file at `path`, one IP per line.
    pub fn load(path: &Path) -> Result<Self> {
        let mut lines = Vec::new();
        for line in feed_lines(path)? {
            let (_, line) = line?;
            lines.push(line);
        }
        let blacklist = Self::from_lines(&lines);
        debug!(
            "Blacklist {}: {} lines, {} distinct IPs",
            path.display(),
            lines.len(),
            blacklist.len()
        );
        Ok(blacklist)
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.ips.contains(ip)
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ips.iter().map(String::as_str)
    }

    /// IPs in ascending order, for deterministic output.
    pub fn sorted(&self) -> Vec<&str> {
        let mut ips: Vec<&str> = self.iter().collect();
        ips.sort_unstable();
        ips
    }
}

// ── BlacklistCorrelator ───────────────────────────────────────────────────────

/// Propagates blacklist membership onto threat records.
pub struct BlacklistCorrelator;

impl BlacklistCorrelator {
    /// Mark every record whose attacker IP is blacklisted as investigated.
    ///
    /// Blacklisted IPs without a matching record are ignored. Returns the
    /// number of records that were newly flagged.
    pub fn update_investigated_status(records: &mut [ThreatRecord], blacklist: &Blacklist) -> usize {
        let flipped = records
            .iter_mut()
            .filter(|record| blacklist.contains(&record.attacker_ip))
            .map(ThreatRecord::mark_investigated)
            .filter(|flipped| *flipped)
            .count();

        info!(
            "Updated investigation status for {} records from {} blacklisted IPs",
            flipped,
            blacklist.len()
        );
        flipped
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
