//! In-memory aggregation over ingested threat records.
//!
//! Produces the per-IP ranking and category breakdowns for the run summary
//! without a round trip to storage.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use threat_core::models::{AttackerCount, ThreatRecord};

// ── ThreatTotals ──────────────────────────────────────────────────────────────

/// Totals accumulated across a batch of threat records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThreatTotals {
    pub count: u64,
    pub duration_sec: u64,
    pub data_leaked_mb: u64,
    pub investigated: u64,
}

impl ThreatTotals {
    /// Add a single record to the running totals.
    pub fn add_record(&mut self, record: &ThreatRecord) {
        self.count += 1;
        self.duration_sec = self.duration_sec.saturating_add(record.duration_sec);
        self.data_leaked_mb = self.data_leaked_mb.saturating_add(record.data_leaked_mb);
        if record.is_investigated {
            self.investigated += 1;
        }
    }
}

// ── ThreatSummary ─────────────────────────────────────────────────────────────

/// Breakdown of one ingested batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThreatSummary {
    pub totals: ThreatTotals,
    /// Attacks per attacker IP, most frequent first.
    pub attackers: Vec<AttackerCount>,
    /// Attacks per attack type, keyed by type.
    pub attack_types: BTreeMap<String, u64>,
    /// Attacks per country, keyed by country.
    pub countries: BTreeMap<String, u64>,
}

// ── ThreatAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that groups threat records.
pub struct ThreatAggregator;

impl ThreatAggregator {
    /// Full summary of `records`.
    pub fn summarize(records: &[ThreatRecord]) -> ThreatSummary {
        let mut totals = ThreatTotals::default();
        for record in records {
            totals.add_record(record);
        }

        ThreatSummary {
            totals,
            attackers: Self::rank_attackers(records),
            attack_types: Self::count_by(records, |r| &r.attack_type),
            countries: Self::count_by(records, |r| &r.country),
        }
    }

    /// Attack count per attacker IP, ordered by count (descending) then IP.
    pub fn rank_attackers(records: &[ThreatRecord]) -> Vec<AttackerCount> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for record in records {
            *counts.entry(record.attacker_ip.as_str()).or_default() += 1;
        }

        let mut ranked: Vec<AttackerCount> = counts
            .into_iter()
            .map(|(ip, count)| AttackerCount {
                attacker_ip: ip.to_string(),
                attack_count: count,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.attack_count
                .cmp(&a.attack_count)
                .then_with(|| a.attacker_ip.cmp(&b.attacker_ip))
        });
        ranked
    }

    /// The `limit` most frequent attacker IPs.
    pub fn top_attacker_ips(records: &[ThreatRecord], limit: usize) -> Vec<AttackerCount> {
        let mut ranked = Self::rank_attackers(records);
        ranked.truncate(limit);
        ranked
    }

    /// `(duration_sec, data_leaked_mb)` per record, in input order.
    pub fn duration_vs_data_leaked(records: &[ThreatRecord]) -> Vec<(u64, u64)> {
        records
            .iter()
            .map(|r| (r.duration_sec, r.data_leaked_mb))
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn count_by(
        records: &[ThreatRecord],
        key_fn: impl Fn(&ThreatRecord) -> &String,
    ) -> BTreeMap<String, u64> {
        let mut map: BTreeMap<String, u64> = BTreeMap::new();
        for record in records {
            *map.entry(key_fn(record).clone()).or_default() += 1;
        }
        map
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn record(attack_type: &str, ip: &str, country: &str, dur: u64, mb: u64) -> ThreatRecord {
        ThreatRecord {
            attack_type: attack_type.to_string(),
            date: "2025-05-01".to_string(),
            attacker_ip: ip.to_string(),
            country: country.to_string(),
            duration_sec: dur,
            data_leaked_mb: mb,
            is_investigated: false,
        }
    }

    fn sample() -> Vec<ThreatRecord> {
        vec![
            record("Ransomware", "10.0.0.1", "USA", 3600, 500),
            record("Phishing", "10.0.0.2", "Russia", 1800, 100),
            record("Ransomware", "10.0.0.1", "USA", 60, 10),
            record("DDoS", "10.0.0.3", "China", 120, 0),
            record("Phishing", "10.0.0.2", "USA", 30, 5),
            record("Phishing", "10.0.0.1", "Russia", 30, 5),
        ]
    }

    #[test]
    fn test_rank_attackers_orders_by_count_then_ip() {
        let ranked = ThreatAggregator::rank_attackers(&sample());
        let pairs: Vec<(&str, u64)> = ranked
            .iter()
            .map(|a| (a.attacker_ip.as_str(), a.attack_count))
            .collect();
        assert_eq!(
            pairs,
            vec![("10.0.0.1", 3), ("10.0.0.2", 2), ("10.0.0.3", 1)]
        );
    }

    #[test]
    fn test_top_attacker_ips_truncates() {
        let top = ThreatAggregator::top_attacker_ips(&sample(), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].attacker_ip, "10.0.0.2");
    }

    #[test]
    fn test_rank_attackers_tie_broken_by_ip() {
        let records = vec![
            record("X", "10.0.0.9", "USA", 1, 1),
            record("X", "10.0.0.4", "USA", 1, 1),
        ];
        let ranked = ThreatAggregator::rank_attackers(&records);
        assert_eq!(ranked[0].attacker_ip, "10.0.0.4");
    }

    #[test]
    fn test_summarize_counts_and_totals() {
        let mut records = sample();
        records[3].is_investigated = true;

        let summary = ThreatAggregator::summarize(&records);
        assert_eq!(summary.totals.count, 6);
        assert_eq!(summary.totals.duration_sec, 5640);
        assert_eq!(summary.totals.data_leaked_mb, 620);
        assert_eq!(summary.totals.investigated, 1);
        assert_eq!(summary.attack_types.get("Phishing"), Some(&3));
        assert_eq!(summary.attack_types.get("Ransomware"), Some(&2));
        assert_eq!(summary.countries.get("USA"), Some(&3));
        assert_eq!(summary.countries.get("China"), Some(&1));
    }

    #[test]
    fn test_summarize_empty() {
        let summary = ThreatAggregator::summarize(&[]);
        assert_eq!(summary.totals, ThreatTotals::default());
        assert!(summary.attackers.is_empty());
        assert!(summary.attack_types.is_empty());
    }

    #[test]
    fn test_duration_vs_data_leaked_in_order() {
        let points = ThreatAggregator::duration_vs_data_leaked(&sample()[..2]);
        assert_eq!(points, vec![(3600, 500), (1800, 100)]);
    }
}
