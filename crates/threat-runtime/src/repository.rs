//! Persistence of threat records in the `attacks` table.

use threat_core::error::{Result, ThreatError};
use threat_core::models::{AttackerCount, ThreatRecord};
use threat_data::blacklist::Blacklist;
use tracing::info;

use crate::store::{QueryStore, Row, SqlValue};

const CREATE_ATTACKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS attacks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    attack_type VARCHAR(50) NOT NULL,
    date DATE NOT NULL,
    attacker_ip VARCHAR(15) NOT NULL,
    country VARCHAR(50) NOT NULL,
    duration_sec INTEGER NOT NULL,
    data_leaked_mb INTEGER NOT NULL,
    is_investigated BOOLEAN DEFAULT FALSE
)
"#;

const INSERT_ATTACK: &str = r#"
INSERT INTO attacks (attack_type, date, attacker_ip, country, duration_sec, data_leaked_mb, is_investigated)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

const TOP_ATTACKER_IPS: &str = r#"
SELECT attacker_ip, COUNT(*) AS attack_count
FROM attacks
GROUP BY attacker_ip
ORDER BY attack_count DESC, attacker_ip ASC
LIMIT ?1
"#;

const MARK_INVESTIGATED: &str = r#"
UPDATE attacks
SET is_investigated = TRUE
WHERE attacker_ip = ?1
"#;

const ATTACK_TYPE_COUNTS: &str = r#"
SELECT attack_type, COUNT(*) AS count
FROM attacks
GROUP BY attack_type
ORDER BY count DESC, attack_type ASC
"#;

const COUNTRY_DISTRIBUTION: &str = r#"
SELECT country, COUNT(*) AS count
FROM attacks
GROUP BY country
ORDER BY count DESC, country ASC
"#;

const DURATION_VS_DATA_LEAKED: &str = r#"
SELECT duration_sec, data_leaked_mb
FROM attacks
ORDER BY id
"#;

/// Reads and writes the `attacks` table through an injected [`QueryStore`].
pub struct AttacksRepository<S> {
    store: S,
}

impl<S: QueryStore> AttacksRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the `attacks` table unless it already exists.
    pub fn create_attacks_table(&self) -> Result<()> {
        self.store.execute(CREATE_ATTACKS_TABLE, &[])?;
        info!("Attacks table created or already exists");
        Ok(())
    }

    /// Insert one row per record. Returns the number of rows inserted.
    pub fn insert_threats(&self, records: &[ThreatRecord]) -> Result<usize> {
        for record in records {
            let params = [
                SqlValue::from(record.attack_type.as_str()),
                SqlValue::from(record.date.as_str()),
                SqlValue::from(record.attacker_ip.as_str()),
                SqlValue::from(record.country.as_str()),
                SqlValue::from_u64(record.duration_sec)?,
                SqlValue::from_u64(record.data_leaked_mb)?,
                SqlValue::from(record.is_investigated),
            ];
            self.store.execute(INSERT_ATTACK, &params)?;
        }
        info!("Inserted {} threat records into the database", records.len());
        Ok(records.len())
    }

    /// The `limit` attacker IPs with the most recorded attacks.
    pub fn top_attacker_ips(&self, limit: u32) -> Result<Vec<AttackerCount>> {
        let rows = self
            .store
            .fetch(TOP_ATTACKER_IPS, &[SqlValue::Integer(i64::from(limit))])?;
        let ranked = rows
            .iter()
            .map(|row| {
                Ok(AttackerCount {
                    attacker_ip: text_column(row, "attacker_ip")?,
                    attack_count: count_column(row, "attack_count")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        info!("Retrieved top {} attacker IPs", limit);
        Ok(ranked)
    }

    /// Issue one update per blacklisted IP, in sorted order.
    ///
    /// Returns the number of IPs processed.
    pub fn update_investigated_status(&self, blacklist: &Blacklist) -> Result<usize> {
        let ips = blacklist.sorted();
        for ip in &ips {
            self.store.execute(MARK_INVESTIGATED, &[SqlValue::from(*ip)])?;
        }
        info!("Updated investigation status for {} IPs", ips.len());
        Ok(ips.len())
    }

    /// Attacks per attack type, most frequent first.
    pub fn attack_type_counts(&self) -> Result<Vec<(String, u64)>> {
        self.grouped_counts(ATTACK_TYPE_COUNTS, "attack_type")
    }

    /// Attacks per country, most frequent first.
    pub fn country_distribution(&self) -> Result<Vec<(String, u64)>> {
        self.grouped_counts(COUNTRY_DISTRIBUTION, "country")
    }

    /// `(duration_sec, data_leaked_mb)` for every stored attack.
    pub fn duration_vs_data_leaked(&self) -> Result<Vec<(u64, u64)>> {
        self.store
            .fetch(DURATION_VS_DATA_LEAKED, &[])?
            .iter()
            .map(|row| {
                Ok((
                    count_column(row, "duration_sec")?,
                    count_column(row, "data_leaked_mb")?,
                ))
            })
            .collect()
    }

    fn grouped_counts(&self, query: &str, key: &str) -> Result<Vec<(String, u64)>> {
        self.store
            .fetch(query, &[])?
            .iter()
            .map(|row| Ok((text_column(row, key)?, count_column(row, "count")?)))
            .collect()
    }
}

fn text_column(row: &Row, column: &str) -> Result<String> {
    row.get(column)
        .and_then(SqlValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| ThreatError::storage("fetch", format!("missing text column '{}'", column)))
}

fn count_column(row: &Row, column: &str) -> Result<u64> {
    row.get(column)
        .and_then(SqlValue::as_u64)
        .ok_or_else(|| {
            ThreatError::storage("fetch", format!("missing integer column '{}'", column))
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
