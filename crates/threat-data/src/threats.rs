//! Threat feed ingestion.
//!
//! Each line is `attack_type,date,attacker_ip,country,HH:MM:SS,data_leaked_mb`.
//! Lines with the wrong field count are logged and skipped. A line with the
//! right shape but an unparsable duration or leaked-MB value aborts the whole
//! file.
//!
//! TODO: content errors could be skipped per line like shape errors once
//! callers no longer depend on a bad value failing the batch.

use std::path::Path;

use threat_core::duration::parse_duration_to_seconds;
use threat_core::error::{Result, ThreatError};
use threat_core::models::ThreatRecord;
use threat_core::tokenizer::{LineTokenizer, Tokens};
use tracing::{debug, warn};

use crate::reader::feed_lines;

/// Number of comma-delimited fields in a threat line.
pub const THREAT_FIELD_COUNT: usize = 6;

const TOKENIZER: LineTokenizer = LineTokenizer::new(THREAT_FIELD_COUNT);

/// Shape check only: `true` iff the line has exactly six fields.
pub fn validate_threat_format(line: &str) -> bool {
    TOKENIZER.has_expected_shape(line)
}

/// Build a record from six already-split fields.
///
/// Fails on a malformed duration or a non-integer leaked-MB value. Text
/// fields are taken as-is, so an empty attack type or country is kept.
pub fn threat_from_fields(fields: &[&str]) -> Result<ThreatRecord> {
    let [attack_type, date, attacker_ip, country, duration, data_leaked_mb] = fields else {
        return Err(ThreatError::FieldCount {
            expected: THREAT_FIELD_COUNT,
            found: fields.len(),
        });
    };

    let duration_sec = parse_duration_to_seconds(duration)?;
    let data_leaked_mb = data_leaked_mb
        .parse::<u64>()
        .map_err(|_| ThreatError::DataLeakedFormat(data_leaked_mb.to_string()))?;

    Ok(ThreatRecord {
        attack_type: attack_type.to_string(),
        date: date.to_string(),
        attacker_ip: attacker_ip.to_string(),
        country: country.to_string(),
        duration_sec,
        data_leaked_mb,
        is_investigated: false,
    })
}

/// Parse in-memory threat lines, in order.
///
/// Blank lines are ignored and shape errors are skipped with a warning;
/// content errors are returned immediately.
pub fn process_threat_lines<I, S>(lines: I) -> Result<Vec<ThreatRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    for line in lines {
        if let Some(record) = process_threat_line(line.as_ref())? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Read the threat feed at `path` and return every valid record in file order.
pub fn process_threats_file(path: &Path) -> Result<Vec<ThreatRecord>> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for line in feed_lines(path)? {
        let (line_no, line) = line?;
        match process_threat_line(&line)? {
            Some(record) => records.push(record),
            None if !line.trim().is_empty() => {
                debug!("{}:{} skipped", path.display(), line_no);
                skipped += 1;
            }
            None => {}
        }
    }

    debug!(
        "File {}: {} valid, {} skipped",
        path.display(),
        records.len(),
        skipped
    );

    Ok(records)
}

fn process_threat_line(line: &str) -> Result<Option<ThreatRecord>> {
    match TOKENIZER.tokenize(line) {
        Tokens::Blank => Ok(None),
        Tokens::Mismatch { .. } => {
            warn!("Invalid format in line: {}", line.trim());
            Ok(None)
        }
        Tokens::Fields(fields) => threat_from_fields(&fields).map(Some),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_feed(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join("threats.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_validate_threat_format() {
        assert!(validate_threat_format(
            "Ransomware,2025-05-01,192.168.1.1,USA,01:30:00,500"
        ));
        assert!(!validate_threat_format("Ransomware,2025-05-01,192.168.1.1,USA,01:30:00"));
        assert!(!validate_threat_format(
            "Ransomware,2025-05-01,192.168.1.1,USA,01:30:00,500,extra"
        ));
    }

    #[test]
    fn test_process_threats_file_valid_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_feed(
            dir.path(),
            &[
                "Ransomware,2025-05-01,192.168.1.1,USA,01:30:00,500",
                "Phishing,2025-05-02,10.0.0.1,Russia,00:45:30,200",
            ],
        );

        let records = process_threats_file(&path).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].attack_type, "Ransomware");
        assert_eq!(records[0].date, "2025-05-01");
        assert_eq!(records[0].attacker_ip, "192.168.1.1");
        assert_eq!(records[0].country, "USA");
        assert_eq!(records[0].duration_sec, 5400);
        assert_eq!(records[0].data_leaked_mb, 500);
        assert!(!records[0].is_investigated);

        assert_eq!(records[1].duration_sec, 2730);
        assert_eq!(records[1].data_leaked_mb, 200);
    }

    #[test]
    fn test_process_threats_file_skips_shape_errors_and_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_feed(
            dir.path(),
            &[
                "Ransomware,2025-05-01,192.168.1.1,USA,01:30:00,500",
                "InvalidLine,missing,fields",
                "",
                "   ",
                "Phishing,2025-05-02,10.0.0.1,Russia,00:45:30,200,extra",
                "DDoS,2025-05-03,172.16.0.1,China,00:00:59,0",
            ],
        );

        let records = process_threats_file(&path).unwrap();
        let ips: Vec<&str> = records.iter().map(|r| r.attacker_ip.as_str()).collect();
        assert_eq!(ips, vec!["192.168.1.1", "172.16.0.1"]);
        assert_eq!(records[1].duration_sec, 59);
    }

    #[test]
    fn test_process_threats_file_trims_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_feed(
            dir.path(),
            &["  Malware , 2025-05-04 ,10.1.1.1, Germany , 02:00:00 , 42  "],
        );

        let records = process_threats_file(&path).unwrap();
        assert_eq!(records[0].attack_type, "Malware");
        assert_eq!(records[0].country, "Germany");
        assert_eq!(records[0].duration_sec, 7200);
        assert_eq!(records[0].data_leaked_mb, 42);
    }

    #[test]
    fn test_process_threats_file_bad_duration_aborts() {
        let dir = TempDir::new().unwrap();
        let path = write_feed(
            dir.path(),
            &[
                "Ransomware,2025-05-01,192.168.1.1,USA,01:30:00,500",
                "Phishing,2025-05-02,10.0.0.1,Russia,01:30,200",
                "DDoS,2025-05-03,172.16.0.1,China,00:00:59,0",
            ],
        );

        let err = process_threats_file(&path).unwrap_err();
        assert!(matches!(err, ThreatError::DurationFormat(ref d) if d == "01:30"));
    }

    #[test]
    fn test_process_threats_file_bad_data_leaked_aborts() {
        let dir = TempDir::new().unwrap();
        let path = write_feed(
            dir.path(),
            &["Ransomware,2025-05-01,192.168.1.1,USA,01:30:00,lots"],
        );

        let err = process_threats_file(&path).unwrap_err();
        assert!(matches!(err, ThreatError::DataLeakedFormat(ref v) if v == "lots"));
    }

    #[test]
    fn test_process_threats_file_missing_file() {
        let err = process_threats_file(Path::new("/tmp/does-not-exist-threats-xyz.txt"))
            .unwrap_err();
        assert!(matches!(err, ThreatError::FileRead { .. }));
    }

    #[test]
    fn test_process_threat_lines_in_memory() {
        let records = process_threat_lines([
            "Spyware,2025-06-01,8.8.8.8,Brazil,10:00:00,1",
            "bad",
        ])
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration_sec, 36_000);
    }

    #[test]
    fn test_threat_from_fields_wrong_count() {
        let err = threat_from_fields(&["a", "b"]).unwrap_err();
        assert!(matches!(
            err,
            ThreatError::FieldCount {
                expected: 6,
                found: 2
            }
        ));
    }

    #[test]
    fn test_empty_text_fields_are_kept() {
        let records = process_threat_lines([",2025-05-01,1.1.1.1,,01:00:00,5"]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attack_type, "");
        assert_eq!(records[0].country, "");
        assert_eq!(records[0].attacker_ip, "1.1.1.1");
        assert_eq!(records[0].duration_sec, 3600);
    }
}
