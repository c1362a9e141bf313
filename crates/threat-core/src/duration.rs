//! `HH:MM:SS` duration normalisation.

use crate::error::{Result, ThreatError};

/// Convert an `H:MM:SS` duration into a total number of seconds.
///
/// Exactly three colon-separated non-negative integers are required. Hours
/// are unbounded and minutes/seconds are not range-checked, so `"0:90:00"`
/// yields 5400.
///
/// # Examples
///
/// ```
/// use threat_core::duration::parse_duration_to_seconds;
///
/// assert_eq!(parse_duration_to_seconds("01:30:00").unwrap(), 5400);
/// assert_eq!(parse_duration_to_seconds("00:45:30").unwrap(), 2730);
/// assert!(parse_duration_to_seconds("01:30").is_err());
/// ```
pub fn parse_duration_to_seconds(duration: &str) -> Result<u64> {
    let parts: Vec<&str> = duration.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(ThreatError::DurationFormat(duration.to_string()));
    };

    let component = |raw: &str| -> Result<u64> {
        raw.trim()
            .parse::<u64>()
            .map_err(|_| ThreatError::DurationFormat(duration.to_string()))
    };

    let (h, m, s) = (component(*hours)?, component(*minutes)?, component(*seconds)?);

    h.checked_mul(3600)
        .and_then(|total| total.checked_add(m.checked_mul(60)?))
        .and_then(|total| total.checked_add(s))
        .ok_or_else(|| ThreatError::DurationFormat(duration.to_string()))
}

/// Format a number of seconds as `HH:MM:SS`.
///
/// Hours are padded to two digits and grow beyond that as needed.
///
/// # Examples
///
/// ```
/// use threat_core::duration::format_seconds;
///
/// assert_eq!(format_seconds(5400), "01:30:00");
/// assert_eq!(format_seconds(59), "00:00:59");
/// assert_eq!(format_seconds(360_000), "100:00:00");
/// ```
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
