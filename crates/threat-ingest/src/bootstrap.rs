use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Create the output and database directories (and any missing parents).
pub fn ensure_directories(output_dir: &Path, data_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)?;
    std::fs::create_dir_all(data_dir)?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name onto a `tracing` filter directive.
///
/// Unknown names are passed through unchanged so that full `EnvFilter`
/// directives such as `threat_data=debug` keep working.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber, writing to stderr.
///
/// Falls back to `"info"` if the level cannot be parsed as a filter.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");
        let out = tmp.path().join("out").join("charts");
        let data = tmp.path().join("data");

        ensure_directories(&out, &data).expect("ensure_directories should succeed");

        assert!(out.is_dir(), "output dir must exist");
        assert!(data.is_dir(), "data dir must exist");
    }

    #[test]
    fn test_ensure_directories_existing_is_ok() {
        let tmp = TempDir::new().expect("tempdir");
        ensure_directories(tmp.path(), tmp.path()).expect("existing dirs are fine");
    }

    #[test]
    fn test_filter_directive_maps_level_names() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("critical"), "error");
        assert_eq!(filter_directive("info"), "info");
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("ERROR"), "error");
        assert_eq!(filter_directive("threat_data=trace"), "threat_data=trace");
    }

    #[test]
    fn test_filter_directive_critical_is_quietest() {
        let critical = EnvFilter::try_new(filter_directive("CRITICAL")).expect("valid directive");
        assert_eq!(critical.max_level_hint(), Some(tracing::level_filters::LevelFilter::ERROR));
        assert_ne!(filter_directive("CRITICAL"), filter_directive("DEBUG"));
    }
}
