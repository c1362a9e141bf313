use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::credentials::ConnectionSettings;
use crate::error::{Result, ThreatError};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Ingest threat and activity-log feeds, correlate them against a blacklist
/// and store the results
#[derive(Parser, Debug, Clone)]
#[command(
    name = "threat-ingest",
    about = "Ingest threat and activity-log feeds and correlate them against a blacklist",
    version
)]
pub struct Settings {
    /// Threat feed: attack_type,date,attacker_ip,country,HH:MM:SS,data_leaked_mb
    #[arg(long, default_value = "threats.txt")]
    pub threats_file: PathBuf,

    /// Blacklist: one IP address per line
    #[arg(long, default_value = "blacklist.txt")]
    pub blacklist_file: PathBuf,

    /// Activity log: ip, timestamp, action, result
    #[arg(long, default_value = "activity_log.txt")]
    pub log_file: PathBuf,

    /// Directory receiving the output files and chart data
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File name for suspicious activity entries (inside the output directory)
    #[arg(long, default_value = "suspicious_activity.txt")]
    pub suspicious_activity_file: String,

    /// File name for distinct suspicious IPs (inside the output directory)
    #[arg(long, default_value = "suspicious_ips.txt")]
    pub suspicious_ips_file: String,

    /// Database host (localhost or an IPv4 address)
    #[arg(long, default_value = "localhost")]
    pub db_host: String,

    /// Database name
    #[arg(long, default_value = "cyber_threats")]
    pub db_name: String,

    /// Database user
    #[arg(long, default_value = "root")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "THREAT_DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// Directory holding the database file (defaults to ~/.threat-ingest)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Number of top attacker IPs to report (1-1000)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub top_limit: u32,

    /// First hour (0-23) of the off-hours window; enables the off-hours rule
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23), requires = "off_hours_end")]
    pub off_hours_start: Option<u32>,

    /// Hour (0-23) at which the off-hours window closes
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23), requires = "off_hours_start")]
    pub off_hours_end: Option<u32>,

    /// Do not write chart data files
    #[arg(long)]
    pub skip_charts: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    pub report_file: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── PipelineConfig ─────────────────────────────────────────────────────────────

/// Explicit inputs for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub threats_file: PathBuf,
    pub blacklist_file: PathBuf,
    pub log_file: PathBuf,
    pub output_dir: PathBuf,
    pub suspicious_activity_file: PathBuf,
    pub suspicious_ips_file: PathBuf,
    pub top_limit: u32,
    /// `(start_hour, end_hour)` for the off-hours suspicion rule.
    #[serde(default)]
    pub off_hours: Option<(u32, u32)>,
    #[serde(default = "default_true")]
    pub write_charts: bool,
}

fn default_true() -> bool {
    true
}

impl PipelineConfig {
    /// Config with default file names rooted at `dir`; used by tests and embedders.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            threats_file: dir.join("threats.txt"),
            blacklist_file: dir.join("blacklist.txt"),
            log_file: dir.join("activity_log.txt"),
            output_dir: dir.to_path_buf(),
            suspicious_activity_file: dir.join("suspicious_activity.txt"),
            suspicious_ips_file: dir.join("suspicious_ips.txt"),
            top_limit: 10,
            off_hours: None,
            write_charts: true,
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Effective log level; `--debug` wins over `--log-level`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    /// Build the explicit pipeline configuration from CLI input.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let off_hours = match (self.off_hours_start, self.off_hours_end) {
            (Some(start), Some(end)) if start == end => {
                return Err(ThreatError::Config(format!(
                    "off-hours window {}-{} is empty",
                    start, end
                )));
            }
            (Some(start), Some(end)) => Some((start, end)),
            (None, None) => None,
            _ => {
                return Err(ThreatError::Config(
                    "--off-hours-start and --off-hours-end must be given together".to_string(),
                ));
            }
        };

        Ok(PipelineConfig {
            threats_file: self.threats_file.clone(),
            blacklist_file: self.blacklist_file.clone(),
            log_file: self.log_file.clone(),
            output_dir: self.output_dir.clone(),
            suspicious_activity_file: self.output_dir.join(&self.suspicious_activity_file),
            suspicious_ips_file: self.output_dir.join(&self.suspicious_ips_file),
            top_limit: self.top_limit,
            off_hours,
            write_charts: !self.skip_charts,
        })
    }

    /// Validated connection credentials.
    pub fn connection_settings(&self) -> Result<ConnectionSettings> {
        ConnectionSettings::new(
            self.db_host.clone(),
            self.db_name.clone(),
            self.db_user.clone(),
            self.db_password.clone(),
        )
    }

    /// Database directory: `--data-dir` when given, otherwise `~/.threat-ingest`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".threat-ingest")
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
