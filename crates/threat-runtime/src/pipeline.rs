//! End-to-end ingestion run.
//!
//! Runs the three stages in order against an injected store and chart sink:
//!
//! 1. Threat feed: create table, ingest, insert, rank attackers, correlate
//!    the blacklist in memory and in storage.
//! 2. Chart datasets from the stored attacks.
//! 3. Activity log: classify, then write the suspicious entries and IPs.
//!
//! Any error stops the run; there is no partial report.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use threat_core::error::Result;
use threat_core::models::AttackerCount;
use threat_core::settings::PipelineConfig;
use threat_data::activity::ActivityLogAnalyzer;
use threat_data::aggregator::{ThreatAggregator, ThreatSummary};
use threat_data::blacklist::{Blacklist, BlacklistCorrelator};
use threat_data::classifier::{SuspicionRule, SuspiciousActivityClassifier};
use threat_data::threats::process_threats_file;
use tracing::info;

use crate::charts::ChartSink;
use crate::repository::AttacksRepository;
use crate::store::QueryStore;

// ── Public types ──────────────────────────────────────────────────────────────

/// Outcome of the threat-feed stage.
#[derive(Debug, Clone, Serialize)]
pub struct ThreatStageReport {
    pub records_ingested: usize,
    pub top_attackers: Vec<AttackerCount>,
    pub blacklist_size: usize,
    pub records_flagged: usize,
    pub summary: ThreatSummary,
}

/// Outcome of the activity-log stage.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityStageReport {
    pub suspicious_entries: usize,
    /// Distinct suspicious IPs, sorted.
    pub suspicious_ips: Vec<String>,
    pub suspicious_activity_file: PathBuf,
    pub suspicious_ips_file: PathBuf,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// RFC 3339 timestamp of when the run finished.
    pub generated_at: String,
    pub threats: ThreatStageReport,
    pub chart_files: Vec<PathBuf>,
    pub activity: ActivityStageReport,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct Pipeline<S, C> {
    config: PipelineConfig,
    repository: AttacksRepository<S>,
    charts: C,
}

impl<S: QueryStore, C: ChartSink> Pipeline<S, C> {
    pub fn new(config: PipelineConfig, store: S, charts: C) -> Self {
        Self {
            config,
            repository: AttacksRepository::new(store),
            charts,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn repository(&self) -> &AttacksRepository<S> {
        &self.repository
    }

    /// Run all three stages.
    pub fn run(&self) -> Result<PipelineReport> {
        let threats = self.run_threat_stage()?;

        let chart_files = if self.config.write_charts {
            self.run_chart_stage()?
        } else {
            info!("Chart data generation skipped");
            Vec::new()
        };

        let activity = self.run_activity_stage()?;

        Ok(PipelineReport {
            generated_at: Utc::now().to_rfc3339(),
            threats,
            chart_files,
            activity,
        })
    }

    /// Stage 1: ingest the threat feed and correlate it with the blacklist.
    pub fn run_threat_stage(&self) -> Result<ThreatStageReport> {
        info!("Processing threats file: {}", self.config.threats_file.display());
        self.repository.create_attacks_table()?;

        let mut records = process_threats_file(&self.config.threats_file)?;
        info!("Found {} valid threat entries", records.len());
        self.repository.insert_threats(&records)?;

        let top_attackers = self.repository.top_attacker_ips(self.config.top_limit)?;

        info!(
            "Updating investigation status based on blacklist: {}",
            self.config.blacklist_file.display()
        );
        let blacklist = Blacklist::load(&self.config.blacklist_file)?;
        let records_flagged = BlacklistCorrelator::update_investigated_status(&mut records, &blacklist);
        self.repository.update_investigated_status(&blacklist)?;

        Ok(ThreatStageReport {
            records_ingested: records.len(),
            top_attackers,
            blacklist_size: blacklist.len(),
            records_flagged,
            summary: ThreatAggregator::summarize(&records),
        })
    }

    /// Stage 2: hand the stored aggregations to the chart sink.
    pub fn run_chart_stage(&self) -> Result<Vec<PathBuf>> {
        let attack_types = self.repository.attack_type_counts()?;
        let countries = self.repository.country_distribution()?;
        let points = self.repository.duration_vs_data_leaked()?;

        Ok(vec![
            self.charts
                .bar_chart("attack_types", "Attack Types Distribution", &attack_types)?,
            self.charts.pie_chart(
                "country_distribution",
                "Attack Distribution by Country",
                &countries,
            )?,
            self.charts.scatter_plot(
                "duration_vs_data_leaked",
                "Attack Duration vs. Data Leaked",
                ("Duration (seconds)", "Data Leaked (MB)"),
                &points,
            )?,
        ])
    }

    /// Stage 3: classify the activity log and write both output files.
    pub fn run_activity_stage(&self) -> Result<ActivityStageReport> {
        let analyzer = ActivityLogAnalyzer::with_classifier(&self.config.log_file, self.classifier());
        info!(
            "Identifying suspicious activities in {} (rules: {})",
            analyzer.log_file().display(),
            analyzer.classifier().rule_names().join(", ")
        );

        let activity = analyzer.analyze_logs()?;
        let entries = activity.write_entries(&self.config.suspicious_activity_file)?;
        info!(
            "Saved {} suspicious activity entries to {}",
            entries,
            self.config.suspicious_activity_file.display()
        );
        let ips = activity.write_ips(&self.config.suspicious_ips_file)?;
        info!(
            "Saved {} unique suspicious IPs to {}",
            ips,
            self.config.suspicious_ips_file.display()
        );

        Ok(ActivityStageReport {
            suspicious_entries: entries,
            suspicious_ips: activity.sorted_ips().into_iter().map(String::from).collect(),
            suspicious_activity_file: self.config.suspicious_activity_file.clone(),
            suspicious_ips_file: self.config.suspicious_ips_file.clone(),
        })
    }

    fn classifier(&self) -> SuspiciousActivityClassifier {
        let classifier = SuspiciousActivityClassifier::default();
        match self.config.off_hours {
            Some((start, end)) => classifier.with_rule(SuspicionRule::off_hours(start, end)),
            None => classifier,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
