//! Chart datasets for an external plotting tool.
//!
//! Rendering is not done here: a [`ChartSink`] receives already-aggregated
//! data and hands it on. [`JsonChartSink`] writes one JSON document per chart.

use std::path::{Path, PathBuf};

use serde::Serialize;
use threat_core::error::{Result, ThreatError};
use tracing::info;

/// Receiver of aggregated chart data.
pub trait ChartSink {
    /// Categorical counts drawn as bars.
    fn bar_chart(&self, name: &str, title: &str, data: &[(String, u64)]) -> Result<PathBuf>;

    /// Categorical counts drawn as pie slices.
    fn pie_chart(&self, name: &str, title: &str, data: &[(String, u64)]) -> Result<PathBuf>;

    /// `(x, y)` points with axis labels.
    fn scatter_plot(
        &self,
        name: &str,
        title: &str,
        axes: (&str, &str),
        points: &[(u64, u64)],
    ) -> Result<PathBuf>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum ChartKind {
    Bar,
    Pie,
    Scatter,
}

#[derive(Debug, Serialize)]
struct Slice<'a> {
    label: &'a str,
    value: u64,
}

#[derive(Debug, Serialize)]
struct ChartDocument<'a> {
    kind: ChartKind,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    x_label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y_label: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    categories: Vec<Slice<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    points: Option<&'a [(u64, u64)]>,
}

/// Writes `<output_dir>/<name>.json` for every chart.
#[derive(Debug, Clone)]
pub struct JsonChartSink {
    output_dir: PathBuf,
}

impl JsonChartSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write(&self, name: &str, doc: &ChartDocument<'_>) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.json", name));
        let json = serde_json::to_string_pretty(doc)?;
        std::fs::write(&path, json).map_err(|source| ThreatError::FileWrite {
            path: path.clone(),
            source,
        })?;
        info!("{} chart data saved to {}", doc.title, path.display());
        Ok(path)
    }

    fn categorical<'a>(kind: ChartKind, title: &'a str, data: &'a [(String, u64)]) -> ChartDocument<'a> {
        ChartDocument {
            kind,
            title,
            x_label: None,
            y_label: None,
            categories: data
                .iter()
                .map(|(label, value)| Slice {
                    label: label.as_str(),
                    value: *value,
                })
                .collect(),
            points: None,
        }
    }
}

impl ChartSink for JsonChartSink {
    fn bar_chart(&self, name: &str, title: &str, data: &[(String, u64)]) -> Result<PathBuf> {
        self.write(name, &Self::categorical(ChartKind::Bar, title, data))
    }

    fn pie_chart(&self, name: &str, title: &str, data: &[(String, u64)]) -> Result<PathBuf> {
        self.write(name, &Self::categorical(ChartKind::Pie, title, data))
    }

    fn scatter_plot(
        &self,
        name: &str,
        title: &str,
        axes: (&str, &str),
        points: &[(u64, u64)],
    ) -> Result<PathBuf> {
        let doc = ChartDocument {
            kind: ChartKind::Scatter,
            title,
            x_label: Some(axes.0),
            y_label: Some(axes.1),
            categories: Vec::new(),
            points: Some(points),
        };
        self.write(name, &doc)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_bar_chart_document() {
        let dir = TempDir::new().unwrap();
        let sink = JsonChartSink::new(dir.path());
        let data = vec![("Ransomware".to_string(), 10), ("Phishing".to_string(), 7)];

        let path = sink
            .bar_chart("attack_types", "Attack Types Distribution", &data)
            .unwrap();

        assert_eq!(path, dir.path().join("attack_types.json"));
        let json = read_json(&path);
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["title"], "Attack Types Distribution");
        assert_eq!(json["categories"][0]["label"], "Ransomware");
        assert_eq!(json["categories"][1]["value"], 7);
        assert!(json.get("points").is_none());
    }

    #[test]
    fn test_pie_chart_document() {
        let dir = TempDir::new().unwrap();
        let sink = JsonChartSink::new(dir.path());
        let path = sink
            .pie_chart(
                "country_distribution",
                "Attack Distribution by Country",
                &[("USA".to_string(), 15)],
            )
            .unwrap();
        assert_eq!(read_json(&path)["kind"], "pie");
    }

    #[test]
    fn test_scatter_plot_document() {
        let dir = TempDir::new().unwrap();
        let sink = JsonChartSink::new(dir.path());
        let path = sink
            .scatter_plot(
                "duration_vs_data_leaked",
                "Attack Duration vs. Data Leaked",
                ("Duration (seconds)", "Data Leaked (MB)"),
                &[(3600, 500), (7200, 1000)],
            )
            .unwrap();

        let json = read_json(&path);
        assert_eq!(json["kind"], "scatter");
        assert_eq!(json["x_label"], "Duration (seconds)");
        assert_eq!(json["points"][1][0], 7200);
        assert!(json.get("categories").is_none());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let sink = JsonChartSink::new("/tmp/no-such-chart-dir-xyz");
        let err = sink.bar_chart("x", "X", &[]).unwrap_err();
        assert!(matches!(err, ThreatError::FileWrite { .. }));
    }
}
