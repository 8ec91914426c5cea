use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{ThroughputAnalysis, sequential_mean};
use crate::experiment::{load_concurrent, load_sequential};

/// Which log files to aggregate.
#[derive(Debug, Clone)]
pub struct ReportRequest<'a> {
    pub dir: &'a Path,
    pub label: &'a str,
    /// Sequential baseline label; `None` skips the baseline entirely.
    pub baseline_label: Option<&'a str>,
    pub exponent: u32,
    pub seeds: &'a [u64],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputReport {
    pub generated_at: String,
    pub label: String,
    pub baseline_label: Option<String>,
    pub exponent: u32,
    pub seeds: Vec<u64>,
    #[serde(flatten)]
    pub analysis: ThroughputAnalysis,
}

impl ThroughputReport {
    pub fn new(request: &ReportRequest<'_>, analysis: ThroughputAnalysis, timestamp: DateTime<Utc>) -> Self {
        Self {
            generated_at: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            label: request.label.to_string(),
            baseline_label: request.baseline_label.map(str::to_string),
            exponent: request.exponent,
            seeds: request.seeds.to_vec(),
            analysis,
        }
    }

    pub fn title(&self) -> String {
        format!("{} OES on a vector of 10^{} integers", self.label, self.exponent)
    }

    /// Fixed-width text table, one row per worker count.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title());
        match (&self.baseline_label, self.analysis.sequential_mean_usec) {
            (Some(label), Some(seq)) => {
                let _ = writeln!(out, "sequential baseline '{}': {:.1} usec", label, seq);
            }
            _ => {
                let _ = writeln!(out, "sequential baseline: none");
            }
        }
        let _ = writeln!(
            out,
            "{:>4} {:>7} {:>14} {:>12} {:>12} {:>8} {:>10}",
            "nw", "samples", "mean_usec", "throughput", "ideal", "speedup", "efficiency"
        );
        for point in &self.analysis.points {
            let _ = writeln!(
                out,
                "{:>4} {:>7} {:>14.1} {:>12} {:>12} {:>8} {:>10}",
                point.workers,
                point.samples,
                point.mean_usec,
                fmt_sci(point.throughput),
                fmt_sci(point.ideal),
                fmt_fixed(point.speedup),
                fmt_fixed(point.efficiency),
            );
        }
        out
    }
}

fn fmt_sci(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4e}", v)).unwrap_or_else(|| "-".to_string())
}

fn fmt_fixed(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "-".to_string())
}

fn fmt_csv(value: Option<f64>) -> String {
    value.map(|v| format!("{:.9e}", v)).unwrap_or_default()
}

/// Load the requested files and aggregate them.
pub fn build_report(request: &ReportRequest<'_>, timestamp: DateTime<Utc>) -> Result<ThroughputReport> {
    let sequential_mean_usec = match request.baseline_label {
        Some(label) => {
            let records = load_sequential(request.dir, label, request.exponent, request.seeds)?;
            Some(sequential_mean(&records)?)
        }
        None => None,
    };
    let concurrent = load_concurrent(request.dir, request.label, request.exponent, request.seeds)?;
    let analysis = ThroughputAnalysis::from_records(&concurrent, sequential_mean_usec)
        .with_context(|| format!("analyse experiment '{}'", request.label))?;
    info!(
        label = request.label,
        runs = concurrent.len(),
        groups = analysis.points.len(),
        "aggregated experiment"
    );
    Ok(ThroughputReport::new(request, analysis, timestamp))
}

pub fn write_json(path: &Path, report: &ThroughputReport) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).with_context(|| format!("write {}", path.display()))?;
    writer.flush().with_context(|| format!("flush {}", path.display()))
}

pub fn write_csv(path: &Path, report: &ThroughputReport) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path).with_context(|| format!("create {}", path.display()))?);
    writeln!(writer, "workers,samples,mean_usec,throughput,ideal,speedup,efficiency")?;
    for point in &report.analysis.points {
        writeln!(
            writer,
            "{},{},{:.3},{},{},{},{}",
            point.workers,
            point.samples,
            point.mean_usec,
            fmt_csv(point.throughput),
            fmt_csv(point.ideal),
            fmt_csv(point.speedup),
            fmt_csv(point.efficiency),
        )?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    fn fixture(dir: &Path) {
        for seed in 1..=2u64 {
            fs::write(
                dir.join(format!("exp-seq-e3-s{}", seed)),
                format!("seq 1000 {} computed in 800 usec\n", seed),
            )
            .unwrap();
            let mut lines = String::new();
            for (nw, usec) in [(1, 1000), (2, 500), (4, 400)] {
                lines.push_str(&format!("barrier {} 1000 {} computed in {} usec\n", nw, seed, usec));
            }
            fs::write(dir.join(format!("exp-barrier-e3-s{}", seed)), lines).unwrap();
        }
    }

    fn request(dir: &Path) -> ReportRequest<'_> {
        ReportRequest {
            dir,
            label: "barrier",
            baseline_label: Some("seq"),
            exponent: 3,
            seeds: &[1, 2],
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_build_report_from_files() {
        let dir = tempdir().unwrap();
        fixture(dir.path());
        let report = build_report(&request(dir.path()), fixed_time()).unwrap();
        assert_eq!(report.generated_at, "2024-05-01T12:00:00Z");
        assert_eq!(report.analysis.sequential_mean_usec, Some(800.0));
        assert_eq!(report.analysis.points.len(), 3);
        assert_eq!(report.analysis.points[1].samples, 2);
        assert_eq!(report.analysis.points[1].speedup, Some(1.6));
        assert_eq!(report.title(), "barrier OES on a vector of 10^3 integers");
    }

    #[test]
    fn test_report_without_baseline() {
        let dir = tempdir().unwrap();
        fixture(dir.path());
        let mut req = request(dir.path());
        req.baseline_label = None;
        let report = build_report(&req, fixed_time()).unwrap();
        assert_eq!(report.analysis.sequential_mean_usec, None);
        assert!(report.render_table().contains("sequential baseline: none"));
    }

    #[test]
    fn test_json_and_csv_outputs() {
        let dir = tempdir().unwrap();
        fixture(dir.path());
        let report = build_report(&request(dir.path()), fixed_time()).unwrap();

        let json_path = dir.path().join("report.json");
        write_json(&json_path, &report).unwrap();
        let parsed: ThroughputReport = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed, report);
        let raw = fs::read_to_string(&json_path).unwrap();
        assert!(raw.contains("\"sequential_mean_usec\": 800.0"));

        let csv_path = dir.path().join("report.csv");
        write_csv(&csv_path, &report).unwrap();
        let csv = fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "workers,samples,mean_usec,throughput,ideal,speedup,efficiency");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("1,2,1000.000,"));
    }

    #[test]
    fn test_table_lists_every_worker_count() {
        let dir = tempdir().unwrap();
        fixture(dir.path());
        let table = build_report(&request(dir.path()), fixed_time()).unwrap().render_table();
        assert!(table.contains("sequential baseline 'seq': 800.0 usec"));
        assert_eq!(table.lines().count(), 3 + 3);
    }
}
