use std::path::Path;

use anyhow::{Result, anyhow};
use plotters::prelude::*;
use tracing::info;

use crate::report::ThroughputReport;

pub const IDEAL_SERIES_LABEL: &str = "nw / T_C^{nw=1}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self { width: 800, height: 600 }
    }
}

fn plot_err<E: std::fmt::Display>(err: E) -> anyhow::Error {
    anyhow!("plot rendering failed: {}", err)
}

/// Measured throughput and the linear-scaling curve against the worker count,
/// written as an SVG file.
pub fn render_throughput_svg(report: &ThroughputReport, path: &Path, style: PlotStyle) -> Result<()> {
    let measured: Vec<(f64, f64)> = report
        .analysis
        .points
        .iter()
        .filter_map(|p| p.throughput.map(|t| (p.workers as f64, t)))
        .collect();
    if measured.is_empty() {
        return Err(anyhow!(
            "experiment '{}' has no positive elapsed times to plot",
            report.label
        ));
    }
    let ideal: Vec<(f64, f64)> = report
        .analysis
        .points
        .iter()
        .filter_map(|p| p.ideal.map(|t| (p.workers as f64, t)))
        .collect();

    let (x_min, x_max) = measured
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    let (x_min, x_max) = if x_max > x_min { (x_min, x_max) } else { (x_min - 1.0, x_max + 1.0) };
    let y_max = measured
        .iter()
        .chain(ideal.iter())
        .map(|&(_, y)| y)
        .fold(0.0f64, f64::max)
        * 1.1;

    let root = SVGBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(report.title(), ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Number of Workers")
        .y_desc("Throughput")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.2e}", y))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(measured.iter().copied(), BLUE.stroke_width(2)))
        .map_err(plot_err)?
        .label(report.label.clone())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    chart
        .draw_series(measured.iter().map(|&point| Circle::new(point, 3, BLUE.filled())))
        .map_err(plot_err)?;

    if !ideal.is_empty() {
        chart
            .draw_series(LineSeries::new(ideal.iter().copied(), RED.stroke_width(2)))
            .map_err(plot_err)?
            .label(IDEAL_SERIES_LABEL)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    info!(path = %path.display(), points = measured.len(), "rendered throughput plot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ThroughputAnalysis;
    use crate::experiment::ConcurrentRecord;
    use crate::report::{ReportRequest, ThroughputReport};
    use chrono::Utc;
    use tempfile::tempdir;

    fn report(times: &[(u32, u64)], seq: Option<f64>) -> ThroughputReport {
        let records: Vec<ConcurrentRecord> = times
            .iter()
            .map(|&(workers, elapsed_usec)| ConcurrentRecord {
                workers,
                seed: 1,
                elapsed_usec,
            })
            .collect();
        let analysis = ThroughputAnalysis::from_records(&records, seq).unwrap();
        let request = ReportRequest {
            dir: Path::new("."),
            label: "barrier",
            baseline_label: None,
            exponent: 5,
            seeds: &[1],
        };
        ThroughputReport::new(&request, analysis, Utc::now())
    }

    #[test]
    fn writes_svg_with_axis_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("barrier.svg");
        let report = report(&[(1, 1000), (2, 550), (4, 300)], None);
        render_throughput_svg(&report, &path, PlotStyle::default()).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Number of Workers"));
        assert!(svg.contains("Throughput"));
        assert!(svg.contains("barrier OES on a vector of 10^5 integers"));
    }

    #[test]
    fn single_worker_count_still_renders() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.svg");
        let report = report(&[(4, 300)], Some(900.0));
        render_throughput_svg(&report, &path, PlotStyle { width: 400, height: 300 }).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn zero_times_are_rejected() {
        let dir = tempdir().unwrap();
        let report = report(&[(1, 0)], None);
        let err = render_throughput_svg(&report, &dir.path().join("zero.svg"), PlotStyle::default()).unwrap_err();
        assert!(err.to_string().contains("no positive elapsed times"));
    }
}
