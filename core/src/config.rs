//! Optional TOML configuration for sweeps, summaries and plots.
//!
//! ```toml
//! [experiment]
//! dir = "logs"
//! exponent = 5
//! seeds = "1..=10"
//! workers = [1, 2, 4, 8]
//! baseline_label = "seq"
//!
//! [plot]
//! output = "barrier.svg"
//! width = 1024
//! height = 768
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tracing::debug;

use crate::experiment::{DEFAULT_BASELINE_LABEL, default_seeds};
use crate::plot::PlotStyle;

pub const DEFAULT_EXPONENT: u32 = 5;
pub const DEFAULT_MAX_WORKERS: usize = 8;
/// Largest number of values a single `a..=b` item may expand to.
pub const MAX_COUNT_SPAN: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub dir: PathBuf,
    pub exponent: u32,
    pub seeds: Vec<u64>,
    pub workers: Vec<usize>,
    pub baseline_label: String,
    /// `None` writes `<label>.svg` in the working directory.
    pub plot_output: Option<PathBuf>,
    pub plot: PlotStyle,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            exponent: DEFAULT_EXPONENT,
            seeds: default_seeds(),
            workers: (1..=DEFAULT_MAX_WORKERS).collect(),
            baseline_label: DEFAULT_BASELINE_LABEL.to_string(),
            plot_output: None,
            plot: PlotStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    experiment: ExperimentSection,
    #[serde(default)]
    plot: PlotSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ExperimentSection {
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    exponent: Option<u32>,
    #[serde(default)]
    seeds: Option<CountSpec>,
    #[serde(default)]
    workers: Option<CountSpec>,
    #[serde(default)]
    baseline_label: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PlotSection {
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

/// Either `[1, 2, 4]` or a range string such as `"1..=8"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CountSpec {
    List(Vec<u64>),
    Text(String),
}

impl CountSpec {
    fn resolve(&self) -> Result<Vec<u64>> {
        match self {
            CountSpec::List(values) => {
                if values.is_empty() {
                    bail!("empty list");
                }
                Ok(values.iter().copied().collect::<BTreeSet<_>>().into_iter().collect())
            }
            CountSpec::Text(text) => parse_count_list(text),
        }
    }
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let config = Self::from_toml_str(&text).with_context(|| format!("parse config {}", path.display()))?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut config = Self::default();
        config.apply(file)?;
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) -> Result<()> {
        let exp = file.experiment;
        if let Some(dir) = exp.dir {
            self.dir = dir;
        }
        if let Some(v) = exp.exponent.filter(|v| *v > 0) {
            self.exponent = v;
        }
        if let Some(spec) = exp.seeds {
            self.seeds = spec.resolve().context("experiment.seeds")?;
        }
        if let Some(spec) = exp.workers {
            self.workers = worker_counts(spec.resolve().context("experiment.workers")?)?;
        }
        if let Some(label) = exp.baseline_label.filter(|l| !l.trim().is_empty()) {
            self.baseline_label = label;
        }

        let plot = file.plot;
        if let Some(output) = plot.output {
            self.plot_output = Some(output);
        }
        if let Some(v) = plot.width.filter(|v| *v > 0) {
            self.plot.width = v;
        }
        if let Some(v) = plot.height.filter(|v| *v > 0) {
            self.plot.height = v;
        }
        Ok(())
    }

    pub fn plot_output_for(&self, label: &str) -> PathBuf {
        self.plot_output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.svg", label)))
    }
}

/// Parse `"1..=8"`, `"1..8"`, `"1-8"`, `"1,2,4"` or a mix such as `"1,4..=6"`.
/// The result is sorted and free of duplicates.
pub fn parse_count_list(spec: &str) -> Result<Vec<u64>> {
    let mut values = BTreeSet::new();
    for item in spec.split(',').map(str::trim) {
        if item.is_empty() {
            continue;
        }
        let (lo, hi) = if let Some((a, b)) = item.split_once("..=") {
            (parse_count(a)?, parse_count(b)?)
        } else if let Some((a, b)) = item.split_once("..") {
            let hi = parse_count(b)?;
            if hi == 0 {
                bail!("empty range '{}'", item);
            }
            (parse_count(a)?, hi - 1)
        } else if let Some((a, b)) = item.split_once('-') {
            (parse_count(a)?, parse_count(b)?)
        } else {
            let v = parse_count(item)?;
            (v, v)
        };
        if lo > hi {
            bail!("empty range '{}'", item);
        }
        if hi - lo >= MAX_COUNT_SPAN {
            bail!("range '{}' is too large (at most {} values)", item, MAX_COUNT_SPAN);
        }
        values.extend(lo..=hi);
        if values.len() as u64 > MAX_COUNT_SPAN {
            bail!("'{}' lists more than {} values", spec, MAX_COUNT_SPAN);
        }
    }
    if values.is_empty() {
        bail!("no values in '{}'", spec);
    }
    Ok(values.into_iter().collect())
}

fn parse_count(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| anyhow!("expected a non-negative integer, found '{}'", raw.trim()))
}

/// Worker counts must be positive.
pub fn worker_counts(values: Vec<u64>) -> Result<Vec<usize>> {
    values
        .into_iter()
        .map(|v| match usize::try_from(v) {
            Ok(0) => Err(anyhow!("worker count must be at least 1")),
            Ok(n) => Ok(n),
            Err(_) => Err(anyhow!("worker count {} is too large", v)),
        })
        .collect()
}
