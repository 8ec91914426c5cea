//! Timed runs and sweeps that produce experiment log files.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::experiment::{ExperimentFile, concurrent_message, sequential_message};
use crate::sort::{SortOptions, Sorter, SorterRegistry, is_sorted};
use crate::timer::{ScopedTimer, TimedRun};
use crate::workload::{checksum, generate, vector_length};

/// Sort the seeded vector of `10^exponent` integers once and time it.
pub fn run_once(sorter: &dyn Sorter, exponent: u32, seed: u64, opts: &SortOptions) -> Result<TimedRun> {
    let len = vector_length(exponent)?;
    run_len(sorter, len, seed, opts)
}

/// Like [`run_once`] with an explicit vector length.
pub fn run_len(sorter: &dyn Sorter, len: usize, seed: u64, opts: &SortOptions) -> Result<TimedRun> {
    if !sorter.is_sequential() && opts.workers == 0 {
        bail!("variant '{}' needs at least one worker", sorter.name());
    }
    let mut data = generate(len, seed);
    let before = checksum(&data);
    let message = if sorter.is_sequential() {
        sequential_message(sorter.name(), len, seed)
    } else {
        concurrent_message(sorter.name(), opts.workers, len, seed)
    };

    let timer = ScopedTimer::start(message);
    let outcome = sorter.sort(&mut data, opts);
    let run = timer.stop();
    outcome.with_context(|| format!("variant '{}' failed on seed {}", sorter.name(), seed))?;

    if !is_sorted(&data) {
        bail!("variant '{}' left the vector unsorted (seed {})", sorter.name(), seed);
    }
    if checksum(&data) != before {
        bail!("variant '{}' changed the vector contents (seed {})", sorter.name(), seed);
    }
    Ok(run)
}

/// One variant over a grid of seeds and worker counts.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub variant: String,
    /// File label, usually the variant name.
    pub label: String,
    pub exponent: u32,
    pub seeds: Vec<u64>,
    pub workers: Vec<usize>,
    pub blocks: Option<usize>,
    pub dir: PathBuf,
}

impl SweepPlan {
    pub fn new(variant: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        let variant = variant.into();
        Self {
            label: variant.clone(),
            variant,
            exponent: crate::config::DEFAULT_EXPONENT,
            seeds: crate::experiment::default_seeds(),
            workers: (1..=crate::config::DEFAULT_MAX_WORKERS).collect(),
            blocks: None,
            dir: dir.into(),
        }
    }

    pub fn file_for(&self, seed: u64) -> PathBuf {
        ExperimentFile::new(self.label.as_str(), self.exponent, seed).path_in(&self.dir)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    pub files: Vec<PathBuf>,
    pub runs: Vec<TimedRun>,
}

/// Run every `(seed, workers)` combination and append each timer line to
/// `exp-<label>-e<exp>-s<seed>`. Sequential variants run once per seed.
pub fn run_sweep(registry: &SorterRegistry, plan: &SweepPlan) -> Result<SweepOutcome> {
    let sorter = registry.get(&plan.variant)?;
    if plan.seeds.is_empty() {
        bail!("sweep of '{}' has no seeds", plan.variant);
    }
    let workers: Vec<usize> = if sorter.is_sequential() {
        vec![1]
    } else if plan.workers.is_empty() {
        bail!("sweep of '{}' has no worker counts", plan.variant);
    } else {
        plan.workers.clone()
    };
    fs::create_dir_all(&plan.dir).with_context(|| format!("create output directory {}", plan.dir.display()))?;

    let mut outcome = SweepOutcome::default();
    for &seed in &plan.seeds {
        let path = plan.file_for(seed);
        let mut sink = open_log(&path)?;
        for &nw in &workers {
            let mut opts = SortOptions::new(nw);
            opts.blocks = plan.blocks;
            let run = run_once(sorter, plan.exponent, seed, &opts)?;
            writeln!(sink, "{}", run.log_line()).with_context(|| format!("append to {}", path.display()))?;
            outcome.runs.push(run);
        }
        sink.flush().with_context(|| format!("flush {}", path.display()))?;
        outcome.files.push(path);
    }
    info!(
        variant = plan.variant.as_str(),
        files = outcome.files.len(),
        runs = outcome.runs.len(),
        "sweep finished"
    );
    Ok(outcome)
}

fn open_log(path: &Path) -> Result<BufWriter<fs::File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    Ok(BufWriter::new(file))
}
