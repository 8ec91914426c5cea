use std::path::{Component, Path, PathBuf};
use std::sync::Once;

static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "oesbench::timer=info,oesbench_core=info,oesbench=info";

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use oesbench_core::{
    config::{BenchConfig, parse_count_list, worker_counts},
    experiment::discover_seeds,
    harness::{SweepPlan, run_once, run_sweep},
    plot::render_throughput_svg,
    report::{ReportRequest, ThroughputReport, build_report, write_csv, write_json},
    sort::{SortOptions, SorterRegistry},
};

#[cfg(test)]
mod main_test;

#[derive(Debug, Parser)]
#[command(
    name = "oesbench",
    author,
    version,
    about = "Odd-even transposition sort experiments: run, summarise, plot",
    long_about = None
)]
struct CliArgs {
    /// TOML file with `[experiment]` and `[plot]` defaults
    #[arg(long, global = true, value_name = "FILE", value_parser = parse_sanitized_path)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Which experiment files to read.
#[derive(Debug, Args)]
struct ExperimentArgs {
    /// Experiment label, as in `exp-<label>-e<exp>-s<seed>`
    label: String,
    /// Directory holding the log files
    #[arg(long, value_parser = parse_sanitized_path)]
    dir: Option<PathBuf>,
    /// Vector length exponent encoded in the file names
    #[arg(long)]
    exponent: Option<u32>,
    /// Seeds as `1..=10`, `1,3,5`, or `auto` for every file present
    #[arg(long)]
    seeds: Option<String>,
    /// Label of the sequential baseline files
    #[arg(long, conflicts_with = "no_baseline")]
    baseline: Option<String>,
    /// Skip the sequential baseline (no speedup or efficiency columns)
    #[arg(long)]
    no_baseline: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sort one seeded vector and print its timer line.
    Sort {
        variant: String,
        #[arg(long, default_value_t = 1)]
        workers: usize,
        #[arg(long)]
        exponent: Option<u32>,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Block count for the farm variant (default: twice the workers)
        #[arg(long)]
        blocks: Option<usize>,
    },
    /// Run a variant over seeds and worker counts, appending to log files.
    Sweep {
        variant: String,
        /// File label (defaults to the variant name)
        #[arg(long)]
        label: Option<String>,
        /// Worker counts as `1..=8` or `1,2,4,8`
        #[arg(long)]
        workers: Option<String>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        exponent: Option<u32>,
        #[arg(long)]
        blocks: Option<usize>,
        /// Output directory for `exp-*` files
        #[arg(long, value_parser = parse_sanitized_path)]
        dir: Option<PathBuf>,
    },
    /// Print mean time and throughput per worker count.
    Summary {
        #[command(flatten)]
        experiment: ExperimentArgs,
        /// Also write the report as JSON
        #[arg(long, value_parser = parse_sanitized_path)]
        json: Option<PathBuf>,
        /// Also write one CSV row per worker count
        #[arg(long, value_parser = parse_sanitized_path)]
        csv: Option<PathBuf>,
    },
    /// Render throughput against worker count as an SVG chart.
    Plot {
        #[command(flatten)]
        experiment: ExperimentArgs,
        /// SVG output path (default `<label>.svg`)
        #[arg(long, value_parser = parse_sanitized_path)]
        output: Option<PathBuf>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    /// List the available sort variants.
    Variants,
}

/// Log directories, reports and plots are addressed relative to the working
/// tree; `..` components are refused.
fn sanitize_path(raw: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(raw);
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        anyhow::bail!("'{}' contains a parent directory component ('..')", raw);
    }
    Ok(path.to_path_buf())
}

fn parse_sanitized_path(raw: &str) -> Result<PathBuf, String> {
    sanitize_path(raw).map_err(|e| e.to_string())
}

/// Meaning of `OESBENCH_TRACE`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TraceSetting {
    Off,
    /// `1`, `true`, `on`: `RUST_LOG` if set, else [`DEFAULT_TRACE_FILTER`].
    Default,
    /// Any other value is an `EnvFilter` directive.
    Filter(String),
}

impl TraceSetting {
    fn parse(raw: &str) -> Self {
        let value = raw.trim();
        let is = |word: &str| value.eq_ignore_ascii_case(word);
        if value.is_empty() || is("0") || is("false") || is("off") {
            TraceSetting::Off
        } else if is("1") || is("true") || is("on") {
            TraceSetting::Default
        } else {
            TraceSetting::Filter(value.to_string())
        }
    }

    fn filter_directive(&self) -> Option<String> {
        match self {
            TraceSetting::Off => None,
            TraceSetting::Default => Some(std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_TRACE_FILTER.to_string())),
            TraceSetting::Filter(expr) => Some(expr.clone()),
        }
    }
}

fn init_tracing_from_env() {
    let setting = std::env::var("OESBENCH_TRACE")
        .map(|raw| TraceSetting::parse(&raw))
        .unwrap_or(TraceSetting::Off);
    let Some(directive) = setting.filter_directive() else {
        return;
    };

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACE_FILTER));
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init();
    });
}

/// Resolved file selection shared by `summary` and `plot`.
#[derive(Debug, Clone, PartialEq)]
struct Selection {
    dir: PathBuf,
    label: String,
    baseline: Option<String>,
    exponent: u32,
    seeds: Vec<u64>,
}

impl Selection {
    fn request(&self) -> ReportRequest<'_> {
        ReportRequest {
            dir: &self.dir,
            label: &self.label,
            baseline_label: self.baseline.as_deref(),
            exponent: self.exponent,
            seeds: &self.seeds,
        }
    }
}

fn resolve_selection(args: &ExperimentArgs, config: &BenchConfig) -> anyhow::Result<Selection> {
    let dir = args.dir.clone().unwrap_or_else(|| config.dir.clone());
    let exponent = args.exponent.unwrap_or(config.exponent);
    let seeds = match args.seeds.as_deref().map(str::trim) {
        Some(raw) if raw.eq_ignore_ascii_case("auto") => {
            let found = discover_seeds(&dir, &args.label, exponent)?;
            if found.is_empty() {
                anyhow::bail!(
                    "no files named exp-{}-e{}-s<seed> in {}",
                    args.label,
                    exponent,
                    dir.display()
                );
            }
            found
        }
        Some(raw) => parse_count_list(raw).context("--seeds")?,
        None => config.seeds.clone(),
    };
    let baseline = if args.no_baseline {
        None
    } else {
        Some(args.baseline.clone().unwrap_or_else(|| config.baseline_label.clone()))
    };
    Ok(Selection {
        dir,
        label: args.label.clone(),
        baseline,
        exponent,
        seeds,
    })
}

fn load_report(args: &ExperimentArgs, config: &BenchConfig) -> anyhow::Result<ThroughputReport> {
    let selection = resolve_selection(args, config)?;
    build_report(&selection.request(), Utc::now())
}

fn main() -> anyhow::Result<()> {
    init_tracing_from_env();

    let CliArgs { config, command } = CliArgs::parse();
    let config = match config {
        Some(path) => BenchConfig::load(&path)?,
        None => BenchConfig::default(),
    };
    let registry = SorterRegistry::new();

    match command {
        Commands::Sort {
            variant,
            workers,
            exponent,
            seed,
            blocks,
        } => {
            let sorter = registry.get(&variant)?;
            let mut opts = SortOptions::new(workers);
            opts.blocks = blocks;
            let run = run_once(sorter, exponent.unwrap_or(config.exponent), seed, &opts)?;
            println!("{}", run.log_line());
            info!(command = "sort", variant = variant.as_str(), workers, elapsed_usec = run.elapsed_usec, "command finished");
        }
        Commands::Sweep {
            variant,
            label,
            workers,
            seeds,
            exponent,
            blocks,
            dir,
        } => {
            let mut plan = SweepPlan::new(variant, dir.unwrap_or_else(|| config.dir.clone()));
            if let Some(label) = label {
                plan.label = label;
            }
            plan.exponent = exponent.unwrap_or(config.exponent);
            plan.seeds = match seeds {
                Some(raw) => parse_count_list(&raw).context("--seeds")?,
                None => config.seeds.clone(),
            };
            plan.workers = match workers {
                Some(raw) => worker_counts(parse_count_list(&raw).context("--workers")?)?,
                None => config.workers.clone(),
            };
            plan.blocks = blocks;

            let outcome = run_sweep(&registry, &plan)?;
            for run in &outcome.runs {
                println!("{}", run.log_line());
            }
            eprintln!("Appended {} runs to {} files in {}", outcome.runs.len(), outcome.files.len(), plan.dir.display());
            info!(command = "sweep", label = plan.label.as_str(), runs = outcome.runs.len(), "command finished");
        }
        Commands::Summary { experiment, json, csv } => {
            let report = load_report(&experiment, &config)?;
            print!("{}", report.render_table());
            if let Some(path) = json {
                write_json(&path, &report)?;
                eprintln!("Wrote {}", path.display());
            }
            if let Some(path) = csv {
                write_csv(&path, &report)?;
                eprintln!("Wrote {}", path.display());
            }
            info!(
                command = "summary",
                label = experiment.label.as_str(),
                points = report.analysis.points.len(),
                "command finished"
            );
        }
        Commands::Plot {
            experiment,
            output,
            width,
            height,
        } => {
            let report = load_report(&experiment, &config)?;
            let output = output.unwrap_or_else(|| config.plot_output_for(&experiment.label));
            let mut style = config.plot;
            if let Some(v) = width.filter(|v| *v > 0) {
                style.width = v;
            }
            if let Some(v) = height.filter(|v| *v > 0) {
                style.height = v;
            }
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
            }
            render_throughput_svg(&report, &output, style)?;
            println!("Wrote plot to {}", output.display());
            info!(command = "plot", label = experiment.label.as_str(), output = %output.display(), "command finished");
        }
        Commands::Variants => {
            for (name, description) in registry.describe() {
                println!("{:<8} {}", name, description);
            }
        }
    }

    Ok(())
}
