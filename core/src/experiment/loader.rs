use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::error::LogParseError;
use super::naming::ExperimentFile;
use super::record::{ConcurrentRecord, SequentialRecord, parse_concurrent_line, parse_sequential_line};

type LineParser<T> = fn(&str) -> Result<Option<T>, LogParseError>;

/// Parse every line of `text`, skipping blanks.
pub fn parse_records<T>(text: &str, parse: LineParser<T>) -> Result<Vec<T>, LogParseError> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(record) = parse(line).map_err(|e| e.located(None, idx + 1))? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Read one log file line by line.
pub fn read_records<T>(path: &Path, parse: LineParser<T>) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("open log file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        if let Some(record) = parse(&line).map_err(|e| e.located(Some(path), idx + 1))? {
            records.push(record);
        }
    }
    debug!(path = %path.display(), records = records.len(), "loaded log file");
    Ok(records)
}

fn load_all<T>(dir: &Path, label: &str, exponent: u32, seeds: &[u64], parse: LineParser<T>) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for &seed in seeds {
        let path = ExperimentFile::new(label, exponent, seed).path_in(dir);
        records.extend(read_records(&path, parse)?);
    }
    Ok(records)
}

/// Concatenate the sequential records of every seed file for `label`.
pub fn load_sequential(dir: &Path, label: &str, exponent: u32, seeds: &[u64]) -> Result<Vec<SequentialRecord>> {
    load_all(dir, label, exponent, seeds, parse_sequential_line)
        .with_context(|| format!("load sequential baseline '{}'", label))
}

/// Concatenate the concurrent records of every seed file for `label`.
pub fn load_concurrent(dir: &Path, label: &str, exponent: u32, seeds: &[u64]) -> Result<Vec<ConcurrentRecord>> {
    load_all(dir, label, exponent, seeds, parse_concurrent_line)
        .with_context(|| format!("load concurrent experiment '{}'", label))
}

/// Seeds for which `exp-<label>-e<exponent>-s<seed>` exists in `dir`, ascending.
pub fn discover_seeds(dir: &Path, label: &str, exponent: u32) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = fs::read_dir(dir)
        .with_context(|| format!("list experiment directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().and_then(|name| name.parse::<ExperimentFile>().ok()))
        .filter(|file| file.label == label && file.exponent == exponent)
        .map(|file| file.seed)
        .collect();
    seeds.sort_unstable();
    seeds.dedup();
    Ok(seeds)
}
