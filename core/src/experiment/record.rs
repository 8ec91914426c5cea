//! Records parsed back from timer lines.
//!
//! A timer line echoes the program name and its arguments, then
//! `computed in <usec> usec`:
//!
//! ```text
//! seq 100000 3 computed in 52114 usec
//! barrier 4 100000 3 computed in 18220 usec
//! ```
//!
//! so the sequential layout reads tokens 2 and 5 and the concurrent layout
//! reads tokens 1, 3 and 6.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LogParseError;

pub const SEQ_SEED_FIELD: usize = 2;
pub const SEQ_USEC_FIELD: usize = 5;
pub const CONC_WORKERS_FIELD: usize = 1;
pub const CONC_SEED_FIELD: usize = 3;
pub const CONC_USEC_FIELD: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialRecord {
    pub seed: u64,
    pub elapsed_usec: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrentRecord {
    pub workers: u32,
    pub seed: u64,
    pub elapsed_usec: u64,
}

/// Parse one sequential timer line. Blank lines yield `Ok(None)`.
pub fn parse_sequential_line(line: &str) -> Result<Option<SequentialRecord>, LogParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    Ok(Some(SequentialRecord {
        seed: field(&tokens, SEQ_SEED_FIELD, "seed")?,
        elapsed_usec: field(&tokens, SEQ_USEC_FIELD, "elapsed time")?,
    }))
}

/// Parse one concurrent timer line. Blank lines yield `Ok(None)`.
pub fn parse_concurrent_line(line: &str) -> Result<Option<ConcurrentRecord>, LogParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    Ok(Some(ConcurrentRecord {
        workers: field(&tokens, CONC_WORKERS_FIELD, "worker count")?,
        seed: field(&tokens, CONC_SEED_FIELD, "seed")?,
        elapsed_usec: field(&tokens, CONC_USEC_FIELD, "elapsed time")?,
    }))
}

fn field<T: FromStr>(tokens: &[&str], index: usize, name: &str) -> Result<T, LogParseError> {
    let raw = tokens.get(index).ok_or_else(|| {
        LogParseError::at_token(
            format!("missing {} field: line has only {} tokens", name, tokens.len()),
            index,
        )
    })?;
    raw.parse::<T>().map_err(|_| {
        LogParseError::at_token(format!("expected integer {}, found '{}'", name, raw), index)
    })
}

/// Argument echo of a sequential run: `<program> <length> <seed>`.
pub fn sequential_message(program: &str, len: usize, seed: u64) -> String {
    format!("{} {} {}", program, len, seed)
}

/// Argument echo of a concurrent run: `<program> <workers> <length> <seed>`.
pub fn concurrent_message(program: &str, workers: usize, len: usize, seed: u64) -> String {
    format!("{} {} {} {}", program, workers, len, seed)
}
