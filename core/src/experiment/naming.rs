use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Result, anyhow};

/// Log file naming convention `exp-<label>-e<exponent>-s<seed>`.
///
/// The label may contain dashes (`pthread-async`); the exponent and seed are
/// always the last two dash-separated parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExperimentFile {
    pub label: String,
    pub exponent: u32,
    pub seed: u64,
}

impl ExperimentFile {
    pub fn new(label: impl Into<String>, exponent: u32, seed: u64) -> Self {
        Self {
            label: label.into(),
            exponent,
            seed,
        }
    }

    pub fn file_name(&self) -> String {
        self.to_string()
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

impl fmt::Display for ExperimentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exp-{}-e{}-s{}", self.label, self.exponent, self.seed)
    }
}

impl FromStr for ExperimentFile {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        let rest = name
            .strip_prefix("exp-")
            .ok_or_else(|| anyhow!("'{}' does not start with 'exp-'", name))?;
        let (rest, seed) = rest
            .rsplit_once("-s")
            .ok_or_else(|| anyhow!("'{}' has no '-s<seed>' suffix", name))?;
        let (label, exponent) = rest
            .rsplit_once("-e")
            .ok_or_else(|| anyhow!("'{}' has no '-e<exponent>' part", name))?;
        if label.is_empty() {
            return Err(anyhow!("'{}' has an empty label", name));
        }
        let exponent = exponent
            .parse()
            .map_err(|_| anyhow!("invalid exponent '{}' in '{}'", exponent, name))?;
        let seed = seed
            .parse()
            .map_err(|_| anyhow!("invalid seed '{}' in '{}'", seed, name))?;
        Ok(Self {
            label: label.to_string(),
            exponent,
            seed,
        })
    }
}
