//! Experiment log files: naming, line layout and loading.

mod error;
mod loader;
mod naming;
mod record;


pub use error::{LineLocation, LogParseError};
pub use loader::{discover_seeds, load_concurrent, load_sequential, parse_records, read_records};
pub use naming::ExperimentFile;
pub use record::{
    ConcurrentRecord, SequentialRecord, concurrent_message, parse_concurrent_line, parse_sequential_line,
    sequential_message,
};

/// Label of the sequential baseline files (`exp-seq-e<exp>-s<seed>`).
pub const DEFAULT_BASELINE_LABEL: &str = "seq";

/// Seeds `1..=10`, one file per seed.
pub fn default_seeds() -> Vec<u64> {
    (1..=10).collect()
}
