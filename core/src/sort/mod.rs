//! Odd-even transposition sort in several flavours.
//!
//! Every variant sorts a slice of `i32` in place and is reachable through the
//! [`SorterRegistry`] by name, so the harness, the benches and the CLI all run
//! exactly the same code for a given label.

mod async_blocks;
mod barrier;
mod farm;
mod parfor;
pub mod partition;
mod registry;
mod sequential;
mod shared;

#[cfg(test)]
mod sort_test;

use anyhow::Result;
use tracing::warn;

pub use async_blocks::AsyncBlockSorter;
pub use barrier::BarrierSorter;
pub use farm::{FarmSchedule, FarmSorter};
pub use parfor::ParallelForSorter;
pub use registry::SorterRegistry;
pub use sequential::SequentialSorter;
pub use shared::SharedSlice;

/// Knobs shared by every variant. Sequential sorters ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOptions {
    pub workers: usize,
    /// Number of blocks for schedulers that split work finer than one block
    /// per worker. `None` picks the variant default.
    pub blocks: Option<usize>,
}

impl SortOptions {
    pub fn new(workers: usize) -> Self {
        Self { workers, blocks: None }
    }

    pub fn with_blocks(mut self, blocks: usize) -> Self {
        self.blocks = Some(blocks);
        self
    }
}

impl Default for SortOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

/// A named odd-even sort implementation.
pub trait Sorter: Send + Sync + std::fmt::Debug {
    /// Registry key, also used as the log label and the program token of the
    /// timer line.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Sequential variants log `<name> <length> <seed>` instead of
    /// `<name> <workers> <length> <seed>`.
    fn is_sequential(&self) -> bool {
        false
    }

    fn sort(&self, data: &mut [i32], opts: &SortOptions) -> Result<()>;
}

/// Phase offset of the `pass`-th phase: odd pairs first, then even pairs.
#[inline]
pub fn phase_offset(pass: usize) -> usize {
    if pass % 2 == 0 { 1 } else { 0 }
}

/// Swap every out-of-order pair `(i, i + 1)` with `i` in `offset..data.len() - 1`
/// stepping by two. Returns whether anything moved.
pub fn transpose_phase(data: &mut [i32], offset: usize) -> bool {
    let mut swapped = false;
    let mut i = offset;
    while i + 1 < data.len() {
        if data[i + 1] < data[i] {
            data.swap(i, i + 1);
            swapped = true;
        }
        i += 2;
    }
    swapped
}

pub fn is_sorted(data: &[i32]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}

/// Clamp `requested` so every worker owns at least two pairs.
pub(crate) fn effective_workers(variant: &str, len: usize, requested: usize) -> usize {
    let workers = partition::clamp_blocks(len, requested);
    if workers != requested {
        warn!(variant, requested, workers, len, "clamped worker count to the input length");
    }
    workers
}
