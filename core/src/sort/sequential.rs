use anyhow::Result;

use super::{SortOptions, Sorter, transpose_phase};

/// Single-threaded baseline: odd phase, even phase, repeat until a round is clean.
#[derive(Debug, Default)]
pub struct SequentialSorter;

impl SequentialSorter {
    pub fn new() -> Self {
        Self
    }
}

impl Sorter for SequentialSorter {
    fn name(&self) -> &str {
        "seq"
    }

    fn description(&self) -> &str {
        "Sequential odd-even transposition sort (baseline)"
    }

    fn is_sequential(&self) -> bool {
        true
    }

    fn sort(&self, data: &mut [i32], _opts: &SortOptions) -> Result<()> {
        oesort_seq(data);
        Ok(())
    }
}

pub(crate) fn oesort_seq(data: &mut [i32]) {
    loop {
        let odd = transpose_phase(data, 1);
        let even = transpose_phase(data, 0);
        if !odd && !even {
            break;
        }
    }
}
