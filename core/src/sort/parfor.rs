use anyhow::{Context, Result};
use rayon::prelude::*;

use super::{SortOptions, Sorter, effective_workers, transpose_phase};

/// Each phase is a parallel-for over the pairs of one parity, run on a pool
/// sized to the requested worker count.
#[derive(Debug, Default)]
pub struct ParallelForSorter;

impl ParallelForSorter {
    pub fn new() -> Self {
        Self
    }
}

impl Sorter for ParallelForSorter {
    fn name(&self) -> &str {
        "parfor"
    }

    fn description(&self) -> &str {
        "Parallel-for over each phase on a fixed-size thread pool"
    }

    fn sort(&self, data: &mut [i32], opts: &SortOptions) -> Result<()> {
        if data.len() < 2 {
            return Ok(());
        }
        let workers = effective_workers(self.name(), data.len(), opts.workers);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("oes-parfor-{idx}"))
            .build()
            .context("build parallel-for thread pool")?;
        pool.install(|| {
            loop {
                let odd = parallel_phase(data, 1, workers);
                let even = parallel_phase(data, 0, workers);
                if !odd && !even {
                    break;
                }
            }
        });
        Ok(())
    }
}

fn parallel_phase(data: &mut [i32], offset: usize, workers: usize) -> bool {
    let tail = &mut data[offset..];
    let chunk = chunk_len(tail.len(), workers);
    // chunk is even, so no pair straddles two chunks
    tail.par_chunks_mut(chunk)
        .map(|part| transpose_phase(part, 0))
        .reduce(|| false, |a, b| a || b)
}

fn chunk_len(len: usize, workers: usize) -> usize {
    let per_worker = len.div_ceil(workers.max(1));
    (per_worker + per_worker % 2).max(2)
}
