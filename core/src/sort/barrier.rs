use std::sync::Barrier;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow};

use super::partition::partition;
use super::{SharedSlice, SortOptions, Sorter, effective_workers};

/// Persistent workers, one block each, meeting at a barrier after every phase.
#[derive(Debug, Default)]
pub struct BarrierSorter;

impl BarrierSorter {
    pub fn new() -> Self {
        Self
    }
}

impl Sorter for BarrierSorter {
    fn name(&self) -> &str {
        "barrier"
    }

    fn description(&self) -> &str {
        "Worker threads on fixed blocks synchronised by a barrier after each phase"
    }

    fn sort(&self, data: &mut [i32], opts: &SortOptions) -> Result<()> {
        if data.len() < 2 {
            return Ok(());
        }
        let workers = effective_workers(self.name(), data.len(), opts.workers);
        oesort_barrier(data, workers)
    }
}

fn oesort_barrier(data: &mut [i32], workers: usize) -> Result<()> {
    let blocks = partition(data.len(), workers);
    let shared = SharedSlice::from_slice(data);
    let barrier = Barrier::new(blocks.len());
    // swapped[r % 2] collects round r; the leader of the mid-round barrier
    // clears the slot that round r + 1 will use.
    let swapped = [AtomicBool::new(false), AtomicBool::new(false)];

    crossbeam::scope(|scope| {
        for block in &blocks {
            let shared = &shared;
            let barrier = &barrier;
            let swapped = &swapped;
            scope.spawn(move |_| {
                let mut round = 0usize;
                loop {
                    let slot = &swapped[round % 2];
                    if shared.transpose_range(block.start, block.end, 1) {
                        slot.store(true, Ordering::Relaxed);
                    }
                    if barrier.wait().is_leader() {
                        swapped[(round + 1) % 2].store(false, Ordering::Relaxed);
                    }
                    if shared.transpose_range(block.start, block.end, 0) {
                        slot.store(true, Ordering::Relaxed);
                    }
                    barrier.wait();
                    if !slot.load(Ordering::Relaxed) {
                        break;
                    }
                    round += 1;
                }
            });
        }
    })
    .map_err(|_| anyhow!("barrier worker panicked"))?;

    shared.copy_into(data);
    Ok(())
}
