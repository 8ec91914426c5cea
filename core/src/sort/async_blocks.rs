use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use anyhow::{Result, anyhow};
use tracing::debug;

use super::partition::{Block, partition};
use super::{SharedSlice, SortOptions, Sorter, effective_workers};

/// Workers scan their own blocks with no global phases; neighbours only
/// coordinate on the element they share.
#[derive(Debug, Default)]
pub struct AsyncBlockSorter;

impl AsyncBlockSorter {
    pub fn new() -> Self {
        Self
    }
}

impl Sorter for AsyncBlockSorter {
    fn name(&self) -> &str {
        "async"
    }

    fn description(&self) -> &str {
        "Asynchronous block scans with per-block border locks and a sorted-block counter"
    }

    fn sort(&self, data: &mut [i32], opts: &SortOptions) -> Result<()> {
        if data.len() < 2 {
            return Ok(());
        }
        let workers = effective_workers(self.name(), data.len(), opts.workers);
        oesort_async(data, workers)
    }
}

// Invariant: `sorted` is true iff no out-of-order pair was found and no
// border transposition touched this block since its last full scan started.
// Every block sorted therefore implies the whole vector is sorted.
//
// `meanwhile` is true iff a neighbour transposed a border pair into this
// block since its current scan started.
#[derive(Debug, Default)]
struct BlockState {
    sorted: bool,
    meanwhile: bool,
}

/// Shared bookkeeping. `blocks[b]` also guards the first element of block `b`.
#[derive(Debug)]
struct Coordinator {
    blocks: Vec<Mutex<BlockState>>,
    sorted_blocks: Mutex<usize>,
    all_sorted: Condvar,
    shutdown: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Coordinator {
    fn new(blocks: usize) -> Self {
        Self {
            blocks: (0..blocks).map(|_| Mutex::new(BlockState::default())).collect(),
            sorted_blocks: Mutex::new(0),
            all_sorted: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Record that a neighbour moved an element of the block behind `state`.
    fn invalidate(&self, state: &mut BlockState) {
        state.meanwhile = true;
        if state.sorted {
            state.sorted = false;
            *lock(&self.sorted_blocks) -= 1;
        }
    }

    /// Mark block `index` sorted unless a neighbour touched it during the
    /// scan. Returns true when the block was already marked sorted.
    fn try_mark_sorted(&self, index: usize) -> bool {
        let mut state = lock(&self.blocks[index]);
        if state.sorted {
            return true;
        }
        if !state.meanwhile {
            state.sorted = true;
            let mut count = lock(&self.sorted_blocks);
            *count += 1;
            if *count == self.blocks.len() {
                self.all_sorted.notify_one();
            }
        }
        false
    }

    #[cfg(test)]
    fn sorted_count(&self) -> usize {
        *lock(&self.sorted_blocks)
    }

    fn wait_all_sorted(&self) {
        let mut count = lock(&self.sorted_blocks);
        while *count < self.blocks.len() {
            count = self.all_sorted.wait(count).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

fn oesort_async(data: &mut [i32], workers: usize) -> Result<()> {
    let blocks = partition(data.len(), workers);
    let shared = SharedSlice::from_slice(data);
    let coord = Coordinator::new(blocks.len());

    crossbeam::scope(|scope| {
        for block in &blocks {
            let shared = &shared;
            let coord = &coord;
            let last = blocks.len() - 1;
            scope.spawn(move |_| scan_block(shared, coord, *block, last));
        }
        coord.wait_all_sorted();
        debug!(blocks = blocks.len(), "every block reported sorted, shutting down workers");
        coord.shutdown.store(true, Ordering::Release);
    })
    .map_err(|_| anyhow!("async block worker panicked"))?;

    shared.copy_into(data);
    Ok(())
}

fn scan_block(shared: &SharedSlice, coord: &Coordinator, block: Block, last: usize) {
    let Block { index, start, end } = block;
    let first_block = index == 0;
    let last_block = index == last;
    // With one pair the left and right borders would be the same pair.
    debug_assert!(last == 0 || block.pairs() >= 2, "block {} has {} pairs", index, block.pairs());

    while !coord.shutdown.load(Ordering::Acquire) {
        let mut local_sorted = true;
        lock(&coord.blocks[index]).meanwhile = false;

        for parity in [0, 1] {
            let mut i = start + parity;
            while i < end {
                if i == end - 1 && !last_block {
                    // right border: `end` is the first element of the next block
                    let mut right = lock(&coord.blocks[index + 1]);
                    if shared.transpose(i) {
                        local_sorted = false;
                        coord.invalidate(&mut right);
                    }
                } else if i == start && !first_block {
                    // left border: `start` is shared with the previous block
                    let _own = lock(&coord.blocks[index]);
                    if shared.transpose(i) {
                        local_sorted = false;
                        let mut left = lock(&coord.blocks[index - 1]);
                        coord.invalidate(&mut left);
                    }
                } else if shared.transpose(i) {
                    local_sorted = false;
                }
                i += 2;
            }
        }

        // A clean rescan of a block that is already marked sorted has nothing
        // to do until a neighbour invalidates it.
        if local_sorted && coord.try_mark_sorted(index) {
            std::thread::yield_now();
        }
    }
}
