use anyhow::{Context, Result, anyhow};
use crossbeam::channel;
use tracing::debug;

use super::partition::partition;
use super::{SharedSlice, SortOptions, Sorter, effective_workers, phase_offset};

/// Emitter plus worker pool with a feedback channel. The emitter hands out
/// one block pass at a time and every block performs `len` passes.
#[derive(Debug, Default)]
pub struct FarmSorter;

impl FarmSorter {
    pub fn new() -> Self {
        Self
    }
}

impl Sorter for FarmSorter {
    fn name(&self) -> &str {
        "farm"
    }

    fn description(&self) -> &str {
        "Task farm: an emitter schedules block passes onto workers through a feedback loop"
    }

    fn sort(&self, data: &mut [i32], opts: &SortOptions) -> Result<()> {
        if data.len() < 2 {
            return Ok(());
        }
        let workers = effective_workers(self.name(), data.len(), opts.workers);
        let blocks = opts.blocks.unwrap_or(2 * workers);
        oesort_farm(data, workers, blocks)
    }
}

/// Pass bookkeeping for the emitter.
///
/// Block `b` may start pass `k = completed[b]` once it is idle and both
/// neighbours have completed pass `k - 1`. A neighbour can then only be idle
/// or running pass `k` itself, so concurrently running passes on adjacent
/// blocks always share a parity and never touch the same element.
#[derive(Debug, Clone)]
pub struct FarmSchedule {
    passes: usize,
    completed: Vec<usize>,
    busy: Vec<bool>,
    remaining: usize,
}

impl FarmSchedule {
    pub fn new(blocks: usize, passes: usize) -> Self {
        Self {
            passes,
            completed: vec![0; blocks],
            busy: vec![false; blocks],
            remaining: blocks * passes,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    pub fn completed(&self, block: usize) -> usize {
        self.completed[block]
    }

    pub fn can_start(&self, block: usize) -> bool {
        let pass = self.completed[block];
        if self.busy[block] || pass >= self.passes {
            return false;
        }
        let left_ok = block == 0 || self.completed[block - 1] >= pass;
        let right_ok = block + 1 == self.completed.len() || self.completed[block + 1] >= pass;
        left_ok && right_ok
    }

    /// Mark every ready block busy and return `(block, pass)` for each.
    pub fn start_ready(&mut self) -> Vec<(usize, usize)> {
        let mut started = Vec::new();
        for block in 0..self.completed.len() {
            if self.can_start(block) {
                self.busy[block] = true;
                started.push((block, self.completed[block]));
            }
        }
        started
    }

    pub fn complete(&mut self, block: usize) {
        debug_assert!(self.busy[block], "completion for idle block {block}");
        self.busy[block] = false;
        self.completed[block] += 1;
        self.remaining -= 1;
    }
}

#[derive(Debug, Clone, Copy)]
struct FarmTask {
    block: usize,
    start: usize,
    end: usize,
    pass: usize,
}

fn oesort_farm(data: &mut [i32], workers: usize, blocks: usize) -> Result<()> {
    let blocks = partition(data.len(), blocks);
    let passes = data.len();
    let shared = SharedSlice::from_slice(data);
    let (task_tx, task_rx) = channel::unbounded::<FarmTask>();
    let (done_tx, done_rx) = channel::unbounded::<usize>();
    debug!(workers, blocks = blocks.len(), passes, "starting farm");

    crossbeam::scope(|scope| -> Result<()> {
        for _ in 0..workers {
            let task_rx = task_rx.clone();
            let done_tx = done_tx.clone();
            let shared = &shared;
            scope.spawn(move |_| {
                for task in task_rx.iter() {
                    shared.transpose_range(task.start, task.end, phase_offset(task.pass));
                    if done_tx.send(task.block).is_err() {
                        break;
                    }
                }
            });
        }
        drop(done_tx);

        let mut schedule = FarmSchedule::new(blocks.len(), passes);
        loop {
            for (block, pass) in schedule.start_ready() {
                let b = blocks[block];
                task_tx
                    .send(FarmTask {
                        block,
                        start: b.start,
                        end: b.end,
                        pass,
                    })
                    .map_err(|_| anyhow!("farm workers hung up"))?;
            }
            if schedule.is_finished() {
                break;
            }
            let block = done_rx.recv().context("farm feedback channel closed")?;
            schedule.complete(block);
        }
        drop(task_tx);
        Ok(())
    })
    .map_err(|_| anyhow!("farm worker panicked"))??;

    shared.copy_into(data);
    Ok(())
}
