//! Balanced block boundaries.
//!
//! A block owns the pairs `(i, i + 1)` for `i` in `start..end`, so it touches
//! the elements `start..=end` and shares its last element with the first
//! element of the next block. Pair counts of any two blocks differ by at most
//! one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Block {
    pub fn pairs(&self) -> usize {
        self.end - self.start
    }
}

/// Largest block count that still leaves at least two pairs per block.
pub fn max_blocks(len: usize) -> usize {
    (len.saturating_sub(1) / 2).max(1)
}

/// Clamp a requested block (or worker) count into `1..=max_blocks(len)`.
pub fn clamp_blocks(len: usize, requested: usize) -> usize {
    requested.clamp(1, max_blocks(len))
}

pub fn partition(len: usize, blocks: usize) -> Vec<Block> {
    if len < 2 {
        return Vec::new();
    }
    let blocks = clamp_blocks(len, blocks);
    let pairs = len - 1;
    let base = pairs / blocks;
    let mut remainder = pairs % blocks;

    let mut out = Vec::with_capacity(blocks);
    let mut start = 0;
    for index in 0..blocks {
        let mut span = base;
        if remainder > 0 {
            span += 1;
            remainder -= 1;
        }
        out.push(Block {
            index,
            start,
            end: start + span,
        });
        start += span;
    }
    out
}
