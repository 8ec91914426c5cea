use std::sync::atomic::{AtomicI32, Ordering};

/// Element storage that several workers can transpose concurrently.
///
/// Each cell is an atomic, so workers touching disjoint pairs never need
/// `unsafe` aliasing. Accesses are relaxed; callers order phases with their
/// own synchronisation.
#[derive(Debug)]
pub struct SharedSlice {
    cells: Vec<AtomicI32>,
}

impl SharedSlice {
    pub fn from_slice(data: &[i32]) -> Self {
        Self {
            cells: data.iter().map(|&v| AtomicI32::new(v)).collect(),
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> i32 {
        self.cells[index].load(Ordering::Relaxed)
    }

    /// Swap `index` and `index + 1` when they are out of order.
    #[inline]
    pub fn transpose(&self, index: usize) -> bool {
        let left = self.get(index);
        let right = self.get(index + 1);
        if right < left {
            self.cells[index].store(right, Ordering::Relaxed);
            self.cells[index + 1].store(left, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Transpose the pairs `(i, i + 1)` for `i` in `start..end` with `i % 2 == parity`.
    pub fn transpose_range(&self, start: usize, end: usize, parity: usize) -> bool {
        let mut i = if start % 2 == parity { start } else { start + 1 };
        let mut swapped = false;
        while i < end {
            swapped |= self.transpose(i);
            i += 2;
        }
        swapped
    }

    pub fn copy_into(&self, out: &mut [i32]) {
        for (slot, cell) in out.iter_mut().zip(&self.cells) {
            *slot = cell.load(Ordering::Relaxed);
        }
    }
}
