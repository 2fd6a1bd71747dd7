//! Rotation counters shared by concurrent selectors

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing counter used for fair round-robin selection
///
/// The only mutation is [`RotationCounter::increment_and_get`], a single
/// `fetch_add`, so no two callers ever observe the same value.
#[derive(Debug, Default)]
pub struct RotationCounter {
    value: AtomicU64,
}

impl RotationCounter {
    /// Create a counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter whose next increment yields `start + 1`
    pub fn starting_at(start: u64) -> Self {
        Self {
            value: AtomicU64::new(start),
        }
    }

    /// Atomically increment and return the new value
    pub fn increment_and_get(&self) -> u64 {
        self.value.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Current value without incrementing
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Reset to zero
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }

    /// Increment and map the result onto `0..len`
    ///
    /// Returns `None` when `len` is zero.
    pub fn next_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some((self.increment_and_get() % len as u64) as usize)
    }
}
