//! Version source
//!
//! Every write gets a version from one shared counter so that records in
//! tables flushed at different times stay comparable during merge.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic version counter shared by every memtable in the process
///
/// Wrap it in an `Arc` and hand the same instance to each `MemTable`.
#[derive(Debug, Default)]
pub struct VersionCounter {
    last: AtomicU64,
}

impl VersionCounter {
    /// Counter whose first `next()` returns 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter whose first `next()` returns `last + 1`
    ///
    /// Used to resume after the highest version found in existing tables.
    pub fn starting_at(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    /// Allocate the next version (atomic, lock-free)
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last version handed out (0 if none)
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }

    /// Raise the counter so the next version is above `seen`
    pub fn observe(&self, seen: u64) {
        self.last.fetch_max(seen, Ordering::SeqCst);
    }
}
