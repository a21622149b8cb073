//! MemTable Module
//!
//! In-memory ordered index for recent writes.
//!
//! ## Responsibilities
//! - Keep the newest record per key (highest version wins)
//! - Single-writer/multi-reader access pattern
//! - Track size for flush triggers
//! - Ordered traversal for SSTable creation
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in RwLock:
//! - Ordered keys (required for SSTable generation)
//! - Balanced, so adversarial insertion order cannot degrade lookups
//! - In-order traversal is iterative; no recursion depth to worry about

mod table;

pub use table::{MemTable, MemTableIterator};

use crate::record::TOMBSTONE;

/// Entry stored in the MemTable, keyed by its record key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemTableEntry {
    /// Value bytes, or the tombstone marker
    pub value: Vec<u8>,

    /// Version that wrote this value
    pub version: u64,
}

impl MemTableEntry {
    /// True if this entry deletes its key
    pub fn is_tombstone(&self) -> bool {
        self.value == TOMBSTONE
    }

    /// Bytes this entry counts toward the memtable size (key excluded)
    pub(crate) fn charged_len(&self) -> usize {
        if self.is_tombstone() {
            0
        } else {
            self.value.len()
        }
    }
}
