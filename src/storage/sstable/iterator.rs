//! SSTable Iterator
//!
//! Sequential iteration over all records of a disk table, driven by the
//! header's offsets rather than by a file cursor.

use crate::error::Result;
use crate::record::{self, ReadAt, Record};

use super::reader::DiskTable;

/// Iterator over disk table records in sorted key order
///
/// Yields tombstones as stored. Stops after the first error.
pub struct DiskTableIterator<'a, H> {
    table: &'a DiskTable<H>,
    /// Index of the next record to read
    next: usize,
}

impl<'a, H: ReadAt> DiskTableIterator<'a, H> {
    pub(super) fn new(table: &'a DiskTable<H>) -> Self {
        Self { table, next: 0 }
    }
}

impl<'a, H: ReadAt> Iterator for DiskTableIterator<'a, H> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let offsets = self.table.meta().offsets();
        let offset = *offsets.get(self.next)? as u64;

        match record::decode_at_within(&self.table.handle, offset, self.table.end) {
            Ok(record) => {
                self.next += 1;
                Some(Ok(record))
            }
            Err(e) => {
                tracing::warn!(offset, error = %e, "Failed to read record");
                self.next = offsets.len();
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.table.len().saturating_sub(self.next);
        (0, Some(left))
    }
}
