//! Compaction
//!
//! Merges two sorted tables into a new one. Inputs are never modified.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::record::{ReadAt, Record};

use super::sstable::{DiskTable, SortedTable};

/// Merge `first` and `second` into a new table named after `first`
///
/// For each key the record with the higher version wins; when both carry
/// the same version the record from `first` is kept. Keys whose winning
/// record is a tombstone are dropped from the result.
pub fn merge(first: &SortedTable, second: &SortedTable) -> Result<SortedTable> {
    let mut winners: BTreeMap<&[u8], &Record> = BTreeMap::new();

    for record in first.records().iter().chain(second.records()) {
        match winners.entry(record.key.as_slice()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                let winner = Record::newest(*slot.get(), record);
                slot.insert(winner);
            }
        }
    }

    let distinct = winners.len();
    let survivors: Vec<Record> = winners
        .into_values()
        .filter(|record| !record.is_tombstone())
        .cloned()
        .collect();

    tracing::debug!(
        table = first.name(),
        first = first.len(),
        second = second.len(),
        kept = survivors.len(),
        dropped_tombstones = distinct - survivors.len(),
        "Merged tables"
    );

    SortedTable::new(first.name(), survivors)
}

/// Load two disk tables and merge them
pub fn merge_disk<A: ReadAt, B: ReadAt>(first: &DiskTable<A>, second: &DiskTable<B>) -> Result<SortedTable> {
    let first = first.load()?;
    let second = second.load()?;
    merge(&first, &second)
}
