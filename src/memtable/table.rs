//! MemTable implementation
//!
//! BTreeMap-based memtable with RwLock for concurrency.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::record::{Record, TOMBSTONE};
use crate::searcher::{collect_matching, Predicate, Searcher};
use crate::storage::SortedTable;
use crate::version::VersionCounter;

use super::MemTableEntry;

/// In-memory ordered index for recent writes
///
/// ## Concurrency:
/// - `data`: RwLock (many concurrent readers, exclusive writer); a reader
///   never sees a half-applied insert
/// - `size`: atomic, updated while the write lock is held
/// - `versions`: shared with every other memtable in the process
///
/// Lookups and scans return tombstone records as stored. The memtable has
/// to carry them into the flushed table so they shadow older tables.
pub struct MemTable {
    data: RwLock<BTreeMap<Vec<u8>, MemTableEntry>>,
    size: AtomicUsize,
    versions: Arc<VersionCounter>,
}

impl MemTable {
    /// Create a new empty MemTable with its own version counter
    pub fn new() -> Self {
        Self::with_counter(Arc::new(VersionCounter::new()))
    }

    /// Create a new empty MemTable drawing versions from `versions`
    pub fn with_counter(versions: Arc<VersionCounter>) -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            size: AtomicUsize::new(0),
            versions,
        }
    }

    /// Insert `key` with an explicit version (write lock)
    ///
    /// If the key is already present the new value replaces it only when
    /// `version` is strictly higher. Returns whether the write was applied.
    ///
    /// The shared counter is raised to at least `version`, so later `put`
    /// and `delete` calls always draw a newer version.
    pub fn insert(&self, key: Vec<u8>, value: Vec<u8>, version: u64) -> bool {
        let mut data = self.data.write();
        self.versions.observe(version);
        let entry = MemTableEntry { value, version };

        match data.get_mut(&key) {
            Some(existing) if existing.version >= version => false,
            Some(existing) => {
                let old = existing.charged_len();
                let new = entry.charged_len();
                *existing = entry;
                self.size.fetch_add(new, Ordering::SeqCst);
                self.size.fetch_sub(old, Ordering::SeqCst);
                true
            }
            None => {
                self.size
                    .fetch_add(key.len() + entry.charged_len(), Ordering::SeqCst);
                data.insert(key, entry);
                true
            }
        }
    }

    /// Put a key-value pair under the next version (write lock)
    ///
    /// Returns the version assigned to the write.
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> u64 {
        let mut data = self.data.write();
        let version = self.versions.next();
        self.insert_locked(&mut data, key, MemTableEntry { value, version });
        version
    }

    /// Delete a key under the next version (write lock, inserts tombstone)
    pub fn delete(&self, key: Vec<u8>) -> u64 {
        let mut data = self.data.write();
        let version = self.versions.next();
        let entry = MemTableEntry {
            value: TOMBSTONE.to_vec(),
            version,
        };
        self.insert_locked(&mut data, key, entry);
        version
    }

    /// Caller holds the write lock and drew `entry.version` from the counter
    /// under it. `insert` raises the counter past every explicit version, so
    /// the entry is newer than anything stored and replaces it.
    fn insert_locked(
        &self,
        data: &mut BTreeMap<Vec<u8>, MemTableEntry>,
        key: Vec<u8>,
        entry: MemTableEntry,
    ) {
        let key_len = key.len();
        let new = entry.charged_len();
        match data.insert(key, entry) {
            Some(old) => {
                self.size.fetch_add(new, Ordering::SeqCst);
                self.size.fetch_sub(old.charged_len(), Ordering::SeqCst);
            }
            None => {
                self.size.fetch_add(key_len + new, Ordering::SeqCst);
            }
        }
    }

    /// Get approximate size in bytes (keys plus live values)
    pub fn size(&self) -> usize {
        self.size.load(Ordering::SeqCst)
    }

    /// Get entry count (tombstones included)
    pub fn entry_count(&self) -> usize {
        self.data.read().len()
    }

    /// True if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Check if should flush (size >= limit)
    pub fn should_flush(&self, size_limit: usize) -> bool {
        self.size() >= size_limit
    }

    /// Highest version stored, 0 when empty
    pub fn max_version(&self) -> u64 {
        self.data
            .read()
            .values()
            .map(|entry| entry.version)
            .max()
            .unwrap_or(0)
    }

    /// The counter this memtable draws versions from
    pub fn versions(&self) -> &Arc<VersionCounter> {
        &self.versions
    }

    /// Build an immutable sorted table from a snapshot of every entry.
    ///
    /// The read lock is held for the whole traversal so the snapshot is
    /// consistent with respect to concurrent writers.
    pub fn flush_to_table(&self, name: &str) -> Result<SortedTable> {
        let records: Vec<Record> = self.iter().collect();
        tracing::debug!(
            table = name,
            records = records.len(),
            bytes = self.size(),
            "Flushing memtable"
        );
        SortedTable::new(name, records)
    }

    /// Snapshot every entry as a record, in sorted key order
    ///
    /// Tombstones are included. The snapshot is taken under one read lock,
    /// so later writes do not show up in the iterator.
    pub fn iter(&self) -> MemTableIterator {
        let data = self.data.read();
        let records: Vec<Record> = data
            .iter()
            .map(|(key, entry)| Record::new(key.clone(), entry.value.clone(), entry.version))
            .collect();
        MemTableIterator {
            records: records.into_iter(),
        }
    }

    /// Clear all entries (after successful flush)
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.clear();
        self.size.store(0, Ordering::SeqCst);
    }
}

impl Searcher for MemTable {
    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.data.read().contains_key(key))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Record>> {
        Ok(self
            .data
            .read()
            .get(key)
            .map(|entry| Record::new(key, entry.value.clone(), entry.version)))
    }

    fn scan_with_predicate(&self, pred: Option<Predicate<'_>>, max: usize) -> Result<Vec<Record>> {
        let data = self.data.read();
        let records = data
            .iter()
            .map(|(key, entry)| Ok(Record::new(key.clone(), entry.value.clone(), entry.version)));
        collect_matching(records, pred, max)
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned snapshot of MemTable entries in sorted key order
pub struct MemTableIterator {
    records: std::vec::IntoIter<Record>,
}

impl Iterator for MemTableIterator {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for MemTableIterator {}
