//! SSTable Reader
//!
//! Opens persisted SSTables and answers queries with only the header in
//! memory. Records are fetched one at a time with positioned reads.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Result, TableError};
use crate::record::{self, ReadAt, Record};
use crate::searcher::{collect_matching, Predicate, Searcher};

use super::iterator::DiskTableIterator;
use super::meta::TableMeta;
use super::search::binary_search;
use super::table::SortedTable;

/// Disk-resident table: header in memory, records on disk
///
/// All reads are offset-addressed, so lookups take `&self` and one table
/// can be shared across threads without a lock around the handle.
pub struct DiskTable<H = File> {
    /// Byte source for records
    pub(super) handle: H,
    /// Total bytes in the handle, captured at open
    pub(super) end: u64,
    meta: TableMeta,
    path: Option<PathBuf>,
}

impl DiskTable<File> {
    /// Open an SSTable file for reading
    ///
    /// Reads and validates the header only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut table = Self::from_handle(file).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to open table");
            e
        })?;
        table.path = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            table = table.name(),
            records = table.len(),
            "Opened disk table"
        );
        Ok(table)
    }
}

impl<H: ReadAt> DiskTable<H> {
    /// Wrap any positioned-read handle holding a serialized table
    pub fn from_handle(handle: H) -> Result<Self> {
        let end = handle.size()?;
        let meta = TableMeta::read_from(&handle, end)?;
        Ok(Self {
            handle,
            end,
            meta,
            path: None,
        })
    }

    /// Table header
    pub fn meta(&self) -> &TableMeta {
        &self.meta
    }

    /// Table name
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    /// Number of records, tombstones included
    pub fn len(&self) -> usize {
        self.meta.offsets().len()
    }

    /// True if the table holds no records
    pub fn is_empty(&self) -> bool {
        self.meta.offsets().is_empty()
    }

    /// Path the table was opened from, if it came from a file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up the stored record for `key`, tombstone or not
    ///
    /// Each probe reads only the candidate's key; the full record is read
    /// once the key matches.
    pub fn find(&self, key: &[u8]) -> Result<Option<Record>> {
        let offsets = self.meta.offsets();
        let found = binary_search(offsets.len(), key, |i| {
            let offset = offsets[i] as u64;
            tracing::trace!(slot = i, offset, "Probing disk table");
            record::decode_key_at_within(&self.handle, offset, self.end)
                .map(|(k, _)| k)
                .map_err(|e| {
                    tracing::warn!(table = self.name(), offset, error = %e, "Failed to read key");
                    e
                })
        })?;

        match found {
            Some(i) => {
                let offset = offsets[i] as u64;
                let record = record::decode_at_within(&self.handle, offset, self.end).map_err(|e| {
                    tracing::warn!(table = self.name(), offset, error = %e, "Failed to read record");
                    e
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Lazily iterate every record in key order, tombstones included
    pub fn iter(&self) -> DiskTableIterator<'_, H> {
        DiskTableIterator::new(self)
    }

    /// Read every record into an in-memory table (for compaction)
    ///
    /// Records that a table could not have been built from (empty or
    /// duplicate keys) mean the file is damaged and are reported as
    /// corruption.
    pub fn load(&self) -> Result<SortedTable> {
        let records = self.iter().collect::<Result<Vec<_>>>()?;
        SortedTable::new(self.name(), records).map_err(|e| match e {
            TableError::InvalidInput(reason) => {
                tracing::warn!(table = self.name(), %reason, "Corrupt table contents");
                TableError::CorruptRecord(reason)
            }
            other => other,
        })
    }
}

impl<H: ReadAt> Searcher for DiskTable<H> {
    /// Tombstoned keys read as absent
    fn get(&self, key: &[u8]) -> Result<Option<Record>> {
        Ok(self.find(key)?.filter(|record| !record.is_tombstone()))
    }

    fn scan_with_predicate(&self, pred: Option<Predicate<'_>>, max: usize) -> Result<Vec<Record>> {
        let live = self
            .iter()
            .filter(|record| !matches!(record, Ok(r) if r.is_tombstone()));
        collect_matching(live, pred, max)
    }
}

impl<H> std::fmt::Debug for DiskTable<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskTable")
            .field("name", &self.meta.name())
            .field("records", &self.meta.offsets().len())
            .field("bytes", &self.end)
            .field("path", &self.path)
            .finish()
    }
}
