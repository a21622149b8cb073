//! In-memory SSTable
//!
//! Owns its full record list. Built from a memtable flush or a merge, then
//! serialized and written out in one pass.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, TableError};
use crate::record::{self, Record};
use crate::searcher::{collect_matching, Predicate, Searcher};

use super::meta::TableMeta;
use super::search::binary_search;

/// Immutable, sorted table held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedTable {
    meta: TableMeta,
    records: Vec<Record>,
}

impl SortedTable {
    /// Build a table from unordered records
    ///
    /// Records are sorted by key and each is assigned the file offset it
    /// will occupy once serialized, starting right after the header.
    /// Duplicate or empty keys are rejected; deduplication is the
    /// memtable's job.
    pub fn new(name: impl Into<String>, mut records: Vec<Record>) -> Result<Self> {
        let name = name.into();
        records.sort_by(|a, b| a.key.cmp(&b.key));

        for record in &records {
            if record.key.is_empty() {
                return Err(TableError::InvalidInput("record with empty key".to_string()));
            }
            if record.key.len() > u32::MAX as usize || record.value.len() > u32::MAX as usize {
                return Err(TableError::InvalidInput(format!(
                    "record field longer than {} bytes",
                    u32::MAX
                )));
            }
        }
        if let Some(pair) = records.windows(2).find(|pair| pair[0].key == pair[1].key) {
            return Err(TableError::InvalidInput(format!(
                "duplicate key {:?} in table {}",
                String::from_utf8_lossy(&pair[0].key),
                name
            )));
        }

        let mut offset = TableMeta::header_len(name.len(), records.len());
        let mut offsets = Vec::with_capacity(records.len());
        for record in &records {
            let at = u32::try_from(offset).map_err(|_| TableError::TableTooLarge(offset))?;
            offsets.push(at);
            offset += record.encoded_len() as u64;
        }

        let meta = TableMeta::new(name, offsets)?;
        tracing::debug!(
            table = meta.name(),
            records = records.len(),
            bytes = offset,
            "Built sorted table"
        );

        Ok(Self { meta, records })
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
        self.records.len()
    }

    /// True if the table holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record in key order, tombstones included
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the table, returning its records in key order
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Look up the stored record for `key`, tombstone or not
    pub fn find(&self, key: &[u8]) -> Option<&Record> {
        // In-memory probes cannot fail.
        binary_search(self.records.len(), key, |i| Ok(self.records[i].key.as_slice()))
            .ok()
            .flatten()
            .map(|i| &self.records[i])
    }

    /// Size of the serialized table in bytes
    pub fn encoded_len(&self) -> usize {
        self.meta.header_size() as usize
            + self.records.iter().map(Record::encoded_len).sum::<usize>()
    }

    /// Serialize to the on-disk layout: header, then records in offset order
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.meta.encode_into(&mut buf);
        for record in &self.records {
            record::encode_into(record, &mut buf);
        }
        buf
    }

    /// Write the serialized table to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.meta.encode())?;
        let mut buf = Vec::new();
        for record in &self.records {
            buf.clear();
            record::encode_into(record, &mut buf);
            writer.write_all(&buf)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the table to `path`, replacing any existing file, and fsync it
    pub fn persist(&self, path: &Path) -> Result<()> {
        self.persist_to(path, true)
    }

    /// Write the table to the path chosen by `name_fn` from the table name
    pub fn persist_with<F>(&self, name_fn: F) -> Result<PathBuf>
    where
        F: FnOnce(&str) -> PathBuf,
    {
        let path = name_fn(self.name());
        self.persist(&path)?;
        Ok(path)
    }

    /// Write the table under `config.data_dir` with a generated file name
    pub fn persist_in(&self, config: &Config) -> Result<PathBuf> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;
        let path = config.table_path(self.name());
        self.persist_to(&path, config.sync_on_persist)?;
        Ok(path)
    }

    /// The file is closed on every path out of here; a failed write
    /// removes the partial file.
    fn persist_to(&self, path: &Path, sync: bool) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        match self.write_file(file, sync) {
            Ok(()) => {
                tracing::debug!(
                    table = self.name(),
                    path = %path.display(),
                    records = self.len(),
                    "Persisted sorted table"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to persist table");
                if let Err(rm) = fs::remove_file(path) {
                    tracing::warn!(path = %path.display(), error = %rm, "Failed to remove partial table");
                }
                Err(e)
            }
        }
    }

    fn write_file(&self, file: File, sync: bool) -> Result<()> {
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        let file = writer
            .into_inner()
            .map_err(|e| TableError::Io(e.into_error()))?;
        if sync {
            file.sync_all()?;
        }
        Ok(())
    }
}

impl Searcher for SortedTable {
    /// Tombstoned keys read as absent
    fn get(&self, key: &[u8]) -> Result<Option<Record>> {
        Ok(self
            .find(key)
            .filter(|record| !record.is_tombstone())
            .cloned())
    }

    fn scan_with_predicate(&self, pred: Option<Predicate<'_>>, max: usize) -> Result<Vec<Record>> {
        let live = self
            .records
            .iter()
            .filter(|record| !record.is_tombstone())
            .cloned()
            .map(Ok);
        collect_matching(live, pred, max)
    }
}
