//! SSTable header
//!
//! The header is self-describing: its first four bytes give its own
//! length, so a reader can pull the whole thing in one bounded read.

use bytes::{Buf, BufMut};

use crate::error::{Result, TableError};
use crate::record::ReadAt;

use super::{HEADER_PREFIX_SIZE, OFFSET_SIZE};

/// Table header: size, record count, per-record offsets and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    header_size: u32,
    offsets: Vec<u32>,
    name: String,
}

impl TableMeta {
    /// Build a header for `name` with the given record offsets
    pub fn new(name: impl Into<String>, offsets: Vec<u32>) -> Result<Self> {
        let name = name.into();
        let size = Self::header_len(name.len(), offsets.len());
        let header_size = u32::try_from(size).map_err(|_| TableError::TableTooLarge(size))?;
        Ok(Self {
            header_size,
            offsets,
            name,
        })
    }

    /// Header length for a table with this name length and record count
    pub fn header_len(name_len: usize, count: usize) -> u64 {
        HEADER_PREFIX_SIZE + OFFSET_SIZE * count as u64 + name_len as u64
    }

    /// Total header size in bytes (first field of the header)
    pub fn header_size(&self) -> u32 {
        self.header_size
    }

    /// Number of records in the table
    pub fn record_count(&self) -> u32 {
        self.offsets.len() as u32
    }

    /// Absolute file offsets of each record, in key order
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encode the header to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.header_size as usize);
        self.encode_into(&mut buf);
        buf
    }

    /// Append the header encoding to `buf`
    pub fn encode_into<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.header_size);
        buf.put_u32_le(self.record_count());
        for offset in &self.offsets {
            buf.put_u32_le(*offset);
        }
        buf.put_slice(self.name.as_bytes());
    }

    /// Decode a header from the start of `bytes`
    ///
    /// Validates that the declared record count fits inside the declared
    /// header size and that every offset points past the header, in
    /// ascending order.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if (bytes.len() as u64) < HEADER_PREFIX_SIZE {
            return Err(TableError::CorruptRecord(format!(
                "header needs at least {} bytes, got {}",
                HEADER_PREFIX_SIZE,
                bytes.len()
            )));
        }

        let mut buf = bytes;
        let header_size = buf.get_u32_le();
        let count = buf.get_u32_le();

        if header_size as usize > bytes.len() {
            return Err(TableError::CorruptRecord(format!(
                "header declares {} bytes, only {} available",
                header_size,
                bytes.len()
            )));
        }

        let needed = Self::header_len(0, count as usize);
        if needed > header_size as u64 {
            return Err(TableError::CorruptRecord(format!(
                "header of {} bytes cannot hold {} offsets",
                header_size, count
            )));
        }

        let mut offsets = Vec::with_capacity(count as usize);
        for _ in 0..count {
            offsets.push(buf.get_u32_le());
        }

        let name_bytes = &bytes[needed as usize..header_size as usize];
        let name = String::from_utf8(name_bytes.to_vec())
            .map_err(|_| TableError::CorruptRecord("table name is not valid UTF-8".to_string()))?;

        let mut previous: Option<u32> = None;
        for &offset in &offsets {
            if offset < header_size {
                return Err(TableError::CorruptRecord(format!(
                    "record offset {} points inside the {}-byte header",
                    offset, header_size
                )));
            }
            if previous.map_or(false, |p| offset <= p) {
                return Err(TableError::CorruptRecord(format!(
                    "record offsets not ascending at {}",
                    offset
                )));
            }
            previous = Some(offset);
        }

        Ok(Self {
            header_size,
            offsets,
            name,
        })
    }

    /// Read and decode the header at the start of `handle`
    ///
    /// `end` is the total size of the handle.
    pub(crate) fn read_from<H: ReadAt + ?Sized>(handle: &H, end: u64) -> Result<Self> {
        if end < HEADER_PREFIX_SIZE {
            return Err(TableError::CorruptRecord(format!(
                "table of {} bytes is shorter than a header",
                end
            )));
        }

        let mut size = [0u8; 4];
        handle
            .read_exact_at(&mut size, 0)
            .map_err(|e| TableError::from_read(e, "header size", 0))?;
        let header_size = u32::from_le_bytes(size) as u64;

        if header_size < HEADER_PREFIX_SIZE || header_size > end {
            return Err(TableError::CorruptRecord(format!(
                "declared header size {} invalid for table of {} bytes",
                header_size, end
            )));
        }

        let mut header = vec![0u8; header_size as usize];
        handle
            .read_exact_at(&mut header, 0)
            .map_err(|e| TableError::from_read(e, "header", 0))?;

        let meta = Self::decode(&header)?;
        if let Some(&last) = meta.offsets.last() {
            if last as u64 >= end {
                return Err(TableError::CorruptRecord(format!(
                    "record offset {} past end of table ({} bytes)",
                    last, end
                )));
            }
        }
        Ok(meta)
    }
}
