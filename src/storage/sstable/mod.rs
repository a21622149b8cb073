//! SSTable Module
//!
//! Sorted String Table - immutable sorted key-value storage, held either
//! fully in memory (`SortedTable`) or on disk with only its header
//! loaded (`DiskTable`).
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (8 + 4 × Count + NameLen bytes)                  │
//! │   HeaderLen: u32 | Count: u32 | Offsets: [u32; Count]   │
//! │   Name: remaining header bytes, no length prefix        │
//! ├─────────────────────────────────────────────────────────┤
//! │ Records (variable)                                      │
//! │   [KeyLen: u32][Key][ValLen: u32][Value][Version: u64]  │
//! │   ... repeated for each record, ascending by key ...    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! `Offsets[i]` is the absolute file offset of the i-th record. The first
//! record starts right after the header.

mod iterator;
mod meta;
mod reader;
mod search;
mod table;

pub use iterator::DiskTableIterator;
pub use meta::TableMeta;
pub use reader::DiskTable;
pub use table::SortedTable;

// =============================================================================
// Shared Constants (used by meta, table, reader)
// =============================================================================

/// Fixed header prefix: HeaderLen (4) + Count (4) = 8 bytes
pub(crate) const HEADER_PREFIX_SIZE: u64 = 8;

/// Bytes per entry of the offsets array
pub(crate) const OFFSET_SIZE: u64 = 4;
