//! Storage Module
//!
//! Persistent storage layer using an SSTable format.
//!
//! ## Responsibilities
//! - Build immutable sorted tables from memtable flushes
//! - Serialize tables to a byte-exact on-disk layout
//! - Binary-search persisted tables without loading their records
//! - Merge two tables, keeping the newest version of each key and
//!   dropping deleted keys
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header                                 │
//! │ ┌──────────┬──────────┬──────────────┐ │
//! │ │HeaderLen │ Count    │ Offsets      │ │
//! │ │  u32     │  u32     │ u32 × Count  │ │
//! │ └──────────┴──────────┴──────────────┘ │
//! │   followed by the table name bytes     │
//! ├────────────────────────────────────────┤
//! │ Records (sorted by key)                │
//! │ ┌────────┬─────┬────────┬───────┬────┐ │
//! │ │KeyLen  │ Key │ValLen  │ Value │Ver │ │
//! │ └────────┴─────┴────────┴───────┴────┘ │
//! │ ... (repeated for each record)        │
//! └────────────────────────────────────────┘
//! ```

mod merge;
mod sstable;

pub use merge::{merge, merge_disk};
pub use sstable::{DiskTable, DiskTableIterator, SortedTable, TableMeta};
