//! # tablekv
//!
//! The sorted-table layer of a key-value storage engine:
//! - Fixed-layout binary record codec
//! - Ordered in-memory index (memtable) with version-based conflict resolution
//! - Immutable sorted tables (SSTables) built from memtable flushes
//! - Disk-resident lookups that load only the table header
//! - Two-table merge that keeps the newest version and drops deleted keys
//!
//! ## Architecture Overview
//!
//! ```text
//!   writes ──► ┌─────────────┐  flush   ┌──────────────┐  persist
//!              │  MemTable   │ ───────► │ SortedTable  │ ─────────┐
//!              │  (RwLock)   │          │ (in memory)  │          │
//!              └─────────────┘          └──────▲───────┘          ▼
//!                                              │            ┌───────────┐
//!                                        merge │            │   file    │
//!                                              │            └─────┬─────┘
//!                                       ┌──────┴───────┐          │ open
//!                                       │  DiskTable   │ ◄────────┘
//!                                       │ (header only)│
//!                                       └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod version;

pub mod memtable;
pub mod record;
pub mod searcher;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use error::{Result, TableError};
pub use memtable::MemTable;
pub use record::{Record, TOMBSTONE};
pub use searcher::{Predicate, Searcher};
pub use storage::{merge, DiskTable, SortedTable, TableMeta};
pub use version::VersionCounter;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tablekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
