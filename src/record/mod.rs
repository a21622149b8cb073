//! Record Module
//!
//! A single key/value/version triple and its fixed binary layout.
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬───────┬────────────────┬───────┬──────────────┐
//! │ KeyLen u32   │  Key  │ ValueLen u32   │ Value │ Version u64  │
//! └──────────────┴───────┴────────────────┴───────┴──────────────┘
//! ```
//! All integers are little-endian. There is no padding: the size of a
//! record is fully determined by its two length fields.

mod codec;
mod handle;

pub use codec::{decode, decode_at, decode_key_at, decode_prefix, encode, encode_into};
pub(crate) use codec::{decode_at_within, decode_key_at_within};
pub use handle::ReadAt;

/// Reserved value marking a deleted key
pub const TOMBSTONE: &[u8] = b"#DELETED#";

/// Fixed bytes per record: KeyLen (4) + ValueLen (4) + Version (8)
pub const RECORD_OVERHEAD: usize = 16;

/// A key with its value and the version that wrote it
///
/// The version only breaks ties between writes of the same key; the
/// higher one wins. It is not a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub version: u64,
}

impl Record {
    /// Create a live record
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>, version: u64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            version,
        }
    }

    /// Create a record that deletes `key`
    pub fn tombstone(key: impl Into<Vec<u8>>, version: u64) -> Self {
        Self::new(key, TOMBSTONE, version)
    }

    /// True if this record marks its key as deleted
    pub fn is_tombstone(&self) -> bool {
        self.value == TOMBSTONE
    }

    /// Size of this record once encoded
    pub fn encoded_len(&self) -> usize {
        RECORD_OVERHEAD + self.key.len() + self.value.len()
    }

    /// Whichever of `self` and `other` carries the higher version.
    ///
    /// On equal versions `self` is kept.
    pub fn newest<'a>(&'a self, other: &'a Record) -> &'a Record {
        if other.version > self.version {
            other
        } else {
            self
        }
    }
}
