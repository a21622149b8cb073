//! Binary search shared by the in-memory and disk-resident tables

use std::cmp::Ordering;

use crate::error::Result;

/// Find the slot holding `target` among `len` slots sorted by key.
///
/// `key_at(i)` produces the key of slot `i`; for disk tables this is a
/// positioned read, so it may fail. The window is half-open `[lo, hi)`, so
/// narrowing past slot 0 never needs a negative bound.
pub(crate) fn binary_search<F, K>(len: usize, target: &[u8], mut key_at: F) -> Result<Option<usize>>
where
    F: FnMut(usize) -> Result<K>,
    K: AsRef<[u8]>,
{
    let mut lo = 0usize;
    let mut hi = len;

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let key = key_at(mid)?;
        match target.cmp(key.as_ref()) {
            Ordering::Equal => return Ok(Some(mid)),
            Ordering::Less => hi = mid,
            Ordering::Greater => lo = mid + 1,
        }
    }
    Ok(None)
}
