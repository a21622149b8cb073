//! Read interface shared by the memtable and both table kinds

use crate::error::Result;
use crate::record::Record;

/// Filter applied to `(key, value)` during a scan
pub type Predicate<'a> = &'a dyn Fn(&[u8], &[u8]) -> bool;

/// Point lookups and ordered scans
///
/// Every scan yields records in ascending key order. `max` bounds the
/// number of records returned, not the number visited.
pub trait Searcher {
    /// True if `key` has a visible record
    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// The visible record for `key`, if any
    fn get(&self, key: &[u8]) -> Result<Option<Record>>;

    /// Every visible record
    fn scan(&self) -> Result<Vec<Record>> {
        self.scan_with_predicate(None, usize::MAX)
    }

    /// The first `max` visible records
    fn scan_with_limit(&self, max: usize) -> Result<Vec<Record>> {
        self.scan_with_predicate(None, max)
    }

    /// The first `max` visible records accepted by `pred`
    ///
    /// With no predicate this is `scan_with_limit`.
    fn scan_with_predicate(&self, pred: Option<Predicate<'_>>, max: usize) -> Result<Vec<Record>>;
}

/// Collect up to `max` records from `records` that pass `pred`.
///
/// Stops pulling from the source as soon as `max` records are collected.
pub(crate) fn collect_matching<I>(records: I, pred: Option<Predicate<'_>>, max: usize) -> Result<Vec<Record>>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let mut out = Vec::new();
    if max == 0 {
        return Ok(out);
    }
    for record in records {
        let record = record?;
        if pred.map_or(true, |p| p(&record.key, &record.value)) {
            out.push(record);
            if out.len() == max {
                break;
            }
        }
    }
    Ok(out)
}
