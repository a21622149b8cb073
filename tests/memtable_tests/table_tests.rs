//! MemTable Tests
//!
//! Tests verify:
//! - Insert / lookup with version-based conflict resolution
//! - Size tracking
//! - Tombstone handling
//! - Sorted scans with limit and predicate
//! - Flush to a sorted table
//! - Concurrent access patterns

use std::sync::Arc;

use tablekv::memtable::MemTable;
use tablekv::{Record, Searcher, VersionCounter, TOMBSTONE};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let memtable = MemTable::new();
    assert_eq!(memtable.entry_count(), 0);
    assert_eq!(memtable.size(), 0);
    assert!(memtable.is_empty());
    assert_eq!(memtable.max_version(), 0);
}

#[test]
fn test_insert_and_get() {
    let memtable = MemTable::new();

    assert!(memtable.insert(b"key1".to_vec(), b"value1".to_vec(), 1));

    let result = memtable.get(b"key1").unwrap();
    assert_eq!(result, Some(Record::new("key1", "value1", 1)));
    assert!(memtable.contains(b"key1").unwrap());
}

#[test]
fn test_get_nonexistent_key() {
    let memtable = MemTable::new();

    assert_eq!(memtable.get(b"nonexistent").unwrap(), None);
    assert!(!memtable.contains(b"nonexistent").unwrap());
}

#[test]
fn test_higher_version_wins() {
    let memtable = MemTable::new();

    memtable.insert(b"k".to_vec(), b"v1".to_vec(), 1);
    assert!(memtable.insert(b"k".to_vec(), b"v2".to_vec(), 2));

    assert_eq!(memtable.entry_count(), 1);
    assert_eq!(memtable.get(b"k").unwrap(), Some(Record::new("k", "v2", 2)));
}

#[test]
fn test_lower_or_equal_version_is_ignored() {
    let memtable = MemTable::new();

    memtable.insert(b"k".to_vec(), b"new".to_vec(), 5);
    assert!(!memtable.insert(b"k".to_vec(), b"old".to_vec(), 3));
    assert!(!memtable.insert(b"k".to_vec(), b"same".to_vec(), 5));

    assert_eq!(memtable.get(b"k").unwrap(), Some(Record::new("k", "new", 5)));
}

#[test]
fn test_put_assigns_increasing_versions() {
    let memtable = MemTable::new();

    let v1 = memtable.put(b"a".to_vec(), b"1".to_vec());
    let v2 = memtable.put(b"b".to_vec(), b"2".to_vec());
    let v3 = memtable.put(b"a".to_vec(), b"3".to_vec());

    assert!(v1 < v2 && v2 < v3);
    assert_eq!(memtable.get(b"a").unwrap(), Some(Record::new("a", "3", v3)));
    assert_eq!(memtable.max_version(), v3);
}

#[test]
fn test_shared_counter_across_memtables() {
    let counter = Arc::new(VersionCounter::new());
    let first = MemTable::with_counter(Arc::clone(&counter));
    let second = MemTable::with_counter(Arc::clone(&counter));

    let a = first.put(b"k".to_vec(), b"first".to_vec());
    let b = second.put(b"k".to_vec(), b"second".to_vec());
    let c = first.put(b"other".to_vec(), b"x".to_vec());

    assert!(a < b && b < c);
    assert_eq!(counter.current(), c);
}

#[test]
fn test_put_after_explicit_insert_is_newer() {
    let memtable = MemTable::new();
    memtable.insert(b"k".to_vec(), b"explicit".to_vec(), 100);

    let version = memtable.put(b"k".to_vec(), b"later".to_vec());

    assert!(version > 100);
    assert_eq!(
        memtable.get(b"k").unwrap(),
        Some(Record::new("k", "later", version))
    );
    assert_eq!(memtable.max_version(), version);
}

#[test]
fn test_delete_after_explicit_insert_shadows_it() {
    let memtable = MemTable::new();
    memtable.insert(b"k".to_vec(), b"explicit".to_vec(), 50);

    let version = memtable.delete(b"k".to_vec());

    assert!(version > 50);
    let table = memtable.flush_to_table("t").unwrap();
    assert!(table.find(b"k").unwrap().is_tombstone());
}

#[test]
fn test_insert_raises_shared_counter() {
    let counter = Arc::new(VersionCounter::new());
    let first = MemTable::with_counter(Arc::clone(&counter));
    let second = MemTable::with_counter(Arc::clone(&counter));

    first.insert(b"k".to_vec(), b"v".to_vec(), 42);
    assert_eq!(counter.current(), 42);

    // A lower explicit version leaves the counter alone.
    second.insert(b"j".to_vec(), b"v".to_vec(), 7);
    assert_eq!(counter.current(), 42);
    assert_eq!(second.put(b"j".to_vec(), b"w".to_vec()), 43);
}

// =============================================================================
// Delete / Tombstone Tests
// =============================================================================

#[test]
fn test_delete_creates_tombstone() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());
    let version = memtable.delete(b"key1".to_vec());

    let record = memtable.get(b"key1").unwrap().unwrap();
    assert!(record.is_tombstone());
    assert_eq!(record.version, version);
    assert_eq!(memtable.entry_count(), 1); // Tombstone still counts as entry
}

#[test]
fn test_delete_nonexistent_key() {
    let memtable = MemTable::new();

    memtable.delete(b"nonexistent".to_vec());

    let record = memtable.get(b"nonexistent").unwrap().unwrap();
    assert_eq!(record.value, TOMBSTONE);
    assert_eq!(memtable.entry_count(), 1);
}

#[test]
fn test_put_after_delete() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());
    memtable.delete(b"key1".to_vec());
    let version = memtable.put(b"key1".to_vec(), b"value2".to_vec());

    assert_eq!(memtable.get(b"key1").unwrap(), Some(Record::new("key1", "value2", version)));
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_size_tracking_put() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"value".to_vec());

    let expected_size = b"key".len() + b"value".len();
    assert_eq!(memtable.size(), expected_size);
}

#[test]
fn test_size_tracking_overwrite() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"short".to_vec());
    let size_after_first = memtable.size();

    memtable.put(b"key".to_vec(), b"much_longer_value".to_vec());
    let size_after_second = memtable.size();

    assert_eq!(size_after_first, b"key".len() + b"short".len());
    assert_eq!(size_after_second, b"key".len() + b"much_longer_value".len());
}

#[test]
fn test_size_tracking_delete() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"value".to_vec());
    memtable.delete(b"key".to_vec());

    assert_eq!(memtable.size(), b"key".len()); // Tombstone = just key
}

#[test]
fn test_size_unchanged_by_stale_insert() {
    let memtable = MemTable::new();

    memtable.insert(b"key".to_vec(), b"value".to_vec(), 10);
    memtable.insert(b"key".to_vec(), b"a much longer stale value".to_vec(), 2);

    assert_eq!(memtable.size(), b"key".len() + b"value".len());
}

#[test]
fn test_should_flush() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"value".to_vec());

    let size = memtable.size();
    assert!(!memtable.should_flush(1000));
    assert!(memtable.should_flush(size - 1));
    assert!(memtable.should_flush(size));
}

#[test]
fn test_clear() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());
    memtable.put(b"key2".to_vec(), b"value2".to_vec());
    assert_eq!(memtable.entry_count(), 2);

    memtable.clear();

    assert_eq!(memtable.entry_count(), 0);
    assert_eq!(memtable.size(), 0);
    assert!(memtable.is_empty());
    assert_eq!(memtable.get(b"key1").unwrap(), None);
}

// =============================================================================
// Scan Tests
// =============================================================================

fn filled(keys: &[&str]) -> MemTable {
    let memtable = MemTable::new();
    for key in keys {
        memtable.put(key.as_bytes().to_vec(), format!("v-{}", key).into_bytes());
    }
    memtable
}

fn keys_of(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| String::from_utf8(r.key.clone()).unwrap())
        .collect()
}

#[test]
fn test_scan_empty() {
    let memtable = MemTable::new();
    assert!(memtable.scan().unwrap().is_empty());
}

#[test]
fn test_scan_sorted_order() {
    let memtable = filled(&["cherry", "apple", "banana"]);

    let records = memtable.scan().unwrap();
    assert_eq!(keys_of(&records), vec!["apple", "banana", "cherry"]);
}

#[test]
fn test_scan_includes_tombstones() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());
    memtable.delete(b"key2".to_vec());
    memtable.put(b"key3".to_vec(), b"value3".to_vec());

    let records = memtable.scan().unwrap();
    assert_eq!(records.len(), 3);
    assert!(!records[0].is_tombstone());
    assert!(records[1].is_tombstone());
    assert!(!records[2].is_tombstone());
}

#[test]
fn test_scan_is_a_snapshot() {
    let memtable = MemTable::new();
    memtable.put(b"key".to_vec(), b"value".to_vec());

    let records = memtable.scan().unwrap();
    memtable.put(b"key".to_vec(), b"modified".to_vec());

    assert_eq!(records[0].value, b"value");
}

#[test]
fn test_iter_snapshot_in_key_order() {
    let memtable = MemTable::new();
    memtable.put(b"c".to_vec(), b"3".to_vec());
    memtable.put(b"a".to_vec(), b"1".to_vec());
    memtable.delete(b"b".to_vec());

    let iter = memtable.iter();
    assert_eq!(iter.len(), 3);

    // Writes after the snapshot are not visible to it.
    memtable.put(b"d".to_vec(), b"4".to_vec());

    let records: Vec<Record> = iter.collect();
    let keys: Vec<&[u8]> = records.iter().map(|r| r.key.as_slice()).collect();
    assert_eq!(keys, vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
    assert_eq!(records[1].value, TOMBSTONE);
    assert_eq!(memtable.iter().count(), 4);
}

#[test]
fn test_scan_with_limit() {
    let memtable = filled(&["e", "d", "c", "b", "a"]);

    assert_eq!(keys_of(&memtable.scan_with_limit(2).unwrap()), vec!["a", "b"]);
    assert_eq!(memtable.scan_with_limit(10).unwrap().len(), 5);
    assert!(memtable.scan_with_limit(0).unwrap().is_empty());
}

#[test]
fn test_scan_with_predicate_limits_results_not_visits() {
    let memtable = filled(&["a1", "b1", "a2", "b2", "a3", "b3"]);
    let starts_with_b = |key: &[u8], _: &[u8]| key.starts_with(b"b");

    let records = memtable.scan_with_predicate(Some(&starts_with_b), 2).unwrap();
    assert_eq!(keys_of(&records), vec!["b1", "b2"]);

    let all = memtable.scan_with_predicate(Some(&starts_with_b), 100).unwrap();
    assert_eq!(keys_of(&all), vec!["b1", "b2", "b3"]);
}

#[test]
fn test_scan_with_predicate_on_value() {
    let memtable = MemTable::new();
    memtable.put(b"a".to_vec(), b"keep".to_vec());
    memtable.put(b"b".to_vec(), b"drop".to_vec());
    memtable.put(b"c".to_vec(), b"keep".to_vec());

    let keep = |_: &[u8], value: &[u8]| value == b"keep";
    let records = memtable.scan_with_predicate(Some(&keep), usize::MAX).unwrap();
    assert_eq!(keys_of(&records), vec!["a", "c"]);
}

#[test]
fn test_scan_without_predicate_is_limit_scan() {
    let memtable = filled(&["x", "y", "z"]);
    assert_eq!(
        memtable.scan_with_predicate(None, 2).unwrap(),
        memtable.scan_with_limit(2).unwrap()
    );
}

#[test]
fn test_many_entries_adversarial_order() {
    let memtable = MemTable::new();

    // Ascending inserts are the worst case for an unbalanced tree.
    for i in 0..10_000 {
        let key = format!("key{:05}", i).into_bytes();
        memtable.insert(key, b"v".to_vec(), i + 1);
    }

    assert_eq!(memtable.entry_count(), 10_000);
    let records = memtable.scan().unwrap();
    for pair in records.windows(2) {
        assert!(pair[0].key < pair[1].key);
    }
    assert!(memtable.contains(b"key09999").unwrap());
}

// =============================================================================
// Flush Tests
// =============================================================================

#[test]
fn test_flush_to_table_orders_and_offsets() {
    let memtable = MemTable::new();
    memtable.insert(b"a".to_vec(), b"1".to_vec(), 1);
    memtable.insert(b"c".to_vec(), b"3".to_vec(), 1);
    memtable.insert(b"b".to_vec(), b"2".to_vec(), 1);

    let table = memtable.flush_to_table("t").unwrap();

    assert_eq!(table.name(), "t");
    assert_eq!(keys_of(table.records()), vec!["a", "b", "c"]);

    // Header: 8 + 4 * 3 offsets + 1 name byte = 21; each record is 16 + 1 + 1.
    let meta = table.meta();
    assert_eq!(meta.header_size(), 21);
    assert_eq!(meta.offsets(), &[21u32, 39, 57]);
}

#[test]
fn test_flush_keeps_only_newest_version() {
    let memtable = MemTable::new();
    memtable.insert(b"k".to_vec(), b"v1".to_vec(), 1);
    memtable.insert(b"k".to_vec(), b"v2".to_vec(), 2);

    let table = memtable.flush_to_table("t").unwrap();

    assert_eq!(table.records(), &[Record::new("k", "v2", 2)]);
}

#[test]
fn test_flush_carries_tombstones() {
    let memtable = MemTable::new();
    memtable.put(b"live".to_vec(), b"v".to_vec());
    memtable.delete(b"dead".to_vec());

    let table = memtable.flush_to_table("t").unwrap();

    assert_eq!(table.len(), 2);
    assert!(table.find(b"dead").unwrap().is_tombstone());
    assert_eq!(table.get(b"dead").unwrap(), None);
}

// =============================================================================
// Concurrent Access Tests (Basic)
// =============================================================================

#[test]
fn test_concurrent_reads() {
    use std::thread;

    let memtable = Arc::new(MemTable::new());
    let version = memtable.put(b"key".to_vec(), b"value".to_vec());

    let mut handles = vec![];

    for _ in 0..10 {
        let mt = Arc::clone(&memtable);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                let result = mt.get(b"key").unwrap();
                assert_eq!(result, Some(Record::new("key", "value", version)));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_writes() {
    use std::thread;

    let memtable = Arc::new(MemTable::new());

    let mut handles = vec![];

    for i in 0..10 {
        let mt = Arc::clone(&memtable);
        let handle = thread::spawn(move || {
            for j in 0..10 {
                let key = format!("key{}_{}", i, j).into_bytes();
                let value = format!("value{}_{}", i, j).into_bytes();
                mt.put(key, value);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(memtable.entry_count(), 100);
    assert_eq!(memtable.max_version(), 100);
}
