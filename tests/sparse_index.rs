use std::cell::RefCell;
use std::rc::Rc;

use sparse_storage::{
    CallSite, LogLevel, Logger, SparseIndex, SparseIndexConfig, NULL_ENTITY,
};

/// Index with a small bucket capacity so structural changes are easy to force.
fn small_index(bucket_capacity: usize) -> SparseIndex {
    SparseIndex::with_config(SparseIndexConfig {
        initial_capacity: bucket_capacity,
        growth_factor: 2.0,
        bucket_capacity,
    })
}

#[test]
fn insert_assigns_dense_positions_in_order() {
    let mut index = SparseIndex::new();
    assert_eq!(index.insert(100).unwrap(), 0);
    assert_eq!(index.insert(7).unwrap(), 1);
    assert_eq!(index.insert(5000).unwrap(), 2);

    assert_eq!(index.len(), 3);
    assert_eq!(index.get(100), Some(0));
    assert_eq!(index.get(7), Some(1));
    assert_eq!(index.get(5000), Some(2));
}

#[test]
fn insert_is_idempotent() {
    let mut index = SparseIndex::new();
    let first = index.insert(42).unwrap();
    index.insert(7).unwrap();

    // Re-inserting keeps the original mapping untouched.
    assert_eq!(index.insert(42).unwrap(), first);
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(42), Some(first));
}

#[test]
fn absent_keys_are_explicitly_absent() {
    let mut index = SparseIndex::new();
    index.insert(3).unwrap();

    assert_eq!(index.get(4), None);
    assert!(!index.contains(4));
    assert_eq!(index.remove(4), None);
    assert_eq!(index.len(), 1);
}

#[test]
fn remove_swaps_last_key_into_vacated_position() {
    let mut index = SparseIndex::new();
    index.insert(10).unwrap();
    index.insert(20).unwrap();
    index.insert(30).unwrap();

    assert_eq!(index.remove(10), Some(0));

    // The previously-last key took over position 0.
    assert_eq!(index.get(30), Some(0));
    assert_eq!(index.get(20), Some(1));
    assert_eq!(index.len(), 2);
}

#[test]
fn full_bucket_splits_on_insert() {
    let mut index = small_index(4);
    for key in 0..4 {
        index.insert(key).unwrap();
    }
    assert_eq!(index.bucket_count(), 1);

    // Fifth insert: the covering bucket is full, so it distributes its upper
    // half into a new bucket before the key lands.
    index.insert(4).unwrap();
    assert_eq!(index.bucket_count(), 2);
    assert_eq!(index.bucket_sizes(), vec![2, 3]);

    for key in 0..5 {
        assert_eq!(index.get(key), Some(key as usize), "key {key} lost by split");
    }
}

#[test]
fn underfilled_bucket_merges_with_next() {
    let mut index = small_index(4);
    for key in 0..8 {
        index.insert(key).unwrap();
    }
    assert_eq!(index.bucket_sizes(), vec![2, 2, 4]);

    index.remove(0);
    assert_eq!(index.bucket_sizes(), vec![3, 4]);
    for key in 1..8 {
        assert!(index.contains(key), "key {key} lost by merge");
    }
}

#[test]
fn underfilled_bucket_rebalances_when_merge_does_not_fit() {
    let mut index = small_index(4);
    for key in 0..12 {
        index.insert(key).unwrap();
    }
    assert_eq!(index.bucket_sizes(), vec![2, 2, 2, 2, 4]);

    // Dropping a middle bucket below half capacity next to a full bucket
    // cannot merge (2 + 4 > 4), so occupancy is evened out instead.
    index.remove(6);
    assert_eq!(index.bucket_sizes(), vec![2, 2, 2, 2, 3]);
    assert_eq!(index.bucket_count(), 5);

    // Key 11 was swapped into the vacated dense slot.
    assert_eq!(index.get(11), Some(6));
    for key in (7..12).chain(0..6) {
        assert!(index.contains(key), "key {key} lost by rebalance");
    }
}

#[test]
fn occupancy_bound_holds_under_removal() {
    let mut index = small_index(4);
    for key in 0..32 {
        index.insert(key).unwrap();
    }

    for key in 0..32 {
        index.remove(key);
        let sizes = index.bucket_sizes();
        if let Some((_, rest)) = sizes.split_last() {
            for (i, size) in rest.iter().enumerate() {
                assert!(
                    *size >= 2,
                    "bucket {i} under-occupied after removing {key}: {sizes:?}"
                );
            }
        }
        for live in key + 1..32 {
            assert!(index.contains(live), "key {live} lost after removing {key}");
        }
    }
    assert!(index.is_empty());
    assert_eq!(index.bucket_count(), 0);
}

#[test]
fn last_empty_bucket_is_destroyed() {
    let mut index = small_index(4);
    index.insert(9).unwrap();
    assert_eq!(index.bucket_count(), 1);

    index.remove(9);
    assert_eq!(index.bucket_count(), 0);
    assert!(index.is_empty());
}

#[test]
fn clear_releases_buckets_but_keeps_dense_capacity() {
    let mut index = small_index(4);
    for key in 0..10 {
        index.insert(key).unwrap();
    }
    let capacity = index.capacity();

    index.clear();
    assert!(index.is_empty());
    assert_eq!(index.bucket_count(), 0);
    assert!(!index.contains(3));
    assert_eq!(index.capacity(), capacity);

    // Positions restart from zero.
    assert_eq!(index.insert(77).unwrap(), 0);
}

#[test]
fn dense_array_grows_geometrically() {
    let mut index = SparseIndex::with_config(SparseIndexConfig {
        initial_capacity: 2,
        growth_factor: 2.0,
        bucket_capacity: 4,
    });
    assert_eq!(index.capacity(), 0);

    for key in 0..5 {
        index.insert(key).unwrap();
    }
    assert_eq!(index.len(), 5);
    assert!(index.capacity() >= 5);
}

#[test]
fn iteration_is_dense_order_and_double_ended() {
    let mut index = SparseIndex::new();
    index.insert(100).unwrap();
    index.insert(200).unwrap();
    index.insert(300).unwrap();

    let forward: Vec<_> = index.iter().collect();
    assert_eq!(forward, vec![(100, 0), (200, 1), (300, 2)]);

    let backward: Vec<_> = index.iter().rev().collect();
    assert_eq!(backward, vec![(300, 2), (200, 1), (100, 0)]);

    assert_eq!(index.iter().len(), 3);
}

#[test]
fn null_entity_is_an_ordinary_key() {
    let mut index = SparseIndex::new();
    let position = index.insert(NULL_ENTITY).unwrap();
    assert_eq!(index.get(NULL_ENTITY), Some(position));
    assert_eq!(index.remove(NULL_ENTITY), Some(position));
}

#[derive(Default, Clone)]
struct CaptureLogger {
    records: Rc<RefCell<Vec<(LogLevel, String)>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, level: LogLevel, message: &str, site: CallSite) {
        assert!(!site.file.is_empty());
        self.records.borrow_mut().push((level, message.to_owned()));
    }
}

#[test]
fn structural_changes_reach_the_injected_logger() {
    let capture = CaptureLogger::default();
    let records = capture.records.clone();

    let mut index = small_index(4).with_logger(Box::new(capture));
    for key in 0..5 {
        index.insert(key).unwrap();
    }

    let captured = records.borrow();
    assert!(captured
        .iter()
        .any(|(level, message)| *level == LogLevel::Debug && message.contains("split")));
    assert!(captured
        .iter()
        .any(|(level, message)| *level == LogLevel::Trace && message.contains("created")));
}

#[test]
fn log_levels_are_ordered() {
    assert!(LogLevel::Trace < LogLevel::Debug);
    assert!(LogLevel::Debug < LogLevel::Info);
    assert!(LogLevel::Info < LogLevel::Warn);
    assert!(LogLevel::Warn < LogLevel::Error);
    assert!(LogLevel::Error < LogLevel::Fatal);
}
