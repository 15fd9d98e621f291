use sparse_storage::{SlotAllocator, StorageError};

#[test]
fn next_mints_sequential_slots_and_tracks_dense_size() {
    let mut alloc = SlotAllocator::new();
    assert!(alloc.is_empty());

    for expected in 0..8 {
        let slot = alloc.next();
        assert_eq!(slot, expected);
        assert_eq!(alloc.at(slot).unwrap(), Some(expected));
    }
    assert_eq!(alloc.len(), 8);
    assert_eq!(alloc.dense_size(), 8);
}

#[test]
fn erase_marks_undirected_and_dense_size_matches_live_count() {
    let mut alloc = SlotAllocator::new();
    let slots: Vec<_> = (0..6).map(|_| alloc.next()).collect();

    alloc.erase(slots[1]).unwrap();
    alloc.erase(slots[4]).unwrap();

    assert_eq!(alloc.at(slots[1]).unwrap(), None);
    assert_eq!(alloc.at(slots[4]).unwrap(), None);
    assert_eq!(alloc.len(), 6);
    assert_eq!(alloc.dense_size(), 4);
}

#[test]
fn free_list_is_reused_before_minting_new_slots() {
    let mut alloc = SlotAllocator::new();
    let slots: Vec<_> = (0..5).map(|_| alloc.next()).collect();

    alloc.erase(slots[2]).unwrap();
    alloc.erase(slots[0]).unwrap();
    assert_eq!(alloc.dense_size(), 3);

    // Recycled in LIFO order, then fresh ids.
    assert_eq!(alloc.next(), slots[0]);
    assert_eq!(alloc.next(), slots[2]);
    assert_eq!(alloc.next(), 5);
    assert_eq!(alloc.dense_size(), 6);
    assert_eq!(alloc.len(), 6);
}

#[test]
fn erase_contract_violations_are_invalid_slot_errors() {
    let mut alloc = SlotAllocator::new();
    let slot = alloc.next();

    // Never-allocated slot.
    assert!(matches!(
        alloc.erase(99),
        Err(StorageError::InvalidSlot(e)) if e.slot == 99
    ));

    // Double erase.
    alloc.erase(slot).unwrap();
    assert!(matches!(
        alloc.erase(slot),
        Err(StorageError::InvalidSlot(e)) if e.slot == slot
    ));
}

#[test]
fn put_rewrites_live_entries_only() {
    let mut alloc = SlotAllocator::new();
    let a = alloc.next();
    let b = alloc.next();

    // Simulate a compensating swap: b's element moved to a's old position.
    alloc.put(b, 0).unwrap();
    assert_eq!(alloc.at(b).unwrap(), Some(0));
    assert_eq!(alloc.at(a).unwrap(), Some(0));

    alloc.erase(a).unwrap();
    assert!(matches!(alloc.put(a, 3), Err(StorageError::InvalidSlot(_))));
    assert!(matches!(alloc.put(42, 3), Err(StorageError::OutOfBounds(_))));
}

#[test]
fn at_reports_out_of_range_reads() {
    let mut alloc = SlotAllocator::new();
    assert!(matches!(
        alloc.at(0),
        Err(StorageError::OutOfBounds(e)) if e.index == 0 && e.max_valid_index.is_none()
    ));

    alloc.next();
    alloc.next();
    assert!(matches!(
        alloc.at(5),
        Err(StorageError::OutOfBounds(e)) if e.index == 5 && e.max_valid_index == Some(1)
    ));
}

#[test]
fn clear_resets_to_empty_state() {
    let mut alloc = SlotAllocator::new();
    for _ in 0..4 {
        alloc.next();
    }
    alloc.erase(1).unwrap();

    alloc.clear();
    assert!(alloc.is_empty());
    assert_eq!(alloc.dense_size(), 0);

    // Fresh ids start over; the old free list is gone.
    assert_eq!(alloc.next(), 0);
    assert_eq!(alloc.dense_size(), 1);
}
