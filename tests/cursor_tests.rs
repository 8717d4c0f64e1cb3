//! Fail-fast cursor protocol tests.
//!
//! A cursor captures the map's generation counter when created and checks
//! it on every step, so any structural modification performed outside the
//! cursor is reported instead of silently walking stale structure. Removal
//! through the cursor itself resynchronizes the snapshot and keeps the
//! cursor live.

use dualmap::{CursorError, DualOrderedMap};
use rstest::rstest;

fn sample() -> DualOrderedMap<i32, i32> {
    DualOrderedMap::try_from_iter((0..8).map(|n| (n, n * 10))).unwrap()
}

// =============================================================================
// Structural Change Detection
// =============================================================================

#[rstest]
fn next_fails_after_a_put() {
    let mut map = sample();
    let mut cursor = map.cursor();

    map.put(100, 1000).unwrap();
    assert_eq!(cursor.next(&map), Err(CursorError::StructuralChange));
}

#[rstest]
fn next_fails_after_a_map_remove() {
    let mut map = sample();
    let mut cursor = map.cursor();

    map.remove(&3);
    assert_eq!(cursor.next(&map), Err(CursorError::StructuralChange));
}

#[rstest]
fn next_fails_after_a_value_side_remove() {
    let mut map = sample();
    let mut cursor = map.cursor_by_value();

    map.remove_value(&30);
    assert_eq!(cursor.next(&map), Err(CursorError::StructuralChange));
}

#[rstest]
fn next_fails_after_clear() {
    let mut map = sample();
    let mut cursor = map.cursor();

    map.clear();
    assert_eq!(cursor.next(&map), Err(CursorError::StructuralChange));
}

#[rstest]
fn clear_of_an_empty_map_is_still_a_modification() {
    let mut map: DualOrderedMap<i32, i32> = DualOrderedMap::new();
    let cursor = map.cursor();

    map.clear();
    assert_eq!(cursor.has_next(&map), Err(CursorError::StructuralChange));
}

#[rstest]
fn has_next_performs_the_same_check() {
    let mut map = sample();
    let cursor = map.cursor();

    map.put(100, 1000).unwrap();
    assert_eq!(cursor.has_next(&map), Err(CursorError::StructuralChange));
}

#[rstest]
fn failed_mutations_do_not_trip_the_cursor() {
    let mut map = sample();
    let mut cursor = map.cursor();

    // A rejected put and a missed remove are not structural changes,
    // even though the duplicate-value rejection briefly touched the key
    // tree before rolling back.
    assert!(map.put(3, 999).is_err());
    assert!(map.put(999, 30).is_err());
    assert_eq!(map.remove(&77), None);

    assert_eq!(cursor.next(&map).unwrap(), Some((&0, &0)));
}

#[rstest]
fn lookups_do_not_trip_the_cursor() {
    let map = sample();
    let mut cursor = map.cursor();

    cursor.next(&map).unwrap();
    assert_eq!(map.get(&5), Some(&50));
    assert!(map.contains_value(&70));
    assert_eq!(cursor.next(&map).unwrap(), Some((&1, &10)));
}

#[rstest]
fn removal_through_one_cursor_invalidates_another() {
    let mut map = sample();
    let mut first = map.cursor();
    let mut second = map.cursor();

    first.next(&map).unwrap();
    first.remove(&mut map).unwrap();

    assert_eq!(second.next(&map), Err(CursorError::StructuralChange));
    // The removing cursor itself stays live.
    assert_eq!(first.next(&map).unwrap(), Some((&1, &10)));
}

// =============================================================================
// Removal Protocol
// =============================================================================

#[rstest]
fn remove_before_any_next_is_invalid() {
    let mut map = sample();
    let mut cursor = map.cursor();
    assert_eq!(cursor.remove(&mut map), Err(CursorError::InvalidState));
}

#[rstest]
fn remove_twice_for_one_entry_is_invalid() {
    let mut map = sample();
    let mut cursor = map.cursor();

    cursor.next(&map).unwrap();
    assert_eq!(cursor.remove(&mut map), Ok((0, 0)));
    assert_eq!(cursor.remove(&mut map), Err(CursorError::InvalidState));

    // Exactly one entry went away.
    assert_eq!(map.len(), 7);
}

#[rstest]
fn remove_after_a_foreign_put_reports_the_change() {
    let mut map = sample();
    let mut cursor = map.cursor();

    cursor.next(&map).unwrap();
    map.put(100, 1000).unwrap();
    assert_eq!(cursor.remove(&mut map), Err(CursorError::StructuralChange));
}

#[rstest]
fn cursor_removal_keeps_the_cursor_live() {
    let mut map = sample();
    let mut cursor = map.cursor();
    let mut removed = Vec::new();

    while let Some((&key, _)) = cursor.next(&map).unwrap() {
        if key % 2 == 0 {
            let (key, value) = cursor.remove(&mut map).unwrap();
            removed.push((key, value));
        }
    }

    assert_eq!(removed, vec![(0, 0), (2, 20), (4, 40), (6, 60)]);
    assert_eq!(map.len(), 4);

    // Removed entries are gone from both orderings.
    for (key, value) in removed {
        assert_eq!(map.get(&key), None);
        assert_eq!(map.get_key_for_value(&value), None);
    }
}

#[rstest]
fn removing_every_entry_through_the_cursor_empties_the_map() {
    let mut map = sample();
    let mut cursor = map.cursor_by_value();

    while cursor.next(&map).unwrap().is_some() {
        cursor.remove(&mut map).unwrap();
    }
    assert!(map.is_empty());
}

#[rstest]
fn the_last_entry_can_be_removed_after_exhaustion() {
    let mut map = DualOrderedMap::try_from_iter([(1, 10), (2, 20)]).unwrap();
    let mut cursor = map.cursor();

    cursor.next(&map).unwrap();
    cursor.next(&map).unwrap();
    assert_eq!(cursor.next(&map).unwrap(), None);

    // The cursor still points at the entry it yielded last.
    assert_eq!(cursor.remove(&mut map), Ok((2, 20)));
    assert_eq!(map.len(), 1);
}

// =============================================================================
// Traversal
// =============================================================================

#[rstest]
fn cursor_walks_every_entry_in_key_order() {
    let map = sample();
    let mut cursor = map.cursor();
    let mut keys = Vec::new();

    while let Some((&key, _)) = cursor.next(&map).unwrap() {
        keys.push(key);
    }
    assert_eq!(keys, (0..8).collect::<Vec<i32>>());
    assert_eq!(cursor.next(&map).unwrap(), None);
    assert!(!cursor.has_next(&map).unwrap());
}

#[rstest]
fn cursor_by_value_walks_in_value_order() {
    let map = DualOrderedMap::try_from_iter([(1, 30), (2, 10), (3, 20)]).unwrap();
    let mut cursor = map.cursor_by_value();
    let mut pairs = Vec::new();

    while let Some((&key, &value)) = cursor.next(&map).unwrap() {
        pairs.push((key, value));
    }
    assert_eq!(pairs, vec![(2, 10), (3, 20), (1, 30)]);
}

#[rstest]
fn cursor_over_an_empty_map_is_immediately_exhausted() {
    let mut map: DualOrderedMap<i32, i32> = DualOrderedMap::new();
    let mut cursor = map.cursor();

    assert!(!cursor.has_next(&map).unwrap());
    assert_eq!(cursor.next(&map).unwrap(), None);
    assert_eq!(cursor.remove(&mut map), Err(CursorError::InvalidState));
}

#[rstest]
fn a_fresh_cursor_observes_later_entries() {
    let mut map = DualOrderedMap::new();
    map.put(1, 10).unwrap();

    // Cursors are cheap; taking a new one after mutation is the normal
    // way to resume traversal.
    let mut stale = map.cursor();
    map.put(2, 20).unwrap();
    assert!(stale.next(&map).is_err());

    let mut fresh = map.cursor();
    assert_eq!(fresh.next(&map).unwrap(), Some((&1, &10)));
    assert_eq!(fresh.next(&map).unwrap(), Some((&2, &20)));
}
