#![cfg(test)]

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::iter;

use proptest::prelude::*;

use super::*;
use crate::util::alloc::{Counted, DropCounter, ZeroSizedType};
use crate::util::panic::assert_panics;

#[test]
fn test_promotion_and_demotion() {
    let mut vec = HybridVector::<u32, 4>::new();
    for i in 1..=4 {
        vec.push(i);
    }
    assert_eq!(vec.mode(), StorageMode::Inline, "4 elements should fit inline.");
    assert_eq!(vec.len(), 4);
    assert_eq!(vec.cap(), 4);

    vec.push(5);
    assert_eq!(vec.mode(), StorageMode::Heap, "The 5th element should promote.");
    assert_eq!(vec.len(), 5);
    assert_eq!(vec.cap(), 8, "Promotion should allocate ceil(1.5 * 5) slots.");

    assert_eq!(vec.remove(0), 1);
    assert_eq!(vec, [2, 3, 4, 5]);
    assert_eq!(
        vec.mode(),
        StorageMode::Inline,
        "Shrinking to exactly N elements should demote."
    );
    assert_eq!(vec.cap(), 4);
}

#[test]
fn test_growth_rule() {
    let mut vec = HybridVector::<u32, 4>::new();
    let mut caps = Vec::new();
    for i in 0..20 {
        vec.push(i);
        if caps.last() != Some(&vec.cap()) {
            caps.push(vec.cap());
        }
    }
    assert_eq!(
        caps,
        [4, 8, 14, 23],
        "Each reallocation should size the buffer to ceil(1.5 * (len + 1))."
    );
    assert!(vec.iter().copied().eq(0..20));
}

#[test]
fn test_insert_in_place() {
    let mut vec: HybridVector<_, 4> = HybridVector::from([1, 2, 3]);
    assert_eq!(vec.insert(1, 9), 1);
    assert_eq!(vec, [1, 9, 2, 3]);
    assert!(vec.is_inline(), "Filling the inline storage shouldn't promote.");

    let mut vec: HybridVector<_, 4> = HybridVector::from_iter_sized(0..6);
    assert_eq!(vec.cap(), 9);
    assert_eq!(vec.insert_from(6, [6, 7]), 6, "Inserting at len should append.");
    assert_eq!(vec.insert(0, -1), 0);
    assert_eq!(vec, [-1, 0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(vec.cap(), 9, "Heap storage with room shouldn't reallocate.");
}

#[test]
fn test_insert_relocating() {
    let mut vec: HybridVector<_, 4> = HybridVector::from([1, 2, 6]);
    assert_eq!(vec.insert_from(2, [3, 4, 5]), 2);
    assert_eq!(vec, [1, 2, 3, 4, 5, 6]);
    assert!(vec.is_heap());
    assert_eq!(vec.cap(), 9, "Promotion should allocate ceil(1.5 * 6) slots.");

    vec.insert_from(0, [-2, -1, 0, 0]);
    assert_eq!(vec, [-2, -1, 0, 0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(vec.cap(), 15, "Reallocation should allocate ceil(1.5 * 10) slots.");

    let empty: [i32; 0] = [];
    assert_eq!(vec.insert_from(3, empty), 3);
    assert_eq!(vec.len(), 10, "Inserting nothing should change nothing.");

    assert_panics!({
        let mut vec: HybridVector<_, 4> = HybridVector::from([1, 2, 3]);
        vec.insert(4, 0);
    });
}

#[test]
fn test_insert_panic_safety() {
    let counter = DropCounter::new();
    let mut vec: HybridVector<_, 4> =
        HybridVector::from_iter_sized((0..3).map(|i| counter.track(i)));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        vec.insert_from(
            1,
            (10..14).map(|i| {
                if i == 12 {
                    panic!("source exhausted")
                }
                counter.track(i)
            }),
        );
    }));
    assert!(result.is_err());
    assert_eq!(
        vec.iter().map(|c| c.value).collect::<Vec<_>>(),
        [0, 1, 2],
        "A panic while filling a new buffer should leave the vector untouched."
    );
    assert_eq!(vec.mode(), StorageMode::Inline);
    assert_eq!(counter.dropped(), 2, "The two items already written should be dropped.");

    drop(vec);
    assert_eq!(counter.dropped(), 5);
}

#[test]
fn test_insert_in_place_panic_safety() {
    let counter = DropCounter::new();
    let mut vec: HybridVector<_, 8> =
        HybridVector::from_iter_sized((0..3).map(|i| counter.track(i)));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        vec.insert_from(
            1,
            (10..13).map(|i| {
                if i == 11 {
                    panic!("source exhausted")
                }
                counter.track(i)
            }),
        );
    }));
    assert!(result.is_err());
    assert_eq!(
        vec.iter().map(|c| c.value).collect::<Vec<_>>(),
        [0, 10],
        "The prefix and the items written before the panic should remain."
    );
    assert!(vec.is_inline());
    assert_eq!(counter.dropped(), 0, "Nothing should be dropped while unwinding.");

    drop(vec);
    assert_eq!(counter.dropped(), 2, "The shifted tail should be leaked, not dropped twice.");
}

#[test]
fn test_short_iterator() {
    struct Liar(std::ops::Range<u8>);

    impl Iterator for Liar {
        type Item = u8;

        fn next(&mut self) -> Option<u8> {
            self.0.next()
        }

        fn size_hint(&self) -> (usize, Option<usize>) {
            (4, Some(4))
        }
    }

    impl ExactSizeIterator for Liar {}

    let mut vec: HybridVector<u8, 8> = HybridVector::from([1, 2, 3]);
    vec.insert_from(1, Liar(10..12));
    assert_eq!(vec, [1, 10, 11, 2, 3], "The gap should close behind a short iterator.");

    let mut vec: HybridVector<u8, 2> = HybridVector::from([1, 2]);
    vec.insert_from(1, Liar(10..11));
    assert_eq!(vec, [1, 10, 2]);
    assert_eq!(vec.cap(), 9);

    let mut vec: HybridVector<u8, 4> = HybridVector::from([1, 2, 3]);
    vec.insert_from(0, Liar(10..10));
    assert_eq!(vec, [1, 2, 3]);
    assert_eq!(
        vec.mode(),
        StorageMode::Inline,
        "A result that fits inline shouldn't stay on the heap."
    );
    assert_eq!(vec.cap(), 4);
}

#[test]
fn test_pop() {
    let mut vec: HybridVector<_, 2> = HybridVector::from([1, 2, 3, 4]);
    assert_eq!(vec.cap(), 6);

    assert_eq!(vec.pop(), Some(4));
    assert!(vec.is_heap(), "3 elements can't fit inline.");
    assert_eq!(vec.pop(), Some(3));
    assert!(vec.is_inline(), "Popping down to N elements should demote.");
    assert_eq!(vec.cap(), 2, "Demotion should restore the inline capacity.");
    assert_eq!(vec, [1, 2]);
    assert_eq!(vec.pop(), Some(2));
    assert_eq!(vec.pop(), Some(1));
    assert_eq!(vec.pop(), None);
    assert_eq!(vec.pop(), None, "Popping an empty vector should keep returning None.");
}

#[test]
fn test_remove_range() {
    let mut vec: HybridVector<_, 4> = HybridVector::from_iter_sized(0..10);

    assert_eq!(vec.remove_range(2..4), 2);
    assert_eq!(vec, [0, 1, 4, 5, 6, 7, 8, 9]);
    assert_eq!(vec[2], 4, "The returned index should address the next element.");

    assert_eq!(vec.remove_range(6..), 6);
    assert_eq!(vec, [0, 1, 4, 5, 6, 7]);
    assert!(vec.is_heap());

    assert_eq!(vec.remove_range(..=1), 0);
    assert_eq!(vec, [4, 5, 6, 7]);
    assert!(vec.is_inline(), "Landing on exactly N elements should demote.");

    assert_eq!(vec.remove_range(1..1), 1);
    assert_eq!(vec.len(), 4, "An empty range should remove nothing.");

    let mut vec: HybridVector<_, 4> = HybridVector::from_iter_sized(0..10);
    vec.remove_range(1..9);
    assert_eq!(vec, [0, 9]);
    assert!(
        vec.is_heap(),
        "Skipping past N elements in one removal should keep heap storage."
    );
    vec.shrink_to_fit();
    assert!(vec.is_inline());

    assert_panics!({
        let mut vec: HybridVector<_, 4> = HybridVector::from([1, 2, 3]);
        vec.remove_range(2..5);
    });
    assert_panics!({
        let mut vec: HybridVector<_, 4> = HybridVector::from([1, 2, 3]);
        #[allow(clippy::reversed_empty_ranges)]
        vec.remove_range(2..1);
    });
}

#[test]
fn test_insert_remove_inverse() {
    let original: HybridVector<_, 3> = HybridVector::from([1, 2, 3]);
    for i in 0..=original.len() {
        let mut vec = original.clone();
        vec.insert(i, 100);
        assert_eq!(vec.remove(i), 100);
        assert_eq!(vec, original, "Removing an inserted element should restore the vector.");
        assert!(vec.is_inline());
    }
}

#[test]
fn test_access() {
    let mut vec: HybridVector<_, 2> = HybridVector::from(['a', 'b', 'c']);
    assert_eq!(*vec.at(0), 'a');
    assert_eq!(vec.try_at(3), Err(IndexOutOfBounds { index: 3, len: 3 }));
    assert_panics!({
        let vec: HybridVector<_, 2> = HybridVector::from(['a', 'b', 'c']);
        vec.at(3);
    });

    *vec.at_mut(1) = 'z';
    assert_eq!(vec.replace(2, 'y'), 'c');
    assert_eq!(vec, ['a', 'z', 'y']);

    for i in 0..vec.len() {
        assert_eq!(vec.at(i), &vec[i], "Checked and unchecked access should agree.");
    }

    // SAFETY: as_ptr is valid for len elements until the next mutation.
    let first = unsafe { *vec.as_ptr() };
    assert_eq!(first, 'a');
}

#[test]
fn test_clear() {
    let counter = DropCounter::new();
    let mut vec: HybridVector<_, 4> =
        HybridVector::from_iter_sized((0..6).map(|i| counter.track(i)));
    assert!(vec.is_heap());

    vec.clear();
    assert_eq!(counter.dropped(), 6, "Clearing should drop every element.");
    assert!(vec.is_empty());
    assert_eq!(vec.mode(), StorageMode::Inline, "Clearing should release heap storage.");
    assert_eq!(vec.cap(), 4);
}

#[test]
fn test_reserve() {
    let mut vec: HybridVector<u8, 4> = HybridVector::new();
    vec.reserve(3);
    assert!(vec.is_inline(), "Reserving within N shouldn't promote.");

    vec.reserve(10);
    assert_eq!(vec.cap(), 10);
    vec.extend(0..10);
    assert_eq!(vec.cap(), 10, "Reserved capacity should be used before growing.");

    assert!(
        vec.try_reserve(usize::MAX)
            .is_err_and(|e| e == StorageError::CapacityOverflow(CapacityOverflow))
    );
    assert_eq!(vec.cap(), 10, "A failed reserve should leave the vector unchanged.");
}

#[test]
fn test_try_methods() {
    let mut vec: HybridVector<u64, 2> = HybridVector::from([1, 2]);
    assert!(
        vec.try_insert_from(0, iter::repeat_n(0, usize::MAX / 4)).is_err(),
        "A buffer larger than isize::MAX bytes should be rejected."
    );
    assert_eq!(vec, [1, 2]);
    assert!(vec.is_inline());

    assert!(HybridVector::<u64, 2>::try_with_cap(usize::MAX).is_err());
    assert_eq!(vec.try_push(3), Ok(()));
    assert_eq!(vec.try_insert(0, 0), Ok(0));
    assert_eq!(vec, [0, 1, 2, 3]);
}

#[test]
fn test_clone_representation() {
    let vec: HybridVector<_, 4> = HybridVector::from_iter_sized(0..6);
    let copy = vec.clone();
    assert_eq!(copy, vec);
    assert!(copy.is_heap());
    assert_eq!(copy.cap(), vec.cap());

    let mut shrunk = vec.clone();
    shrunk.remove_range(1..5);
    assert!(shrunk.is_heap());
    let copy = shrunk.clone();
    assert!(
        copy.is_inline(),
        "Clones should choose their storage from their length, not the source's mode."
    );
    assert_eq!(copy, [0, 5]);

    let mut target: HybridVector<_, 4> = HybridVector::from([9]);
    target.clone_from(&vec);
    assert_eq!(target, vec);
}

#[test]
fn test_equality_and_hash() {
    let inline: HybridVector<_, 4> = HybridVector::from([1, 2, 3, 4]);
    let mut heap: HybridVector<_, 4> = HybridVector::with_cap(8);
    heap.extend([1, 2, 3, 4]);
    assert!(heap.is_heap());

    assert_eq!(inline, heap, "Equality shouldn't depend on the storage mode.");
    assert_ne!(inline, HybridVector::<_, 4>::from([1, 2, 3]));
    assert_ne!(inline, HybridVector::<_, 4>::from([1, 2, 3, 5]));

    let state = RandomState::new();
    assert_eq!(
        state.hash_one(&inline),
        state.hash_one(&heap),
        "Equal vectors should produce the same hash."
    );
    assert_eq!(state.hash_one(&inline), state.hash_one([1, 2, 3, 4].as_slice()));

    assert!(HybridVector::<_, 2>::from([1, 2]) < HybridVector::<_, 2>::from([1, 3]));
    assert!(HybridVector::<_, 2>::from([1, 2, 0]) > HybridVector::<_, 2>::from([1, 2]));
}

#[test]
fn test_iterators() {
    let mut vec: HybridVector<_, 2> = HybridVector::from([1, 2, 3]);
    assert_eq!(vec.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);

    for value in &mut vec {
        *value *= 10;
    }
    assert_eq!(vec, [10, 20, 30]);

    let mut iter = vec.into_iter();
    assert_eq!(iter.len(), 3);
    assert_eq!(iter.next(), Some(10));
    assert_eq!(iter.next_back(), Some(30));
    assert_eq!(iter.as_slice(), [20]);
    assert_eq!(iter.next(), Some(20));
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);

    let counter = DropCounter::new();
    let vec: HybridVector<_, 2> =
        HybridVector::from_iter_sized((0..5).map(|i| counter.track(i)));
    let mut iter = vec.into_iter();
    let first: Option<Counted<i32>> = iter.next();
    drop(iter);
    assert_eq!(counter.dropped(), 4, "Dropping an owned iterator should drop the rest.");
    drop(first);
    assert_eq!(counter.dropped(), 5);

    let collected: HybridVector<_, 4> = (0..3).filter(|i| i % 2 == 0).collect();
    assert_eq!(collected, [0, 2]);
}

#[test]
fn test_collect_oversized_hint() {
    struct Endless;

    impl Iterator for Endless {
        type Item = u8;

        fn next(&mut self) -> Option<u8> {
            Some(0)
        }

        fn size_hint(&self) -> (usize, Option<usize>) {
            (usize::MAX, None)
        }
    }

    assert_panics!({
        let _: HybridVector<u8, 4> = Endless.collect();
    });

    let collected: HybridVector<u8, 4> = Endless.take(6).collect();
    assert_eq!(collected, [0; 6]);
}

#[test]
fn test_cursors() {
    let mut vec: HybridVector<_, 4> = HybridVector::from([1, 2, 3, 4, 5]);

    let start = vec.cursor(0);
    let mut cursor = start;
    cursor.move_offset(3);
    assert_eq!(cursor.read(), Some(&4));
    assert_eq!(start.distance_to(&cursor), 3);
    assert!(start < cursor);

    cursor.move_offset(100);
    assert!(cursor.is_end(), "Movement should stop at the end position.");
    assert_eq!(cursor.read(), None);
    cursor.move_offset(-100);
    assert_eq!(cursor, start, "Movement should stop at the start position.");
    assert!(cursor.try_move_to(6).is_err());
    assert_eq!(cursor.move_to(5).index(), 5);

    let mut cursor = vec.cursor_mut(4);
    while let Some(value) = cursor.read_mut() {
        *value *= 2;
        if cursor.index() == 0 {
            break;
        }
        cursor.move_prev();
    }
    assert_eq!(cursor.read_offset(1), Some(&4));
    assert_eq!(vec, [2, 4, 6, 8, 10]);

    assert_panics!({
        let vec: HybridVector<_, 4> = HybridVector::from([1]);
        vec.cursor(2);
    });
}

#[test]
fn test_drop() {
    let counter = DropCounter::new();
    let mut vec = HybridVector::<_, 3>::new();
    for i in 0..10 {
        vec.push(counter.track(i));
    }
    vec.remove_range(2..5);
    assert_eq!(counter.dropped(), 3);
    drop(vec.remove(0));
    drop(vec.pop());
    assert_eq!(counter.dropped(), 5);

    drop(vec);
    assert_eq!(counter.dropped(), 10, "Every element should be dropped exactly once.");
}

#[test]
fn test_zst_support() {
    let mut vec = HybridVector::<ZeroSizedType, 2>::new();
    for _ in 0..10 {
        vec.push(ZeroSizedType);
    }
    assert_eq!(vec.len(), 10);
    assert!(vec.is_heap());
    vec.insert(5, ZeroSizedType);
    vec.remove_range(..9);
    assert_eq!(vec.len(), 2);
    assert!(vec.is_inline());
}

#[test]
fn test_take() {
    let mut vec: HybridVector<_, 2> = HybridVector::from([1, 2, 3]);
    let taken = std::mem::take(&mut vec);
    assert_eq!(taken, [1, 2, 3]);
    assert!(vec.is_empty());
    assert!(vec.is_inline(), "The moved-from vector should be empty and inline.");
}

#[test]
fn test_macro() {
    let vec: HybridVector<_, 4> = crate::hybrid_vec![1, 2, 3];
    assert_eq!(vec, [1, 2, 3]);

    let vec: HybridVector<_, 4> = crate::hybrid_vec!['x'; 5];
    assert_eq!(vec, ['x'; 5]);
    assert_eq!(vec.cap(), 8);

    let vec: HybridVector<u8, 4> = crate::hybrid_vec![];
    assert!(vec.is_empty());
}

proptest! {
    #[test]
    fn prop_mode_threshold(count in 0_usize..40) {
        let mut vec = HybridVector::<usize, 8>::new();
        for i in 0..count {
            vec.push(i);
            prop_assert!(vec.len() <= vec.cap());
        }

        prop_assert_eq!(vec.is_inline(), count <= 8);
        if count <= 8 {
            prop_assert_eq!(vec.cap(), 8);
        }
    }

    #[test]
    fn prop_round_trip(values in prop::collection::vec(any::<i16>(), 0..40)) {
        let vec: HybridVector<_, 8> = HybridVector::from(values.as_slice());
        prop_assert_eq!(vec.into_iter().collect::<Vec<_>>(), values);
    }

    #[test]
    fn prop_insert_remove_inverse(
        values in prop::collection::vec(any::<u8>(), 0..30),
        index in any::<prop::sample::Index>(),
        value in any::<u8>(),
    ) {
        let original: HybridVector<_, 6> = HybridVector::from(values.as_slice());
        let index = index.index(values.len() + 1);

        let mut vec = original.clone();
        vec.insert(index, value);
        prop_assert!(vec.cap() >= vec.len());
        prop_assert_eq!(vec.remove(index), value);
        prop_assert_eq!(&vec, &original);
    }

    #[test]
    fn prop_access_agreement(values in prop::collection::vec(any::<i64>(), 1..30)) {
        let vec: HybridVector<_, 5> = HybridVector::from(values.as_slice());
        for i in 0..vec.len() {
            prop_assert_eq!(vec.at(i), &vec[i]);
            prop_assert_eq!(vec.at(i), &values[i]);
        }
    }
}
