use std::borrow::{Borrow, BorrowMut};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::iter;
use std::mem;
use std::ops::{Bound, Deref, DerefMut, RangeBounds};
use std::ptr;
use std::slice;

use tracing::trace;

use super::storage::{Storage, StorageMode, grown_cap};
use crate::collections::contiguous::buffer::HeapBuffer;
use crate::util::error::{CapacityOverflow, IndexOutOfBounds, StorageError};
use crate::util::result::ResultExtension;

/// A contiguous collection that keeps up to `N` elements inline, inside the vector itself, and
/// moves them to a [`HeapBuffer`] once more room is needed.
///
/// # Storage Modes
/// A HybridVector is always in exactly one [`StorageMode`]:
/// - [`Inline`](StorageMode::Inline): the elements live in a `[T; N]` sized array embedded in the
///   vector and the capacity is exactly `N`. No allocation is performed.
/// - [`Heap`](StorageMode::Heap): the elements live in a separately allocated buffer with a
///   capacity greater than `N`.
///
/// Any operation that needs more than the current capacity *promotes* the vector to (or
/// reallocates) heap storage sized to `ceil(1.5 * required)`. Removing elements one at a time
/// until exactly `N` remain *demotes* the vector back to inline storage, releasing the heap
/// buffer. [`clear`](HybridVector::clear) always returns to inline storage.
///
/// The storage mode is invisible to comparisons: two vectors holding the same elements are equal
/// regardless of where those elements live.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the HybridVector.
/// - `i`: The index of the item in question.
/// - `m`: The number of items being inserted.
///
/// | Method | Complexity |
/// |-|-|
/// | `at` | `O(1)` |
/// | `len` | `O(1)` |
/// | `push` | `O(1)`*, `O(n)` |
/// | `pop` | `O(1)`, `O(n)`** |
/// | `insert` | `O(n-i)`, `O(n)`* |
/// | `insert_from` | `O(n-i+m)`, `O(n+m)`* |
/// | `remove` | `O(n-i)`, `O(n)`** |
/// | `remove_range` | `O(n-i)`, `O(n)`** |
/// | `clear` | `O(n)` |
///
/// \* If the HybridVector doesn't have enough capacity, the elements are moved to a new buffer.
///
/// \** If the HybridVector is demoted, the remaining `N` elements are moved back inline.
pub struct HybridVector<T, const N: usize = 16> {
    pub(crate) storage: Storage<T, N>,
    pub(crate) len: usize,
}

impl<T, const N: usize> HybridVector<T, N> {
    /// Creates a new, empty HybridVector using inline storage. No memory is allocated.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::{HybridVector, StorageMode};
    /// let vec: HybridVector<u8, 4> = HybridVector::new();
    /// assert_eq!(vec.len(), 0);
    /// assert_eq!(vec.cap(), 4);
    /// assert_eq!(vec.mode(), StorageMode::Inline);
    /// ```
    pub const fn new() -> HybridVector<T, N> {
        HybridVector {
            storage: Storage::inline(),
            len: 0,
        }
    }

    /// Creates a new, empty HybridVector that can hold `cap` elements without reallocating. If
    /// `cap <= N`, inline storage is used, otherwise the heap buffer has exactly `cap` slots.
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let vec: HybridVector<u8, 4> = HybridVector::with_cap(10);
    /// assert_eq!(vec.cap(), 10);
    /// assert!(vec.is_heap());
    /// ```
    pub fn with_cap(cap: usize) -> HybridVector<T, N> {
        Self::try_with_cap(cap).throw()
    }

    /// Fallible version of [`with_cap`](HybridVector::with_cap).
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the heap buffer can't be allocated.
    pub fn try_with_cap(cap: usize) -> Result<HybridVector<T, N>, StorageError> {
        let storage = if cap <= N {
            Storage::inline()
        } else {
            Storage::Heap(HeapBuffer::try_new(cap)?)
        };

        Ok(HybridVector { storage, len: 0 })
    }

    /// Creates a HybridVector containing `count` clones of `item`. Inline storage is used if
    /// `count <= N`, otherwise the heap buffer is sized to `ceil(1.5 * count)`.
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let vec: HybridVector<char, 4> = HybridVector::repeat_item('a', 3);
    /// assert_eq!(vec, ['a', 'a', 'a']);
    /// assert!(vec.is_inline());
    ///
    /// let vec: HybridVector<char, 4> = HybridVector::repeat_item('b', 6);
    /// assert_eq!(vec.cap(), 9);
    /// ```
    pub fn repeat_item(item: T, count: usize) -> HybridVector<T, N>
    where
        T: Clone,
    {
        Self::try_repeat_item(item, count).throw()
    }

    /// Fallible version of [`repeat_item`](HybridVector::repeat_item).
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the heap buffer can't be allocated.
    pub fn try_repeat_item(item: T, count: usize) -> Result<HybridVector<T, N>, StorageError>
    where
        T: Clone,
    {
        Self::try_from_iter_sized(iter::repeat_n(item, count))
    }

    /// Creates a HybridVector from an iterator of known length, using the same storage rule as
    /// [`repeat_item`](HybridVector::repeat_item).
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let vec: HybridVector<u32, 4> = HybridVector::from_iter_sized(1..6);
    /// assert_eq!(vec, [1, 2, 3, 4, 5]);
    /// assert_eq!(vec.cap(), 8);
    /// ```
    pub fn from_iter_sized<I>(items: I) -> HybridVector<T, N>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        Self::try_from_iter_sized(items).throw()
    }

    /// Fallible version of [`from_iter_sized`](HybridVector::from_iter_sized).
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the heap buffer can't be allocated.
    pub fn try_from_iter_sized<I>(items: I) -> Result<HybridVector<T, N>, StorageError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = items.into_iter();
        let count = iter.len();
        let mut vec = Self::try_sized_for(count)?;

        for item in iter.take(count) {
            // SAFETY: vec has been created with room for at least count elements.
            unsafe { vec.push_unchecked(item) }
        }

        Ok(vec)
    }

    /// Returns the number of elements in the HybridVector.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the HybridVector contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the HybridVector can hold without reallocating. This is `N`
    /// for inline storage and the size of the heap buffer otherwise.
    pub const fn cap(&self) -> usize {
        self.storage.cap()
    }

    /// Returns the current [`StorageMode`].
    pub const fn mode(&self) -> StorageMode {
        self.storage.mode()
    }

    /// Returns true if the elements are stored inline.
    pub const fn is_inline(&self) -> bool {
        self.mode().is_inline()
    }

    /// Returns true if the elements are stored in a heap buffer.
    pub const fn is_heap(&self) -> bool {
        self.mode().is_heap()
    }

    /// Returns a reference to the element at `index`.
    ///
    /// Indexing with `vec[index]` skips the descriptive error but is otherwise identical. Callers
    /// are expected to uphold `index < len` there.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let vec: HybridVector<_, 2> = HybridVector::from([10, 20, 30]);
    /// assert_eq!(*vec.at(2), 30);
    /// assert_eq!(*vec.at(2), vec[2]);
    /// ```
    pub fn at(&self, index: usize) -> &T {
        self.try_at(index).throw()
    }

    /// Returns a reference to the element at `index`, or an [`Err`] if it is out of bounds.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let vec: HybridVector<_, 2> = HybridVector::from([10, 20, 30]);
    /// assert_eq!(vec.try_at(1), Ok(&20));
    /// assert!(vec.try_at(3).is_err());
    /// ```
    pub fn try_at(&self, index: usize) -> Result<&T, IndexOutOfBounds> {
        let len = self.len;
        self.as_slice().get(index).ok_or(IndexOutOfBounds { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        self.try_at_mut(index).throw()
    }

    /// Returns a mutable reference to the element at `index`, or an [`Err`] if it is out of
    /// bounds.
    pub fn try_at_mut(&mut self, index: usize) -> Result<&mut T, IndexOutOfBounds> {
        let len = self.len;
        self.as_mut_slice().get_mut(index).ok_or(IndexOutOfBounds { index, len })
    }

    /// Returns a raw pointer to the first element of the live buffer.
    ///
    /// The pointer is invalidated by any call that takes `&mut self`, because the elements may
    /// move between the inline and heap buffers.
    pub const fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Returns a mutable raw pointer to the first element of the live buffer. The same validity
    /// rules apply as for [`as_ptr`](HybridVector::as_ptr).
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// Returns the live elements as a slice.
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: The live buffer is valid, properly aligned and initialized for len elements,
        // which is never greater than its capacity. The borrow checker prevents mutation for the
        // lifetime of the slice.
        unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    /// Returns the live elements as a mutable slice.
    pub const fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: As with as_slice, the borrow checker also prevents any other access for the
        // lifetime of the slice.
        unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr(), self.len) }
    }

    /// Pushes `value` onto the end of the HybridVector, promoting it to heap storage or
    /// reallocating the heap buffer if it is full.
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let mut vec = HybridVector::<u8, 4>::new();
    /// for i in 1..=4 {
    ///     vec.push(i);
    /// }
    /// assert!(vec.is_inline());
    ///
    /// vec.push(5);
    /// assert!(vec.is_heap());
    /// assert_eq!(vec.cap(), 8);
    /// assert_eq!(vec, [1, 2, 3, 4, 5]);
    /// ```
    pub fn push(&mut self, value: T) {
        self.try_push(value).throw()
    }

    /// Fallible version of [`push`](HybridVector::push). If an [`Err`] is returned, the
    /// HybridVector is unchanged and `value` is dropped.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if a larger heap buffer is needed and can't be allocated.
    pub fn try_push(&mut self, value: T) -> Result<(), StorageError> {
        if self.len == self.cap() {
            let required = self.len.checked_add(1).ok_or(CapacityOverflow)?;
            self.relocate(grown_cap(required)?)?;
        }

        // SAFETY: There is room for at least one more element.
        unsafe { self.push_unchecked(value) }
        Ok(())
    }

    /// Pushes `value` onto the end of the HybridVector, assuming that there is room to do so.
    ///
    /// # Safety
    /// The caller must ensure that `len < cap`, for example by using
    /// [`reserve`](HybridVector::reserve). Pushing into a full HybridVector is undefined behavior.
    pub const unsafe fn push_unchecked(&mut self, value: T) {
        // SAFETY: It is up to the caller to ensure that the slot at len is within the capacity of
        // the live buffer.
        unsafe { self.storage.as_mut_ptr().add(self.len).write(value) }
        self.len += 1;
    }

    /// Removes the last element and returns it, or [`None`] if the HybridVector is empty. If this
    /// leaves exactly `N` elements in heap storage, they are moved back inline.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let mut vec: HybridVector<_, 2> = HybridVector::from([1, 2, 3]);
    /// assert!(vec.is_heap());
    /// assert_eq!(vec.pop(), Some(3));
    /// assert!(vec.is_inline());
    /// assert_eq!(vec.pop(), Some(2));
    /// assert_eq!(vec.pop(), Some(1));
    /// assert_eq!(vec.pop(), None);
    /// ```
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        // SAFETY: The slot at the new len was initialized and is now outside of the live range, so
        // reading it out moves the value without it being dropped twice.
        let value = unsafe { self.storage.as_ptr().add(self.len).read() };

        self.demote_at_threshold();
        Some(value)
    }

    /// Inserts `value` at `index`, shifting all following elements to the right. Returns the
    /// index of the inserted element.
    ///
    /// # Panics
    /// Panics if `index > len`, if the allocation fails or the layout size would exceed
    /// [`isize::MAX`].
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let mut vec: HybridVector<_, 4> = HybridVector::from([1, 2, 3]);
    /// assert_eq!(vec.insert(1, 9), 1);
    /// assert_eq!(vec, [1, 9, 2, 3]);
    /// assert!(vec.is_inline());
    /// ```
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        self.try_insert(index, value).throw()
    }

    /// Fallible version of [`insert`](HybridVector::insert).
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if a larger heap buffer is needed and can't be allocated. The
    /// HybridVector is unchanged in that case.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<usize, StorageError> {
        self.try_insert_from(index, iter::once(value))
    }

    /// Inserts every item of `items` starting at `index`, preserving their order and shifting all
    /// following elements to the right. Returns the index of the first inserted element.
    ///
    /// If the HybridVector has enough capacity, the tail is shifted in place. Otherwise a new
    /// buffer of `ceil(1.5 * (len + count))` slots is filled and adopted as a whole: if `items`
    /// panics in that case, the HybridVector is left untouched. When shifting in place, a panic in
    /// `items` leaves the elements before `index` and the items inserted so far; the shifted tail is
    /// leaked.
    ///
    /// An iterator that yields fewer items than its reported length is handled by closing the gap,
    /// any items beyond the reported length are ignored.
    ///
    /// # Panics
    /// Panics if `index > len`, if the allocation fails or the layout size would exceed
    /// [`isize::MAX`].
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let mut vec: HybridVector<_, 4> = HybridVector::from([1, 5]);
    /// vec.insert_from(1, [2, 3, 4]);
    /// assert_eq!(vec, [1, 2, 3, 4, 5]);
    /// assert_eq!(vec.cap(), 8);
    /// ```
    pub fn insert_from<I>(&mut self, index: usize, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.try_insert_from(index, items).throw()
    }

    /// Fallible version of [`insert_from`](HybridVector::insert_from).
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if a larger heap buffer is needed and can't be allocated. The
    /// HybridVector is unchanged in that case.
    pub fn try_insert_from<I>(&mut self, index: usize, items: I) -> Result<usize, StorageError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.check_position(index).throw();

        let iter = items.into_iter();
        let count = iter.len();
        let new_len = self.len.checked_add(count).ok_or(CapacityOverflow)?;

        if new_len <= self.cap() {
            // SAFETY: index <= len and the live buffer has room for count more elements.
            unsafe { self.insert_in_place(index, count, iter) }
        } else {
            self.insert_relocating(index, count, grown_cap(new_len)?, iter)?;
        }

        Ok(index)
    }

    /// Removes and returns the element at `index`, shifting all following elements to the left.
    /// The element now at `index` (if any) is the one that followed the removed element. If this
    /// leaves exactly `N` elements in heap storage, they are moved back inline.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let mut vec: HybridVector<_, 4> = HybridVector::from([1, 2, 3, 4, 5]);
    /// assert_eq!(vec.remove(0), 1);
    /// assert_eq!(vec, [2, 3, 4, 5]);
    /// assert!(vec.is_inline());
    /// ```
    pub fn remove(&mut self, index: usize) -> T {
        self.check_index(index).throw();

        let base = self.storage.as_mut_ptr();
        // SAFETY: index < len, so the value is initialized and both ranges of the copy are within
        // the live elements. ptr::copy handles the overlap.
        let value = unsafe {
            let value = base.add(index).read();
            ptr::copy(base.add(index + 1), base.add(index), self.len - index - 1);
            value
        };
        self.len -= 1;

        self.demote_at_threshold();
        value
    }

    /// Drops every element in `range`, shifting all following elements to the left. Returns the
    /// start of the range, which now addresses the first element after the removed ones (or
    /// `len`). If this leaves exactly `N` elements in heap storage, they are moved back inline.
    ///
    /// # Panics
    /// Panics if the range is out of bounds or its start is greater than its end.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let mut vec: HybridVector<_, 4> = HybridVector::from_iter_sized(0..8);
    /// assert_eq!(vec.remove_range(1..5), 1);
    /// assert_eq!(vec, [0, 5, 6, 7]);
    /// assert!(vec.is_inline());
    /// ```
    pub fn remove_range<R: RangeBounds<usize>>(&mut self, range: R) -> usize {
        let (start, end) = self.resolve_range(range).throw();
        let count = end - start;
        let old_len = self.len;
        let base = self.storage.as_mut_ptr();

        // Everything from start is hidden while dropping, a panicking destructor leaks the tail.
        self.len = start;
        // SAFETY: start <= end <= old_len, so the dropped range is initialized and the copied tail
        // stays within the live buffer.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), count));
            ptr::copy(base.add(end), base.add(start), old_len - end);
        }
        self.len = old_len - count;

        if count > 0 {
            self.demote_at_threshold();
        }
        start
    }

    /// Replaces the element at `index` with `value`, returning the old value.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn replace(&mut self, index: usize, value: T) -> T {
        mem::replace(self.at_mut(index), value)
    }

    /// Drops every element. Heap storage is released and the HybridVector returns to inline
    /// storage with capacity `N`.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let mut vec: HybridVector<_, 2> = HybridVector::from([1, 2, 3]);
    /// vec.clear();
    /// assert!(vec.is_empty());
    /// assert_eq!(vec.cap(), 2);
    /// ```
    pub fn clear(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        // SAFETY: The first len slots were initialized and are no longer considered live.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.storage.as_mut_ptr(), len));
        }

        if self.is_heap() {
            self.adopt(Storage::inline());
        }
    }

    /// Ensures that the HybridVector can hold `extra` more elements without reallocating. If it
    /// can't already, the capacity becomes exactly `len + extra`.
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    pub fn reserve(&mut self, extra: usize) {
        self.try_reserve(extra).throw()
    }

    /// Fallible version of [`reserve`](HybridVector::reserve).
    ///
    /// # Errors
    /// Returns a [`StorageError`] if a larger heap buffer is needed and can't be allocated. The
    /// HybridVector is unchanged in that case.
    pub fn try_reserve(&mut self, extra: usize) -> Result<(), StorageError> {
        let required = self.len.checked_add(extra).ok_or(CapacityOverflow)?;

        if required > self.cap() {
            self.relocate(required)?;
        }
        Ok(())
    }

    /// Releases unused heap capacity. A HybridVector in heap storage that holds `N` elements or
    /// fewer moves them back inline, otherwise the heap buffer is shrunk to exactly `len` slots.
    ///
    /// # Panics
    /// Panics if the smaller buffer can't be allocated.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let mut vec: HybridVector<_, 2> = HybridVector::from_iter_sized(0..10);
    /// vec.remove_range(..7);
    /// assert!(vec.is_heap());
    /// vec.shrink_to_fit();
    /// assert_eq!(vec.cap(), 3);
    /// vec.pop();
    /// assert!(vec.is_inline());
    /// ```
    pub fn shrink_to_fit(&mut self) {
        match self.mode() {
            StorageMode::Heap if self.len <= N => self.demote(),
            StorageMode::Heap if self.len < self.cap() => self.relocate(self.len).throw(),
            _ => {},
        }
    }

    /// Moves every live element into a new heap buffer with `new_cap` slots and adopts it.
    ///
    /// Nothing is modified if the allocation fails. The old buffer is only released once the new
    /// one holds every element.
    pub(crate) fn relocate(&mut self, new_cap: usize) -> Result<(), StorageError> {
        debug_assert!(new_cap > N && new_cap >= self.len);

        let mut buf = HeapBuffer::<T>::try_new(new_cap)?;
        // SAFETY: Both buffers are valid for len elements and don't overlap. The elements are
        // moved bitwise, the old buffer is released without dropping them.
        unsafe { ptr::copy_nonoverlapping(self.storage.as_ptr(), buf.as_mut_ptr(), self.len) }

        self.adopt(Storage::Heap(buf));
        Ok(())
    }

    /// Moves every live element back into inline storage and releases the heap buffer. Does
    /// nothing if the HybridVector is already inline.
    pub(crate) fn demote(&mut self) {
        debug_assert!(self.len <= N);

        if self.is_heap() {
            let mut inline = Storage::inline();
            // SAFETY: len <= N, so the inline array has room for every live element. The heap
            // buffer is released without dropping them.
            unsafe {
                ptr::copy_nonoverlapping(self.storage.as_ptr(), inline.as_mut_ptr(), self.len);
            }

            self.adopt(inline);
        }
    }

    /// Demotes the HybridVector if removing elements has left exactly `N` of them.
    pub(crate) fn demote_at_threshold(&mut self) {
        if self.len == N {
            self.demote();
        }
    }

    /// Replaces the live buffer with `storage`, which must already hold all live elements. The old
    /// buffer's slots are treated as moved-from.
    fn adopt(&mut self, storage: Storage<T, N>) {
        let old = mem::replace(&mut self.storage, storage);

        match (old.mode(), self.mode()) {
            (StorageMode::Inline, StorageMode::Heap) => {
                trace!(inline_cap = N, len = self.len, cap = self.cap(), "promoted to heap storage")
            },
            (StorageMode::Heap, StorageMode::Heap) => {
                trace!(inline_cap = N, len = self.len, cap = self.cap(), "reallocated heap storage")
            },
            (StorageMode::Heap, StorageMode::Inline) => {
                trace!(inline_cap = N, len = self.len, "returned to inline storage")
            },
            (StorageMode::Inline, StorageMode::Inline) => {},
        }

        // Implicitly drop old, an inline array of MaybeUninit values has a no-op drop and a heap
        // buffer only deallocates.
    }

    /// Shifts the tail right by `count` and writes up to `count` items into the gap.
    ///
    /// # Safety
    /// `index <= len` and `len + count <= cap` must hold.
    unsafe fn insert_in_place<I>(&mut self, index: usize, count: usize, items: I)
    where
        I: Iterator<Item = T>,
    {
        let tail = self.len - index;
        let base = self.storage.as_mut_ptr();
        // SAFETY: The caller guarantees that index + count + tail <= cap.
        unsafe { ptr::copy(base.add(index), base.add(index + count), tail) }

        // The shifted tail is hidden from len until the gap is closed.
        self.len = index;
        for item in items.take(count) {
            // SAFETY: len < index + count, which is within the gap.
            unsafe { base.add(self.len).write(item) }
            self.len += 1;
        }

        if self.len < index + count {
            // SAFETY: Both ranges are within the capacity, the tail moves left to close the gap
            // left by a short iterator.
            unsafe { ptr::copy(base.add(index + count), base.add(self.len), tail) }
        }
        self.len += tail;
    }

    /// Fills a new heap buffer with the prefix, up to `count` items and the tail, then adopts it.
    /// The items are written first, so a panicking iterator leaves self untouched. If fewer items
    /// arrive than reported and the result fits inline, the elements are moved back inline.
    fn insert_relocating<I>(
        &mut self,
        index: usize,
        count: usize,
        new_cap: usize,
        items: I,
    ) -> Result<(), StorageError>
    where
        I: Iterator<Item = T>,
    {
        let mut buf = HeapBuffer::<T>::try_new(new_cap)?;
        let dst: *mut T = buf.as_mut_ptr();

        let mut gap = PartialFill {
            // SAFETY: index <= len < new_cap.
            start: unsafe { dst.add(index) },
            written: 0,
        };
        for item in items.take(count) {
            // SAFETY: written < count and index + count <= new_cap.
            unsafe { gap.start.add(gap.written).write(item) }
            gap.written += 1;
        }
        let written = gap.written;
        mem::forget(gap);

        let src = self.storage.as_ptr();
        // SAFETY: The prefix and tail are initialized in the old buffer and land on either side of
        // the written items in the new one, all within new_cap.
        unsafe {
            ptr::copy_nonoverlapping(src, dst, index);
            ptr::copy_nonoverlapping(src.add(index), dst.add(index + written), self.len - index);
        }
        self.len += written;

        self.adopt(Storage::Heap(buf));
        // An iterator that reported more items than it yielded can leave N elements or fewer.
        if self.len <= N {
            self.demote();
        }
        Ok(())
    }

    /// Creates an empty HybridVector with room for `count` elements, following the same storage
    /// rule as the sized constructors.
    pub(crate) fn try_sized_for(count: usize) -> Result<HybridVector<T, N>, StorageError> {
        if count <= N {
            Ok(Self::new())
        } else {
            Self::try_with_cap(grown_cap(count)?)
        }
    }

    /// Checks that `index` addresses a live element.
    pub(crate) const fn check_index(&self, index: usize) -> Result<(), IndexOutOfBounds> {
        if index >= self.len {
            Err(IndexOutOfBounds {
                index,
                len: self.len,
            })
        } else {
            Ok(())
        }
    }

    /// Checks that `index` is a valid insertion position, `len` included.
    pub(crate) const fn check_position(&self, index: usize) -> Result<(), IndexOutOfBounds> {
        if index > self.len {
            Err(IndexOutOfBounds {
                index,
                len: self.len,
            })
        } else {
            Ok(())
        }
    }

    /// Converts any [`RangeBounds`] into a start and an exclusive end within the live elements.
    pub(crate) fn resolve_range<R: RangeBounds<usize>>(
        &self,
        range: R,
    ) -> Result<(usize, usize), IndexOutOfBounds> {
        let len = self.len;

        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => {
                start.checked_add(1).ok_or(IndexOutOfBounds { index: start, len })?
            },
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => {
                end.checked_add(1).ok_or(IndexOutOfBounds { index: end, len })?
            },
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        };

        if end > len {
            Err(IndexOutOfBounds { index: end, len })
        } else if start > end {
            Err(IndexOutOfBounds { index: start, len })
        } else {
            Ok((start, end))
        }
    }
}

/// Drops the items written into a new buffer if filling it panics.
struct PartialFill<T> {
    start: *mut T,
    written: usize,
}

impl<T> Drop for PartialFill<T> {
    fn drop(&mut self) {
        // SAFETY: The first written slots from start have been initialized and are owned by
        // nobody else.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start, self.written)) }
    }
}

impl<T, const N: usize> Default for HybridVector<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for HybridVector<T, N> {
    fn drop(&mut self) {
        // SAFETY: All values less than len are initialized and safe to drop.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }

        // Implicitly drop self.storage, which releases the heap buffer if there is one.
    }
}

impl<T, const N: usize> Deref for HybridVector<T, N> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for HybridVector<T, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> AsRef<[T]> for HybridVector<T, N> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> AsMut<[T]> for HybridVector<T, N> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> Borrow<[T]> for HybridVector<T, N> {
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> BorrowMut<[T]> for HybridVector<T, N> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Clone, const N: usize> Clone for HybridVector<T, N> {
    /// Deep-copies every element. The copy's storage is chosen from the number of elements, not
    /// from the source's storage mode: `N` elements or fewer are always stored inline.
    fn clone(&self) -> Self {
        let mut vec = if self.len <= N {
            Self::new()
        } else {
            Self::with_cap(self.cap())
        };

        for value in self.iter() {
            // SAFETY: vec has room for at least self.len elements.
            unsafe { vec.push_unchecked(value.clone()) }
        }

        vec
    }

    /// Builds a complete copy of `source` before swapping it in, so a panicking clone leaves self
    /// untouched.
    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        mem::swap(self, &mut copy);
    }
}

impl<T, const N: usize, const M: usize> From<[T; M]> for HybridVector<T, N> {
    fn from(value: [T; M]) -> Self {
        Self::from_iter_sized(value)
    }
}

impl<T: Clone, const N: usize> From<&[T]> for HybridVector<T, N> {
    fn from(value: &[T]) -> Self {
        Self::from_iter_sized(value.iter().cloned())
    }
}

impl<T, U, const N: usize, const M: usize> PartialEq<HybridVector<U, M>> for HybridVector<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &HybridVector<U, M>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U, const N: usize> PartialEq<[U]> for HybridVector<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, const N: usize> PartialEq<&[U]> for HybridVector<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize, const M: usize> PartialEq<[U; M]> for HybridVector<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; M]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize> Eq for HybridVector<T, N> {}

impl<T: PartialOrd, const N: usize> PartialOrd for HybridVector<T, N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, const N: usize> Ord for HybridVector<T, N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash, const N: usize> Hash for HybridVector<T, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: Debug, const N: usize> Debug for HybridVector<T, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridVector")
            .field("contents", &self.as_slice())
            .field("len", &self.len)
            .field("cap", &self.cap())
            .field("mode", &self.mode())
            .finish()
    }
}

impl<T: Debug, const N: usize> Display for HybridVector<T, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
