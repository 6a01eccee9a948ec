use std::iter::FusedIterator;
use std::mem::ManuallyDrop;
use std::ptr;
use std::slice;

use super::HybridVector;
use super::storage::Storage;
use crate::util::result::ResultExtension;

impl<T, const N: usize> IntoIterator for HybridVector<T, N> {
    type Item = T;

    type IntoIter = IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        let vec = ManuallyDrop::new(self);
        IntoIter {
            // SAFETY: vec is never dropped, so ownership of the storage moves to the iterator
            // without the elements being dropped twice.
            storage: unsafe { ptr::read(&vec.storage) },
            start: 0,
            end: vec.len,
        }
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a HybridVector<T, N> {
    type Item = &'a T;

    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut HybridVector<T, N> {
    type Item = &'a mut T;

    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A type for owned iteration over a [`HybridVector`], in either direction. See
/// [`HybridVector::into_iter`].
///
/// The iterator keeps the vector's storage, inline or heap, until it is dropped.
pub struct IntoIter<T, const N: usize> {
    storage: Storage<T, N>,
    start: usize,
    end: usize,
}

impl<T, const N: usize> IntoIter<T, N> {
    /// Returns the elements which haven't been yielded yet as a slice.
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: The slots from start to end are initialized and still owned by the iterator.
        unsafe {
            slice::from_raw_parts(self.storage.as_ptr().add(self.start), self.end - self.start)
        }
    }
}

impl<T, const N: usize> Drop for IntoIter<T, N> {
    fn drop(&mut self) {
        let remaining = self.end - self.start;
        // SAFETY: The slots from start to end are initialized and haven't been yielded.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.storage.as_mut_ptr().add(self.start),
                remaining,
            ));
        }

        // Implicitly drop self.storage, which releases the heap buffer if there is one.
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start < self.end {
            // SAFETY: The slot at start is initialized. Incrementing start right after means it is
            // never read or dropped again, effectively moving the value out.
            let value = unsafe { self.storage.as_ptr().add(self.start).read() };
            self.start += 1;
            Some(value)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start < self.end {
            self.end -= 1;
            // SAFETY: The slot at the newly decremented end is initialized and now outside of the
            // remaining range.
            let value = unsafe { self.storage.as_ptr().add(self.end).read() };
            Some(value)
        } else {
            None
        }
    }
}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> Extend<T> for HybridVector<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Copy + 'a, const N: usize> Extend<&'a T> for HybridVector<T, N> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const N: usize> FromIterator<T> for HybridVector<T, N> {
    /// Collects into storage chosen from the iterator's lower size bound, then pushes each item,
    /// growing as usual if the bound was too low.
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut vec = HybridVector::try_sized_for(iter.size_hint().0).throw();

        for item in iter {
            vec.push(item);
        }

        vec
    }
}
