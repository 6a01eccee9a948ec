use std::cmp::Ordering;
use std::ptr;

use super::HybridVector;
use crate::util::error::IndexOutOfBounds;
use crate::util::result::ResultExtension;

/// A random-access position within the elements of a [`HybridVector`], for read-only traversal in
/// either direction. See [`HybridVector::cursor`] to create one.
///
/// A Cursor can point at any element or at the end position, `len`, which holds no element.
/// Movement is clamped to `0..=len`. The Cursor borrows the vector, so it can't outlive a
/// mutation that would move the elements.
///
/// Cursors over the same vector compare by position.
#[derive(Debug)]
pub struct Cursor<'a, T> {
    pub(crate) elements: &'a [T],
    pub(crate) index: usize,
}

/// A random-access position within the elements of a [`HybridVector`], which allows the element
/// under it to be mutated. See [`HybridVector::cursor_mut`] to create one.
///
/// Positions and movement follow the same rules as [`Cursor`].
#[derive(Debug)]
pub struct CursorMut<'a, T> {
    pub(crate) elements: &'a mut [T],
    pub(crate) index: usize,
}

impl<T, const N: usize> HybridVector<T, N> {
    /// Creates a [`Cursor`] positioned at `index`, which may be `len` for the end position.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridVector;
    /// let vec: HybridVector<_, 4> = HybridVector::from([1, 2, 3]);
    /// let mut cursor = vec.cursor(0);
    /// assert_eq!(cursor.read(), Some(&1));
    /// cursor.move_offset(2);
    /// assert_eq!(cursor.read(), Some(&3));
    /// cursor.move_next();
    /// assert!(cursor.is_end());
    /// assert_eq!(cursor.read_offset(-3), Some(&1));
    /// ```
    pub fn cursor(&self, index: usize) -> Cursor<'_, T> {
        self.check_position(index).throw();

        Cursor {
            elements: self.as_slice(),
            index,
        }
    }

    /// Creates a [`CursorMut`] positioned at `index`, which may be `len` for the end position.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn cursor_mut(&mut self, index: usize) -> CursorMut<'_, T> {
        self.check_position(index).throw();

        CursorMut {
            elements: self.as_mut_slice(),
            index,
        }
    }
}

/// Moves `index` by `offset`, staying within `0..=len`.
const fn clamp_offset(index: usize, offset: isize, len: usize) -> usize {
    match index.checked_add_signed(offset) {
        Some(target) if target <= len => target,
        Some(_) => len,
        None if offset < 0 => 0,
        None => len,
    }
}

const fn check_target(index: usize, len: usize) -> Result<(), IndexOutOfBounds> {
    if index > len {
        Err(IndexOutOfBounds { index, len })
    } else {
        Ok(())
    }
}

impl<'a, T> Cursor<'a, T> {
    /// Returns the current position.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns true if the Cursor is at the end position.
    pub const fn is_end(&self) -> bool {
        self.index == self.elements.len()
    }

    /// Returns the element under the Cursor, or [`None`] at the end position.
    pub fn read(&self) -> Option<&'a T> {
        self.elements.get(self.index)
    }

    /// Returns the element `offset` positions away from the Cursor, if there is one.
    pub fn read_offset(&self, offset: isize) -> Option<&'a T> {
        self.index
            .checked_add_signed(offset)
            .and_then(|target| self.elements.get(target))
    }

    /// Moves the Cursor one position forward, unless it is at the end.
    pub const fn move_next(&mut self) -> &mut Self {
        self.move_offset(1)
    }

    /// Moves the Cursor one position back, unless it is at the start.
    pub const fn move_prev(&mut self) -> &mut Self {
        self.move_offset(-1)
    }

    /// Moves the Cursor by `offset` positions, stopping at the start or end.
    pub const fn move_offset(&mut self, offset: isize) -> &mut Self {
        self.index = clamp_offset(self.index, offset, self.elements.len());
        self
    }

    /// Moves the Cursor to `index`.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn move_to(&mut self, index: usize) -> &mut Self {
        self.try_move_to(index).throw()
    }

    /// Moves the Cursor to `index`, returning an [`Err`] rather than panicking if `index > len`.
    pub fn try_move_to(&mut self, index: usize) -> Result<&mut Self, IndexOutOfBounds> {
        check_target(index, self.elements.len())?;
        self.index = index;
        Ok(self)
    }

    /// Returns the number of positions from self to `other`, negative if `other` is before self.
    pub const fn distance_to(&self, other: &Cursor<'_, T>) -> isize {
        other.index as isize - self.index as isize
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.elements, other.elements) && self.index == other.index
    }
}

impl<T> PartialOrd for Cursor<'_, T> {
    /// Cursors over different vectors aren't comparable.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        ptr::eq(self.elements, other.elements).then(|| self.index.cmp(&other.index))
    }
}

impl<'a, T> CursorMut<'a, T> {
    /// Returns the current position.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns true if the CursorMut is at the end position.
    pub const fn is_end(&self) -> bool {
        self.index == self.elements.len()
    }

    /// Returns the element under the CursorMut, or [`None`] at the end position.
    pub fn read(&self) -> Option<&T> {
        self.elements.get(self.index)
    }

    /// Returns a mutable reference to the element under the CursorMut, or [`None`] at the end
    /// position.
    pub fn read_mut(&mut self) -> Option<&mut T> {
        self.elements.get_mut(self.index)
    }

    /// Returns the element `offset` positions away from the CursorMut, if there is one.
    pub fn read_offset(&self, offset: isize) -> Option<&T> {
        self.index
            .checked_add_signed(offset)
            .and_then(|target| self.elements.get(target))
    }

    /// Returns a mutable reference to the element `offset` positions away from the CursorMut, if
    /// there is one.
    pub fn read_offset_mut(&mut self, offset: isize) -> Option<&mut T> {
        self.index
            .checked_add_signed(offset)
            .and_then(|target| self.elements.get_mut(target))
    }

    /// Moves the CursorMut one position forward, unless it is at the end.
    pub const fn move_next(&mut self) -> &mut Self {
        self.move_offset(1)
    }

    /// Moves the CursorMut one position back, unless it is at the start.
    pub const fn move_prev(&mut self) -> &mut Self {
        self.move_offset(-1)
    }

    /// Moves the CursorMut by `offset` positions, stopping at the start or end.
    pub const fn move_offset(&mut self, offset: isize) -> &mut Self {
        self.index = clamp_offset(self.index, offset, self.elements.len());
        self
    }

    /// Moves the CursorMut to `index`.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn move_to(&mut self, index: usize) -> &mut Self {
        self.try_move_to(index).throw()
    }

    /// Moves the CursorMut to `index`, returning an [`Err`] rather than panicking if
    /// `index > len`.
    pub fn try_move_to(&mut self, index: usize) -> Result<&mut Self, IndexOutOfBounds> {
        check_target(index, self.elements.len())?;
        self.index = index;
        Ok(self)
    }

    /// Reborrows the CursorMut as a read-only [`Cursor`] at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            elements: &*self.elements,
            index: self.index,
        }
    }
}
