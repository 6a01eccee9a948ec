use std::borrow::{Borrow, BorrowMut, Cow};
use std::cmp::Ordering;
use std::ffi::{CStr, CString, NulError, c_char};
use std::fmt::{self, Debug, Display, Formatter, Write};
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Deref, DerefMut, RangeBounds};
use std::str::{self, Utf8Error};

use crate::collections::contiguous::hybrid_vector::{HybridVector, StorageMode};
use crate::util::error::IndexOutOfBounds;
use crate::util::result::ResultExtension;

/// A byte string that stores up to `N` bytes inline and moves to the heap once it outgrows them.
/// All storage decisions are made by the underlying [`HybridVector<u8, N>`](HybridVector).
///
/// A HybridString holds arbitrary bytes, not necessarily UTF-8, and has no terminator: its length
/// is the number of bytes it contains. It converts to and from C strings ([`CStr`] / [`CString`])
/// and compares equal to them by content.
///
/// # Examples
/// ```
/// # use hybrid_lib::collections::contiguous::HybridString;
/// let mut greeting: HybridString<8> = HybridString::from(c"Hello");
/// greeting += ", ";
/// greeting += c"world";
/// greeting += b'!';
///
/// assert_eq!(greeting, "Hello, world!");
/// assert_eq!(greeting.len(), 13);
/// assert!(greeting.is_heap());
/// assert_eq!(greeting.to_c_string().unwrap().as_c_str(), c"Hello, world!");
/// ```
#[derive(Default, Clone)]
pub struct HybridString<const N: usize = 16> {
    pub(crate) bytes: HybridVector<u8, N>,
}

impl<const N: usize> HybridString<N> {
    /// Creates a new, empty HybridString using inline storage.
    pub const fn new() -> HybridString<N> {
        HybridString {
            bytes: HybridVector::new(),
        }
    }

    /// Creates a HybridString by copying the bytes of the nul-terminated C string at `ptr`. A null
    /// pointer produces an empty string.
    ///
    /// # Safety
    /// If `ptr` is not null, it must satisfy the safety requirements of [`CStr::from_ptr`]: it
    /// points to a valid, nul-terminated C string which isn't mutated for the duration of this
    /// call.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridString;
    /// let source = c"abc";
    /// // SAFETY: source is a valid C string.
    /// let string: HybridString<4> = unsafe { HybridString::from_ptr(source.as_ptr()) };
    /// assert_eq!(string, "abc");
    ///
    /// // SAFETY: Null pointers are accepted.
    /// let empty: HybridString<4> = unsafe { HybridString::from_ptr(std::ptr::null()) };
    /// assert!(empty.is_empty());
    /// ```
    pub unsafe fn from_ptr(ptr: *const c_char) -> HybridString<N> {
        if ptr.is_null() {
            HybridString::new()
        } else {
            // SAFETY: ptr isn't null and the caller upholds the rest of CStr's requirements.
            HybridString::from(unsafe { CStr::from_ptr(ptr) })
        }
    }

    /// Returns the number of bytes in the HybridString.
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the HybridString contains no bytes.
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the number of bytes the HybridString can hold without reallocating.
    pub const fn cap(&self) -> usize {
        self.bytes.cap()
    }

    /// Returns the current [`StorageMode`] of the underlying vector.
    pub const fn mode(&self) -> StorageMode {
        self.bytes.mode()
    }

    /// Returns true if the bytes are stored inline.
    pub const fn is_inline(&self) -> bool {
        self.bytes.is_inline()
    }

    /// Returns true if the bytes are stored in a heap buffer.
    pub const fn is_heap(&self) -> bool {
        self.bytes.is_heap()
    }

    /// Returns the contents as a byte slice.
    pub const fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Returns the contents as a mutable byte slice.
    pub const fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bytes.as_mut_slice()
    }

    /// Returns a reference to the underlying [`HybridVector`].
    pub const fn as_vector(&self) -> &HybridVector<u8, N> {
        &self.bytes
    }

    /// Consumes the HybridString, returning the underlying [`HybridVector`].
    pub fn into_vector(self) -> HybridVector<u8, N> {
        self.bytes
    }

    /// Returns a raw pointer to the first byte. The bytes are not followed by a nul terminator,
    /// see [`to_c_string`](HybridString::to_c_string) to pass the contents to C.
    pub const fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Replaces the contents with the bytes of `value`. The new contents are built in full before
    /// they replace the old ones.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridString;
    /// let mut string: HybridString<4> = HybridString::from("a long string");
    /// string.assign(c"abc");
    /// assert_eq!(string, c"abc");
    /// assert!(string.is_inline());
    /// ```
    pub fn assign(&mut self, value: &CStr) -> &mut Self {
        *self = HybridString::from(value);
        self
    }

    /// Appends the bytes of a C string, excluding its terminator.
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    pub fn append(&mut self, suffix: &CStr) -> &mut Self {
        self.append_bytes(suffix.to_bytes())
    }

    /// Appends the bytes of a [`str`].
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    pub fn append_str(&mut self, suffix: &str) -> &mut Self {
        self.append_bytes(suffix.as_bytes())
    }

    /// Appends the contents of another HybridString, which may have a different inline capacity.
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    pub fn append_string<const M: usize>(&mut self, suffix: &HybridString<M>) -> &mut Self {
        self.append_bytes(suffix.as_bytes())
    }

    /// Appends a slice of bytes in one insertion, so the storage grows at most once.
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    pub fn append_bytes(&mut self, suffix: &[u8]) -> &mut Self {
        self.bytes.insert_from(self.len(), suffix.iter().copied());
        self
    }

    /// Appends a single byte.
    ///
    /// # Panics
    /// Panics if the allocation fails or the layout size would exceed [`isize::MAX`].
    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte)
    }

    /// Returns the byte at `index`, or an [`Err`] if it is out of bounds.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridString;
    /// let string: HybridString<4> = HybridString::from("xyz");
    /// assert_eq!(string.get(1), Ok(b'y'));
    /// assert!(string.get(3).is_err());
    /// ```
    pub fn get(&self, index: usize) -> Result<u8, IndexOutOfBounds> {
        self.bytes.try_at(index).copied()
    }

    /// Overwrites the byte at `index`, returning an [`Err`] and leaving the HybridString unchanged
    /// if it is out of bounds.
    ///
    /// # Examples
    /// ```
    /// # use hybrid_lib::collections::contiguous::HybridString;
    /// let mut string: HybridString<4> = HybridString::from("cat");
    /// string.set(0, b'b').unwrap();
    /// assert_eq!(string, "bat");
    /// assert!(string.set(3, b's').is_err());
    /// ```
    pub fn set(&mut self, index: usize, byte: u8) -> Result<(), IndexOutOfBounds> {
        *self.bytes.try_at_mut(index)? = byte;
        Ok(())
    }

    /// Returns the byte at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn at(&self, index: usize) -> u8 {
        self.get(index).throw()
    }

    /// Inserts `byte` at `index`, returning `index`.
    ///
    /// # Panics
    /// Panics if `index > len`, if the allocation fails or the layout size would exceed
    /// [`isize::MAX`].
    pub fn insert(&mut self, index: usize, byte: u8) -> usize {
        self.bytes.insert(index, byte)
    }

    /// Inserts every byte of `bytes` starting at `index`, returning `index`.
    ///
    /// # Panics
    /// Panics if `index > len`, if the allocation fails or the layout size would exceed
    /// [`isize::MAX`].
    pub fn insert_bytes(&mut self, index: usize, bytes: &[u8]) -> usize {
        self.bytes.insert_from(index, bytes.iter().copied())
    }

    /// Removes the last byte and returns it, or [`None`] if the HybridString is empty.
    pub fn pop(&mut self) -> Option<u8> {
        self.bytes.pop()
    }

    /// Removes and returns the byte at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> u8 {
        self.bytes.remove(index)
    }

    /// Removes every byte in `range`, returning the start of the range.
    ///
    /// # Panics
    /// Panics if the range is out of bounds or its start is greater than its end.
    pub fn remove_range<R: RangeBounds<usize>>(&mut self, range: R) -> usize {
        self.bytes.remove_range(range)
    }

    /// Removes every byte, returning to inline storage.
    pub fn clear(&mut self) {
        self.bytes.clear()
    }

    /// Copies the contents into a nul-terminated [`CString`].
    ///
    /// # Errors
    /// Returns a [`NulError`] if the contents contain a nul byte.
    pub fn to_c_string(&self) -> Result<CString, NulError> {
        CString::new(self.as_bytes())
    }

    /// Returns the contents as a [`str`] if they are valid UTF-8.
    ///
    /// # Errors
    /// Returns a [`Utf8Error`] describing the first invalid sequence otherwise.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(self.as_bytes())
    }

    /// Returns the contents as a [`str`], replacing invalid UTF-8 sequences with
    /// [`U+FFFD`](char::REPLACEMENT_CHARACTER).
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl<const N: usize> Deref for HybridString<N> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl<const N: usize> DerefMut for HybridString<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_bytes_mut()
    }
}

impl<const N: usize> AsRef<[u8]> for HybridString<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<const N: usize> AsMut<[u8]> for HybridString<N> {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_bytes_mut()
    }
}

impl<const N: usize> Borrow<[u8]> for HybridString<N> {
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<const N: usize> BorrowMut<[u8]> for HybridString<N> {
    fn borrow_mut(&mut self) -> &mut [u8] {
        self.as_bytes_mut()
    }
}

impl<const N: usize> From<&CStr> for HybridString<N> {
    fn from(value: &CStr) -> Self {
        HybridString::from(value.to_bytes())
    }
}

impl<const N: usize> From<&str> for HybridString<N> {
    fn from(value: &str) -> Self {
        HybridString::from(value.as_bytes())
    }
}

impl<const N: usize> From<&[u8]> for HybridString<N> {
    fn from(value: &[u8]) -> Self {
        HybridString {
            bytes: HybridVector::from(value),
        }
    }
}

impl<const N: usize> From<HybridVector<u8, N>> for HybridString<N> {
    fn from(value: HybridVector<u8, N>) -> Self {
        HybridString { bytes: value }
    }
}

impl<const N: usize> TryFrom<HybridString<N>> for String {
    type Error = Utf8Error;

    fn try_from(value: HybridString<N>) -> Result<Self, Self::Error> {
        value.to_str().map(str::to_owned)
    }
}

impl<const N: usize> FromIterator<u8> for HybridString<N> {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        HybridString {
            bytes: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> Extend<u8> for HybridString<N> {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        self.bytes.extend(iter)
    }
}

impl<'a, const N: usize> Extend<&'a u8> for HybridString<N> {
    fn extend<I: IntoIterator<Item = &'a u8>>(&mut self, iter: I) {
        self.bytes.extend(iter)
    }
}

impl<const N: usize> AddAssign<&CStr> for HybridString<N> {
    fn add_assign(&mut self, rhs: &CStr) {
        self.append(rhs);
    }
}

impl<const N: usize> AddAssign<&str> for HybridString<N> {
    fn add_assign(&mut self, rhs: &str) {
        self.append_str(rhs);
    }
}

impl<const N: usize> AddAssign<u8> for HybridString<N> {
    fn add_assign(&mut self, rhs: u8) {
        self.push(rhs);
    }
}

impl<const N: usize, const M: usize> AddAssign<&HybridString<M>> for HybridString<N> {
    fn add_assign(&mut self, rhs: &HybridString<M>) {
        self.append_string(rhs);
    }
}

impl<const N: usize, const M: usize> AddAssign<&HybridVector<u8, M>> for HybridString<N> {
    fn add_assign(&mut self, rhs: &HybridVector<u8, M>) {
        self.append_bytes(rhs);
    }
}

impl<const N: usize> Add<&CStr> for HybridString<N> {
    type Output = HybridString<N>;

    fn add(mut self, rhs: &CStr) -> Self::Output {
        self.append(rhs);
        self
    }
}

impl<const N: usize> Add<&str> for HybridString<N> {
    type Output = HybridString<N>;

    fn add(mut self, rhs: &str) -> Self::Output {
        self.append_str(rhs);
        self
    }
}

impl<const N: usize> Write for HybridString<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        Ok(())
    }
}

impl<const N: usize, const M: usize> PartialEq<HybridString<M>> for HybridString<N> {
    fn eq(&self, other: &HybridString<M>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> Eq for HybridString<N> {}

impl<const N: usize> PartialEq<CStr> for HybridString<N> {
    fn eq(&self, other: &CStr) -> bool {
        self.as_bytes() == other.to_bytes()
    }
}

impl<const N: usize> PartialEq<&CStr> for HybridString<N> {
    fn eq(&self, other: &&CStr) -> bool {
        self == *other
    }
}

impl<const N: usize> PartialEq<HybridString<N>> for CStr {
    fn eq(&self, other: &HybridString<N>) -> bool {
        other == self
    }
}

impl<const N: usize> PartialEq<HybridString<N>> for &CStr {
    fn eq(&self, other: &HybridString<N>) -> bool {
        other == *self
    }
}

impl<const N: usize> PartialEq<str> for HybridString<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> PartialEq<&str> for HybridString<N> {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl<const N: usize> PartialEq<HybridString<N>> for str {
    fn eq(&self, other: &HybridString<N>) -> bool {
        other == self
    }
}

impl<const N: usize> PartialEq<HybridString<N>> for &str {
    fn eq(&self, other: &HybridString<N>) -> bool {
        other == *self
    }
}

impl<const N: usize> PartialOrd for HybridString<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> Ord for HybridString<N> {
    /// Compares byte by byte, a prefix orders before any longer string.
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl<const N: usize> PartialOrd<CStr> for HybridString<N> {
    fn partial_cmp(&self, other: &CStr) -> Option<Ordering> {
        Some(self.as_bytes().cmp(other.to_bytes()))
    }
}

impl<const N: usize> Hash for HybridString<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl<const N: usize> Debug for HybridString<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridString")
            .field("contents", &self.to_string_lossy())
            .field("len", &self.len())
            .field("cap", &self.cap())
            .field("mode", &self.mode())
            .finish()
    }
}

impl<const N: usize> Display for HybridString<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.to_string_lossy(), f)
    }
}
