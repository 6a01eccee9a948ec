use std::alloc::{self, Layout};
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use crate::util::error::{AllocationFailure, CapacityOverflow, StorageError};

/// An owned, fixed-capacity block of uninitialized `T` slots on the heap.
///
/// A HeapBuffer only manages memory. It never reads, writes or drops the values stored in its
/// slots, which makes it the responsibility of the owner to track which slots are initialized and
/// to drop them before the buffer is released. Dropping the buffer deallocates the block exactly
/// once.
///
/// Zero-sized layouts (capacity 0 or a zero-sized `T`) are never allocated, a dangling pointer is
/// used instead.
pub struct HeapBuffer<T> {
    pub(crate) ptr: NonNull<MaybeUninit<T>>,
    pub(crate) cap: usize,
    pub(crate) _phantom: PhantomData<T>,
}

impl<T> HeapBuffer<T> {
    /// Allocates a new HeapBuffer with room for exactly `cap` values of `T`.
    ///
    /// # Errors
    /// Returns [`CapacityOverflow`] if the layout of `cap` values would exceed [`isize::MAX`]
    /// bytes and [`AllocationFailure`] if the global allocator returns null. Nothing is allocated
    /// in either case.
    pub fn try_new(cap: usize) -> Result<HeapBuffer<T>, StorageError> {
        let layout = Self::make_layout(cap)?;

        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            // SAFETY: Zero-sized layouts have been guarded against.
            let raw_ptr: *mut MaybeUninit<T> = unsafe { alloc::alloc(layout).cast() };

            NonNull::new(raw_ptr).ok_or(AllocationFailure { bytes: layout.size() })?
        };

        Ok(HeapBuffer {
            ptr,
            cap,
            _phantom: PhantomData,
        })
    }

    /// Returns the number of slots in the buffer.
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Returns a pointer to the first slot.
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr().cast_const().cast()
    }

    /// Returns a mutable pointer to the first slot.
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr().cast()
    }

    /// A helper function to create a [`Layout`] for `cap` slots of `T`.
    pub(crate) fn make_layout(cap: usize) -> Result<Layout, CapacityOverflow> {
        Layout::array::<MaybeUninit<T>>(cap).map_err(|_| CapacityOverflow)
    }
}

impl<T> Drop for HeapBuffer<T> {
    fn drop(&mut self) {
        // The layout was valid when the buffer was created and neither cap nor T has changed.
        let Ok(layout) = Self::make_layout(self.cap) else {
            return;
        };

        if layout.size() != 0 {
            // SAFETY: ptr was allocated in the global allocator with this exact layout. Zero-sized
            // layouts aren't allocated and are guarded against deallocation.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), layout) }
        }
    }
}

impl<T> Debug for HeapBuffer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapBuffer")
            .field("ptr", &self.ptr)
            .field("cap", &self.cap)
            .finish()
    }
}

// SAFETY: A HeapBuffer uniquely owns its allocation, so it can be sent between threads whenever the
// values it may hold can be.
unsafe impl<T: Send> Send for HeapBuffer<T> {}
// SAFETY: HeapBuffer has no interior mutability, shared access only hands out const pointers.
unsafe impl<T: Sync> Sync for HeapBuffer<T> {}
