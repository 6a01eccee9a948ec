use std::error::Error;
use std::fmt::{self, Display, Formatter};

use derive_more::{Display, Error, From, IsVariant, TryInto};

/// An index (or range bound) fell outside of the live elements of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfBounds {
    /// The offending index.
    pub index: usize,
    /// The number of live elements at the time of the access.
    pub len: usize,
}

impl Display for IndexOutOfBounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Index {} out of bounds for collection with {} elements!", self.index, self.len)
    }
}

impl Error for IndexOutOfBounds {}

/// The requested capacity can't be represented as a memory layout, either because the growth
/// arithmetic overflowed or because the byte size would exceed [`isize::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Capacity overflow!")]
pub struct CapacityOverflow;

/// The global allocator couldn't provide a block of the requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Failed to allocate {bytes} bytes for heap storage!")]
pub struct AllocationFailure {
    /// The size of the rejected allocation.
    pub bytes: usize,
}

/// Every way that growing the storage of a collection can fail.
///
/// Neither variant is worth retrying: a failed operation leaves the collection as it was before
/// the call and the error is handed straight back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From, TryInto, IsVariant)]
pub enum StorageError {
    /// See [`CapacityOverflow`].
    CapacityOverflow(CapacityOverflow),
    /// See [`AllocationFailure`].
    AllocationFailure(AllocationFailure),
}
