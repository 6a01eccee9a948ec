//! A module containing [`HybridVector`] and associated types.
//!
//! Besides the vector itself, this includes [`StorageMode`] for inspecting where the elements
//! currently live, [`IntoIter`] for owned iteration and [`Cursor`] / [`CursorMut`] for random-access
//! traversal. [`Iter`](std::slice::Iter) and [`IterMut`](std::slice::IterMut) from [`std::slice`]
//! are used for borrowed iteration, reversed with [`Iterator::rev`].
//!
//! [`HybridVector`] is also re-exported under the parent module.

mod cursor;
mod hybrid_vector;
mod iter;
mod storage;
mod tests;

pub use cursor::*;
pub use hybrid_vector::*;
pub use iter::*;
pub use storage::StorageMode;
#[doc(inline)]
pub use crate::util::error::{AllocationFailure, CapacityOverflow, IndexOutOfBounds, StorageError};
