use std::mem::MaybeUninit;

use derive_more::{Display, IsVariant};

use crate::collections::contiguous::buffer::HeapBuffer;
use crate::util::error::CapacityOverflow;

const GROWTH_NUMERATOR: usize = 3;
const GROWTH_DENOMINATOR: usize = 2;

/// Which of the two buffers of a [`HybridVector`](super::HybridVector) currently holds its
/// elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IsVariant)]
pub enum StorageMode {
    /// Elements live in the fixed-size array embedded in the vector itself.
    Inline,
    /// Elements live in a separately owned [`HeapBuffer`].
    Heap,
}

/// The live buffer of a HybridVector. Only one of the two representations exists at a time and the
/// variant is always matched on before touching a slot.
pub(crate) enum Storage<T, const N: usize> {
    Inline([MaybeUninit<T>; N]),
    Heap(HeapBuffer<T>),
}

impl<T, const N: usize> Storage<T, N> {
    pub(crate) const fn inline() -> Storage<T, N> {
        Storage::Inline([const { MaybeUninit::uninit() }; N])
    }

    pub(crate) const fn cap(&self) -> usize {
        match self {
            Storage::Inline(_) => N,
            Storage::Heap(buf) => buf.cap(),
        }
    }

    pub(crate) const fn mode(&self) -> StorageMode {
        match self {
            Storage::Inline(_) => StorageMode::Inline,
            Storage::Heap(_) => StorageMode::Heap,
        }
    }

    pub(crate) const fn as_ptr(&self) -> *const T {
        match self {
            Storage::Inline(arr) => arr.as_ptr().cast(),
            Storage::Heap(buf) => buf.as_ptr(),
        }
    }

    pub(crate) const fn as_mut_ptr(&mut self) -> *mut T {
        match self {
            Storage::Inline(arr) => arr.as_mut_ptr().cast(),
            Storage::Heap(buf) => buf.as_mut_ptr(),
        }
    }
}

/// Returns the capacity to allocate when `required` slots are needed: `ceil(1.5 * required)`.
///
/// The factor is applied to the required size rather than the old capacity, so a single insertion
/// of many elements allocates proportionally to the result.
///
/// # Errors
/// Returns [`CapacityOverflow`] if the result can't be represented as a [`usize`].
pub(crate) const fn grown_cap(required: usize) -> Result<usize, CapacityOverflow> {
    match required.checked_mul(GROWTH_NUMERATOR) {
        Some(scaled) => Ok(scaled.div_ceil(GROWTH_DENOMINATOR)),
        None => Err(CapacityOverflow),
    }
}
