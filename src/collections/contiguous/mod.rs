//! Collections whose elements are stored contiguously, in a buffer that starts inline and moves to
//! the heap as it grows.
//!
//! The main type here is [`HybridVector`], which keeps its first `N` elements inside the vector
//! itself. [`HybridString`] layers byte string operations on top of it. [`HeapBuffer`] is the raw,
//! uninitialized allocation that both fall back to.

pub mod buffer;
pub mod hybrid_vector;
#[cfg(feature = "string")]
pub mod hybrid_string;

#[doc(inline)]
pub use buffer::HeapBuffer;
#[doc(inline)]
pub use hybrid_vector::{HybridVector, StorageMode};
#[cfg(feature = "string")]
#[doc(inline)]
pub use hybrid_string::HybridString;
