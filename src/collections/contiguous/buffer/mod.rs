//! A module containing [`HeapBuffer`], the raw heap allocation that backs a
//! [`HybridVector`](super::HybridVector) once it outgrows its inline storage.

mod heap_buffer;

pub use heap_buffer::*;
