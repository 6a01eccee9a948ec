//! This crate provides hybrid collections: containers that keep a small, fixed number of elements
//! inline and only reach for the heap once they outgrow it.
//!
//! # Purpose
//! Most vectors in a program hold a handful of elements, yet a heap-backed vector allocates for
//! every one of them. [`HybridVector<T, N>`](collections::contiguous::HybridVector) stores up to
//! `N` elements inside itself, *promotes* to a heap buffer when more are needed and *demotes* back
//! once it shrinks to exactly `N` again. [`HybridString<N>`](collections::contiguous::HybridString)
//! applies the same idea to byte strings, with conversions to and from C strings.
//!
//! # Method
//! The storage is a tagged union of an inline `[MaybeUninit<T>; N]` array and a
//! [`HeapBuffer<T>`](collections::contiguous::HeapBuffer). Only one of them exists at a time, so
//! the compiler rather than a flag keeps track of which buffer is live. Elements are moved between
//! the two bitwise, without being cloned or dropped.
//!
//! Heap buffers are sized to `ceil(1.5 * required)`, where `required` is the length needed by the
//! operation in question, not the old capacity. A single large insertion therefore allocates
//! proportionally to its result.
//!
//! # Error Handling
//! Specifically for a collection, it is more ergonomic for functions to panic in some cases,
//! because users don't want to be forced to handle an error every time they invoke a method. For
//! example, imagine having to handle the possibility of a capacity overflow every time you push
//! into a vector. Every allocating method therefore comes in two forms: `method` panics with the
//! message of the error, while `try_method` returns it.
//!
//! When this crate employs errors via [`Result`]s, it does so in a method that is strongly typed,
//! using enums for static dispatch rather than dynamic, with structs (often ZSTs) that implement
//! [`Error`](std::error::Error).
//!
//! # Logging
//! Transitions between storage modes are reported as [`tracing`] events at the `TRACE` level. No
//! subscriber is installed by this crate.
//!
//! # Dependencies
//! This crate depends on some derive macros because they're helpful and remove the need for some
//! very repetitive programming, and on [`tracing`] for its events.

#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

#[cfg(feature = "collections")]
pub mod collections;

pub(crate) mod util;

/// Creates a [`HybridVector`](collections::contiguous::HybridVector) containing the arguments,
/// using inline storage if they fit.
///
/// - `hybrid_vec![]` creates an empty vector.
/// - `hybrid_vec![a, b, c]` creates a vector of the given elements, in order.
/// - `hybrid_vec![item; count]` creates a vector of `count` clones of `item`.
///
/// # Examples
/// ```
/// # use hybrid_lib::hybrid_vec;
/// # use hybrid_lib::collections::contiguous::HybridVector;
/// let vec: HybridVector<_, 4> = hybrid_vec![1, 2, 3];
/// assert_eq!(vec, [1, 2, 3]);
/// assert!(vec.is_inline());
///
/// let vec: HybridVector<_, 4> = hybrid_vec![0; 5];
/// assert_eq!(vec, [0; 5]);
/// assert!(vec.is_heap());
/// ```
#[macro_export]
macro_rules! hybrid_vec {
    () => {
        $crate::collections::contiguous::HybridVector::new()
    };
    ($item:expr; $count:expr) => {
        $crate::collections::contiguous::HybridVector::repeat_item($item, $count)
    };
    ($($item:expr),+ $(,)?) => {
        $crate::collections::contiguous::HybridVector::from([$($item),+])
    };
}
