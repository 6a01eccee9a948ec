//! Collection types with hybrid inline / heap storage.
//!
//! # Purpose
//! Small collections are common, and allocating for every one of them is wasteful. The types here
//! keep a fixed number of elements inside the collection itself and only allocate once they grow
//! past it.
//!
//! # Method
//! Applicable types here implement [`Deref<Target = [T]>`](std::ops::Deref) (and DerefMut), which
//! saves me from writing some of the more repetitive functionality.

#[cfg(feature = "contiguous")]
pub mod contiguous;
