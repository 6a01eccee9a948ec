//! A module containing [`HybridString`], a byte string built on
//! [`HybridVector<u8, N>`](super::HybridVector) with C string interoperability.
//!
//! [`HybridString`] is also re-exported under the parent module.

mod hybrid_string;

pub use hybrid_string::*;
