//! Fixtures shared by the tests of the bridge crates.
//!
//! Headers are produced in their real RLP form so that hashing and decoding go through the same
//! path as in production.

pub mod headers;
pub mod receipts;
