//! Shared helpers for the LargeMsg benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
