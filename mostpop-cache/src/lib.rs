//! Response cache for mostpop.
//!
//! One bounded in-memory store of serialized payloads keyed by string. Values
//! are encoded and decoded at the call boundary, so a single store can hold
//! heterogeneous types; a read that cannot be decoded as the requested type is
//! a miss.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod entry;

pub use cache::{CacheConfig, ResponseCache};
pub use entry::CacheEntry;
