//! # mostpop Core
//!
//! Core types, errors, and traits for the mostpop "most popular" feed client.
//!
//! This crate provides the foundational building blocks used by all other mostpop crates:
//!
//! - **Types**: Filters, article models and transport request descriptors
//! - **Errors**: The feed error taxonomy shared by transports and the repository
//! - **Constants**: API paths, defaults and well-known keys
//! - **Traits**: Collaborator interfaces (transport, connectivity)
//!
//! ## Example
//!
//! ```rust
//! use mostpop_core::{EndpointKind, FilterSpec, Period};
//!
//! let filter = FilterSpec::new(EndpointKind::Viewed, Period::Day);
//! assert_eq!(filter.cache_key(), "viewed-1-all-sections-none");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{FeedError, Result, TransportErrorKind};
pub use traits::*;
pub use types::*;
