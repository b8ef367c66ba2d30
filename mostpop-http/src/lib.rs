//! HTTP transport for the NYT Most Popular API.
//!
//! Turns request descriptors into authenticated GET requests and classifies
//! every failure into a [`FeedError`](mostpop_core::FeedError) variant.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;
mod config;

pub use client::HttpTransport;
pub use config::{ApiEnvironment, HttpConfig};
