//! Headless orchestration of a Most Popular feed.
//!
//! [`FeedController`] owns the current filter, drives the repository's result
//! streams and folds their emissions into a [`ViewState`] that any front end
//! can observe. [`ConnectivityMonitor`] is an in-process connectivity signal
//! that platform code (or tests) can flip.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod connectivity;
mod controller;
mod state;

pub use connectivity::ConnectivityMonitor;
pub use controller::FeedController;
pub use state::ViewState;
