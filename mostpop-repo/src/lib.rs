//! # mostpop Repository
//!
//! Stale-while-revalidate access to Most Popular feeds.
//!
//! [`ArticlesRepository`] answers each request with an [`ArticleStream`] that
//! emits the cached feed right away (if any) and follows up with a refreshed
//! one when the cache is missing or older than the TTL.
//!
//! ## Example
//!
//! ```rust,ignore
//! let repo = ArticlesRepository::new(transport, Arc::new(ResponseCache::new()));
//! let mut stream = repo.fetch_articles(&FilterSpec::default());
//! while let Some(batch) = stream.next().await {
//!     render(batch?);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod repository;
mod resolver;
mod stream;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use repository::{ArticlesRepository, RepositoryConfig};
pub use resolver::{resolve, EndpointResolver};
pub use stream::{ArticleStream, CancelHandle};
