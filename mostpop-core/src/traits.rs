//! Collaborator traits for mostpop.
//!
//! The repository consumes these capabilities without knowing how they are
//! implemented, which keeps HTTP and platform connectivity out of the core and
//! lets tests substitute in-process fakes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;
use crate::types::{ArticleApiResponse, RequestDescriptor};

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSPORT TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Network fetch capability.
///
/// Implementations perform the I/O for a [`RequestDescriptor`] (adding host,
/// credentials and any extra query) and decode the body. Failures are
/// classified with the transport variants of
/// [`FeedError`](crate::error::FeedError).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches and decodes one feed.
    async fn fetch(&self, request: &RequestDescriptor) -> Result<ArticleApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<ArticleApiResponse> {
        (**self).fetch(request).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONNECTIVITY TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Connectivity signal consumed by orchestration layers.
///
/// The repository itself never checks connectivity.
pub trait ConnectivitySignal: Send + Sync {
    /// Returns the current connectivity.
    fn is_online(&self) -> bool;

    /// Subscribes to connectivity changes.
    ///
    /// The receiver observes the current value immediately and is notified
    /// only when the value actually changes.
    fn subscribe(&self) -> watch::Receiver<bool>;
}
