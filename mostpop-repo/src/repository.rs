//! Stale-while-revalidate repository for Most Popular feeds.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mostpop_cache::ResponseCache;
use mostpop_core::constants::DEFAULT_CACHE_TTL_SECONDS;
use mostpop_core::error::Result;
use mostpop_core::traits::Transport;
use mostpop_core::types::{ArticleApiResponse, FilterSpec, RequestDescriptor, ResultBatch};

use crate::resolver::EndpointResolver;
use crate::stream::ArticleStream;

/// Repository configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Age in seconds after which a cached response is revalidated
    pub ttl_seconds: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

impl RepositoryConfig {
    /// Returns the freshness threshold.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Articles repository combining the response cache and a transport.
///
/// Each call produces an independent [`ArticleStream`]:
/// 1. A cached response is emitted first when present.
/// 2. If it is younger than the TTL the stream ends without any I/O.
/// 3. Otherwise (stale or missing) the transport is called; on success the
///    response is cached and emitted, on failure the error ends the stream.
///
/// A failure after a cached emission does not retract that emission. The
/// repository never cancels earlier streams on its own; callers that switch
/// filters cancel the superseded stream themselves.
pub struct ArticlesRepository {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    resolver: EndpointResolver,
    config: RepositoryConfig,
}

impl ArticlesRepository {
    /// Creates a repository with default configuration.
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<ResponseCache>) -> Self {
        Self::with_config(transport, cache, RepositoryConfig::default())
    }

    /// Creates a repository with custom configuration.
    pub fn with_config(
        transport: Arc<dyn Transport>,
        cache: Arc<ResponseCache>,
        config: RepositoryConfig,
    ) -> Self {
        Self {
            transport,
            cache,
            resolver: EndpointResolver::default(),
            config,
        }
    }

    /// Replaces the endpoint resolver.
    pub fn with_resolver(mut self, resolver: EndpointResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Returns the shared response cache.
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Returns the configured freshness threshold.
    pub fn ttl(&self) -> Duration {
        self.config.ttl()
    }

    /// Streams the feed for `filter` using the configured TTL.
    pub fn fetch_articles(&self, filter: &FilterSpec) -> ArticleStream {
        self.fetch_sequence(filter, self.ttl())
    }

    /// Streams the feed for `filter`, revalidating cached data older than `ttl`.
    pub fn fetch_sequence(&self, filter: &FilterSpec, ttl: Duration) -> ArticleStream {
        let token = CancellationToken::new();
        let fetch = Revalidation {
            key: filter.cache_key(),
            request: self.resolver.resolve(filter),
            ttl,
            cache: self.cache.clone(),
            transport: self.transport.clone(),
            token: token.clone(),
        };

        let inner = stream::unfold((Step::Cached, fetch), |(step, fetch)| async move {
            let emitted = match step {
                Step::Cached => fetch.cached_or_refresh().await,
                Step::Refresh => fetch.refresh().await.map(|item| (item, Step::Done)),
                Step::Done => None,
            };
            emitted.map(|(item, next)| (item, (next, fetch)))
        });

        ArticleStream::new(inner.boxed(), token)
    }
}

/// Position of a stream in its emit-cached, maybe-refresh, done sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Cached,
    Refresh,
    Done,
}

/// State owned by one stream.
struct Revalidation {
    key: String,
    request: RequestDescriptor,
    ttl: Duration,
    cache: Arc<ResponseCache>,
    transport: Arc<dyn Transport>,
    token: CancellationToken,
}

impl Revalidation {
    /// First step: emit the cached batch if any, else go straight to the network.
    async fn cached_or_refresh(&self) -> Option<(Result<ResultBatch>, Step)> {
        if self.token.is_cancelled() {
            return None;
        }

        let Some(entry) = self.cache.get::<ArticleApiResponse>(&self.key).await else {
            debug!(key = %self.key, "Cache miss, fetching");
            return self.refresh().await.map(|item| (item, Step::Done));
        };

        let next = if entry.is_fresh(self.ttl) {
            debug!(key = %self.key, age = ?entry.age(), "Fresh cache hit");
            Step::Done
        } else {
            debug!(key = %self.key, age = ?entry.age(), "Stale cache hit, revalidating");
            Step::Refresh
        };

        if self.token.is_cancelled() {
            return None;
        }
        Some((Ok(entry.value.results), next))
    }

    /// Network step: fetch, cache on success, emit the result or the error.
    async fn refresh(&self) -> Option<Result<ResultBatch>> {
        let response = tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!(key = %self.key, "Cancelled before the fetch completed");
                return None;
            }
            response = self.transport.fetch(&self.request) => response,
        };

        // The fetch may have finished in the same instant as a cancel.
        if self.token.is_cancelled() {
            return None;
        }

        match response {
            Ok(response) => {
                self.cache.put(&self.key, &response).await;
                info!(key = %self.key, articles = response.results.len(), "Refreshed feed");
                if self.token.is_cancelled() {
                    return None;
                }
                Some(Ok(response.results))
            }
            Err(e) => {
                warn!(key = %self.key, path = %self.request.path, error = %e, "Feed fetch failed");
                Some(Err(e))
            }
        }
    }
}
