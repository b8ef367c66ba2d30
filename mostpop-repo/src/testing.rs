//! In-process transports and fixtures for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use mostpop_core::error::{FeedError, Result};
use mostpop_core::traits::Transport;
use mostpop_core::types::{Article, ArticleApiResponse, RequestDescriptor};

/// Builds an article whose fields are derived from `id`.
pub fn sample_article(id: u64) -> Article {
    Article {
        id,
        url: format!("https://www.nytimes.com/2025/07/10/article-{}.html", id),
        published_date: "2025-07-10".into(),
        byline: "By Tester".into(),
        title: format!("Article {}", id),
        summary: "Abstract".into(),
        media: Vec::new(),
        section: "Technology".into(),
    }
}

/// Builds an "OK" response holding one sample article per id.
pub fn sample_response(ids: &[u64]) -> ArticleApiResponse {
    ArticleApiResponse::ok(ids.iter().copied().map(sample_article).collect())
}

type Responder = Box<dyn Fn() -> Result<ArticleApiResponse> + Send + Sync>;

/// Transport that answers every call from a closure and counts calls.
pub struct ScriptedTransport {
    respond: Responder,
    calls: AtomicUsize,
    last_request: Mutex<Option<RequestDescriptor>>,
}

impl ScriptedTransport {
    /// Always succeeds with `response`.
    pub fn succeeding(response: ArticleApiResponse) -> Self {
        Self::new(move || Ok(response.clone()))
    }

    /// Always fails with the error built by `error`.
    pub fn failing(error: impl Fn() -> FeedError + Send + Sync + 'static) -> Self {
        Self::new(move || Err(error()))
    }

    /// Answers with `respond`.
    pub fn new(respond: impl Fn() -> Result<ArticleApiResponse> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of fetches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<RequestDescriptor> {
        self.last_request.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<ArticleApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());
        (self.respond)()
    }
}

/// Transport that blocks every fetch until [`GatedTransport::release`].
pub struct GatedTransport {
    response: ArticleApiResponse,
    gate: Notify,
    calls: AtomicUsize,
}

impl GatedTransport {
    /// Creates a gate that will eventually answer with `response`.
    pub fn new(response: ArticleApiResponse) -> Self {
        Self {
            response,
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Lets one pending (or the next) fetch complete.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Number of fetches started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn fetch(&self, _request: &RequestDescriptor) -> Result<ArticleApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.response.clone())
    }
}
