//! Cancellable result streams.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Fuse, FusedStream, Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use mostpop_core::error::{FeedError, Result};
use mostpop_core::types::ResultBatch;

/// Handle that cancels an [`ArticleStream`] from anywhere.
///
/// Cancelling is idempotent. Once cancelled the stream yields nothing more
/// and skips any cache write it has not committed yet.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Cancels the stream.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the stream was cancelled or dropped.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Lazy stream of at most two result batches followed by an optional
/// terminal error.
///
/// Nothing happens until the stream is first polled. Dropping the stream
/// cancels it. Polling past the end keeps returning `None`.
pub struct ArticleStream {
    inner: Fuse<BoxStream<'static, Result<ResultBatch>>>,
    token: CancellationToken,
}

impl ArticleStream {
    pub(crate) fn new(inner: BoxStream<'static, Result<ResultBatch>>, token: CancellationToken) -> Self {
        Self {
            inner: inner.fuse(),
            token,
        }
    }

    /// Returns a handle that can cancel this stream.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.token.clone(),
        }
    }

    /// Cancels the stream.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Drives the stream to completion.
    ///
    /// Returns every batch in emission order and the terminal error, if any.
    pub async fn drain(mut self) -> (Vec<ResultBatch>, Option<FeedError>) {
        let mut batches = Vec::new();
        while let Some(item) = self.next().await {
            match item {
                Ok(batch) => batches.push(batch),
                Err(e) => return (batches, Some(e)),
            }
        }
        (batches, None)
    }
}

impl Stream for ArticleStream {
    type Item = Result<ResultBatch>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.token.is_cancelled() {
            return Poll::Ready(None);
        }
        self.inner.poll_next_unpin(cx)
    }
}

impl FusedStream for ArticleStream {
    fn is_terminated(&self) -> bool {
        self.token.is_cancelled() || self.inner.is_terminated()
    }
}

impl Drop for ArticleStream {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl fmt::Debug for ArticleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleStream")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}
