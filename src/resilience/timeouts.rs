//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Cancel the wrapped operation cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future releases its socket
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout
//! - Relayed bodies get an idle deadline, reset on every frame, so a slow
//!   but live stream is never cut while a stalled one is

use axum::body::Bytes;
use axum::BoxError;
use hyper::body::{Body, Frame, SizeHint};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, Sleep};

use crate::http::response::ProxyError;

/// Await `fut` for at most `limit`, mapping its error and expiry into [`ProxyError`].
pub async fn bounded<F, T, E>(limit: Duration, fut: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, E>>,
    ProxyError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ProxyError::from),
        Err(_) => Err(ProxyError::Timeout(limit)),
    }
}

/// The upstream body produced no frame within the idle deadline.
#[derive(Debug, Error)]
#[error("upstream body idle for {0:?}")]
pub struct BodyIdleTimeout(pub Duration);

/// Body wrapper that fails the stream once the inner body stays pending for
/// longer than `idle`.
pub struct IdleTimeoutBody<B> {
    inner: B,
    idle: Duration,
    deadline: Pin<Box<Sleep>>,
}

impl<B> IdleTimeoutBody<B> {
    pub fn new(inner: B, idle: Duration) -> Self {
        Self {
            inner,
            idle,
            deadline: Box::pin(tokio::time::sleep(idle)),
        }
    }
}

impl<B> Body for IdleTimeoutBody<B>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Into<BoxError>,
{
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = &mut *self;

        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(frame) => {
                let next = Instant::now() + this.idle;
                this.deadline.as_mut().reset(next);
                Poll::Ready(frame.map(|result| result.map_err(Into::into)))
            }
            Poll::Pending => match this.deadline.as_mut().poll(cx) {
                Poll::Ready(()) => {
                    tracing::warn!(idle_ms = this.idle.as_millis() as u64, "Upstream body stalled");
                    Poll::Ready(Some(Err(BodyIdleTimeout(this.idle).into())))
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
