//! Cancellation-aware request context.
//!
//! A handler that takes a [`RequestContext`] as its first argument receives the
//! request's own cancellation scope. The scope is cancelled when the request
//! deadline passes or when the request future is dropped (client went away).
//! Cancellation is cooperative: nothing preempts a running handler.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

use crate::binding::capability::{Capabilities, Capability};
use crate::binding::error::BindError;
use crate::binding::param::Param;
use crate::binding::source::Source;

pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug)]
struct Inner {
    request_id: String,
    deadline: Option<Instant>,
    cancelled: watch::Sender<bool>,
}

/// Per-request cancellation scope handed to handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<Inner>,
}

/// Cancels the owning context when dropped.
#[derive(Debug)]
pub struct CancelGuard {
    context: RequestContext,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.context.cancel();
    }
}

impl RequestContext {
    /// Create a context with an optional timeout and the guard that ends it.
    pub fn new(request_id: impl Into<String>, timeout: Option<Duration>) -> (Self, CancelGuard) {
        let (cancelled, _) = watch::channel(false);
        let context = Self {
            inner: Arc::new(Inner {
                request_id: request_id.into(),
                deadline: timeout.map(|t| Instant::now() + t),
                cancelled,
            }),
        };
        let guard = CancelGuard {
            context: context.clone(),
        };
        (context, guard)
    }

    /// Create a context for an inbound request, reusing its `X-Request-ID`.
    pub fn for_request(headers: &HeaderMap, timeout: Option<Duration>) -> (Self, CancelGuard) {
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self::new(request_id, timeout)
    }

    pub fn request_id(&self) -> &str {
        &self.inner.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline; `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Cancel the scope. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.borrow()
            || self.inner.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the scope is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.cancelled.subscribe();
        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = rx.wait_for(|c| *c) => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => {
                // The sender lives in `inner`, so the channel cannot close here.
                let _ = rx.wait_for(|c| *c).await;
            }
        }
    }
}

impl Param for RequestContext {
    fn capabilities() -> Capabilities {
        Capability::Context.into()
    }

    fn is_context() -> bool {
        true
    }

    fn decode(source: Source) -> Result<Self, BindError> {
        match source {
            Source::Context(context) => Ok(context),
            other => Err(BindError::new(
                crate::binding::error::BindLocation::Plan,
                format!("request context cannot be built from {}", other.kind()),
            )),
        }
    }
}
