//! Per-request dispatch.
//!
//! # Responsibilities
//! - Create the request context (request id, deadline, cancellation)
//! - Run the compiled handler: extraction in plan order, then one call
//! - Route the outcome to exactly one of the error or response handler
//!
//! # Design Decisions
//! - Error and response handlers are injected at construction, never global
//! - Cancellation is cooperative; a running handler is never preempted
//! - Nothing here can meet a type error, only bind or handler errors

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::binding::context::RequestContext;
use crate::binding::extract::Binder;
use crate::handler::compile::Endpoint;
use crate::handler::output::Outcome;
use crate::http::responders::{DefaultErrorHandler, DefaultResponseHandler, ErrorHandler, ResponseHandler};
use crate::observability::metrics;

pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Runs compiled handlers against requests.
#[derive(Clone)]
pub struct Dispatcher {
    error_handler: Arc<dyn ErrorHandler>,
    response_handler: Arc<dyn ResponseHandler>,
    timeout: Option<Duration>,
    body_limit: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(DefaultErrorHandler), Arc::new(DefaultResponseHandler))
    }
}

impl Dispatcher {
    pub fn new(error_handler: Arc<dyn ErrorHandler>, response_handler: Arc<dyn ResponseHandler>) -> Self {
        Self {
            error_handler,
            response_handler,
            timeout: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Deadline given to each request context.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Maximum body size read by body extractors.
    #[must_use]
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Handle one request with `endpoint`.
    pub async fn dispatch(&self, endpoint: &dyn Endpoint, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().to_string();
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|m| m.as_str().to_owned())
            .unwrap_or_else(|| request.uri().path().to_owned());

        // Dropping the guard (request finished or abandoned) cancels the context.
        let (context, _guard) = RequestContext::for_request(request.headers(), self.timeout);
        let request_id = context.request_id().to_owned();
        let binder = Binder::new(request, context, endpoint.plan().clone(), self.body_limit);

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            route = %route,
            "Dispatching request"
        );

        let response = match endpoint.invoke(binder).await {
            Err(bind_error) => {
                tracing::warn!(
                    request_id = %request_id,
                    route = %route,
                    error = %bind_error,
                    "Failed to bind handler arguments"
                );
                metrics::record_bind_error(&route);
                self.error_handler.handle(bind_error.into())
            }
            Ok(Outcome::Empty) => StatusCode::NO_CONTENT.into_response(),
            Ok(Outcome::Failed(error)) => self.error_handler.handle(error),
            Ok(Outcome::Reply { status, response }) => match StatusCode::from_u16(status) {
                Ok(status) => self.response_handler.respond(status, response),
                Err(_) => self
                    .error_handler
                    .handle(anyhow::anyhow!("handler returned invalid status code {}", status)),
            },
        };

        metrics::record_request(&method, &route, response.status().as_u16(), start);
        response
    }
}
