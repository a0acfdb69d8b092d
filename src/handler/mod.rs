//! Handler compilation and dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     handler fn
//!     → signature.rs (classify params, check outputs → ArgumentPlan)
//!     → compile.rs (pair fn with plan → CompiledHandler)
//!     → Route descriptor
//!
//! Request:
//!     Request<Body>
//!     → dispatch.rs (context, Binder, invoke)
//!     → output.rs (Outcome: empty / reply / failure)
//!     → error handler or response handler (exactly one)
//! ```

pub mod compile;
pub mod dispatch;
pub mod output;
pub mod reply;
pub mod signature;

use axum::http::Method;
use thiserror::Error;

use crate::routing::controller::Route;
use crate::routing::middleware::Middleware;

pub use compile::{compile, CompiledHandler, Endpoint, Handler};
pub use dispatch::{Dispatcher, DEFAULT_BODY_LIMIT};
pub use output::{Outcome, Output, OutputValue};
pub use reply::{Format, JsonReply, RawReply, Reply, XmlReply};
pub use signature::{validate, ArgumentPlan, OutputShape, PlanEntry, Signature, SignatureError, SlotKind, SlotSpec};

/// A handler was refused at registration.
#[derive(Debug, Error)]
#[error("invalid handler for {method} {path}: {source}")]
pub struct RegistrationError {
    pub method: Method,
    pub path: String,
    #[source]
    pub source: SignatureError,
}

/// Validate `handler` and compile it into a route descriptor.
pub fn register<H, Args>(
    method: Method,
    path: &str,
    handler: H,
    interceptors: Vec<Middleware>,
) -> Result<Route, RegistrationError>
where
    H: Handler<Args>,
    Args: 'static,
{
    let plan = validate(&H::signature()).map_err(|source| RegistrationError {
        method: method.clone(),
        path: path.to_owned(),
        source,
    })?;

    tracing::debug!(
        method = %method,
        path = %path,
        arity = plan.arity(),
        with_context = plan.with_context(),
        "Compiled handler"
    );

    let endpoint = compile(handler, plan);
    Ok(Route::new(method, path.to_owned(), endpoint, interceptors))
}
