//! Group middleware and per-route interceptors.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::{from_fn, Next},
    response::Response,
    routing::MethodRouter,
    Router,
};
use futures_util::future::BoxFuture;

/// Request middleware shared by a server, a controller, or a single route.
pub type Middleware = Arc<dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync>;

/// Build a [`Middleware`] from an async function or closure.
///
/// ```ignore
/// let audit = dessert::middleware(|req, next: Next| async move {
///     tracing::info!(path = %req.uri().path(), "audit");
///     next.run(req).await
/// });
/// ```
pub fn middleware<F, Fut>(f: F) -> Middleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |request: Request, next: Next| -> BoxFuture<'static, Response> {
        Box::pin(f(request, next))
    })
}

/// Wrap every route of `router`; the first middleware runs first.
pub(crate) fn wrap_router(router: Router, middlewares: &[Middleware]) -> Router {
    middlewares.iter().rev().fold(router, |router, mw| {
        let mw = mw.clone();
        router.layer(from_fn(move |request: Request, next: Next| (*mw)(request, next)))
    })
}

/// Wrap a single route; the first interceptor runs first.
pub(crate) fn wrap_route(route: MethodRouter, interceptors: &[Middleware]) -> MethodRouter {
    interceptors.iter().rev().fold(route, |route, mw| {
        let mw = mw.clone();
        route.layer(from_fn(move |request: Request, next: Next| (*mw)(request, next)))
    })
}
