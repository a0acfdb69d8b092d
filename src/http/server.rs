//! HTTP server setup.
//!
//! # Responsibilities
//! - Turn registered controllers into one Axum Router
//! - Wire up middleware (global, group, per-route) around the dispatcher
//! - Reject duplicate method+path pairs before serving
//! - Serve on a listener until the shutdown signal fires

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::Method,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::{validate_config, ServerConfig, ValidationError};
use crate::handler::dispatch::Dispatcher;
use crate::http::responders::{DefaultErrorHandler, DefaultResponseHandler, ErrorHandler, ResponseHandler};
use crate::lifecycle::shutdown;
use crate::routing::controller::{join_path, Controller, Route};
use crate::routing::middleware::{wrap_route, wrap_router, Middleware};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("duplicate route {method} {path}")]
    DuplicateRoute { method: Method, path: String },

    #[error("unsupported method {method} for {path}")]
    UnsupportedMethod { method: Method, path: String },

    #[error("invalid configuration: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Config(Vec<ValidationError>),
}

/// Everything a server is built from.
pub struct ServerOptions {
    pub controllers: Vec<Controller>,
    /// Global middleware, outermost first.
    pub middlewares: Vec<Middleware>,
    pub error_handler: Arc<dyn ErrorHandler>,
    pub response_handler: Arc<dyn ResponseHandler>,
    pub config: ServerConfig,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            controllers: Vec::new(),
            middlewares: Vec::new(),
            error_handler: Arc::new(DefaultErrorHandler),
            response_handler: Arc::new(DefaultResponseHandler),
            config: ServerConfig::default(),
        }
    }
}

/// HTTP server serving registered controllers.
pub struct Server {
    router: Router,
    config: ServerConfig,
}

impl Server {
    /// Build the router for `options`.
    pub fn new(options: ServerOptions) -> Result<Self, ServerError> {
        let ServerOptions {
            controllers,
            middlewares,
            error_handler,
            response_handler,
            config,
        } = options;

        validate_config(&config).map_err(ServerError::Config)?;

        let dispatcher = Dispatcher::new(error_handler, response_handler)
            .with_timeout(config.timeouts.request())
            .with_body_limit(config.listener.max_body_bytes);

        let mut seen = HashSet::new();
        let mut router = Router::new();
        let mut route_count = 0usize;

        for controller in &controllers {
            let mut group = Router::new();
            for route in controller.routes() {
                let path = join_path(controller.prefix(), route.path());
                if !seen.insert((route.method().clone(), path.clone())) {
                    return Err(ServerError::DuplicateRoute {
                        method: route.method().clone(),
                        path,
                    });
                }
                let method_router = Self::method_router(route, &path, &dispatcher)?;
                group = group.route(&path, method_router);
                route_count += 1;
            }
            router = router.merge(wrap_router(group, controller.middlewares()));
        }

        router = wrap_router(router, &middlewares).layer(TraceLayer::new_for_http());
        if config.listener.recover_panics {
            router = router.layer(CatchPanicLayer::new());
        }

        tracing::info!(
            controllers = controllers.len(),
            routes = route_count,
            "Router built"
        );

        Ok(Self { router, config })
    }

    /// One route: dispatcher call wrapped in the route's interceptors.
    fn method_router(route: &Route, path: &str, dispatcher: &Dispatcher) -> Result<MethodRouter, ServerError> {
        let filter = MethodFilter::try_from(route.method().clone()).map_err(|_| ServerError::UnsupportedMethod {
            method: route.method().clone(),
            path: path.to_owned(),
        })?;

        let endpoint = route.endpoint().clone();
        let dispatcher = dispatcher.clone();
        let method_router = on(filter, move |request: Request| {
            let endpoint = endpoint.clone();
            let dispatcher = dispatcher.clone();
            async move { dispatcher.dispatch(endpoint.as_ref(), request).await }
        });

        Ok(wrap_route(method_router, route.interceptors()))
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `signal` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, signal: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(signal))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
