//! Controllers: handler groups under a path prefix.

use std::fmt;

use axum::http::Method;

use crate::handler::compile::{CompiledHandler, Handler};
use crate::handler::{register, RegistrationError};
use crate::routing::middleware::Middleware;

/// A registered handler: method, path, compiled endpoint, interceptors.
#[derive(Clone)]
pub struct Route {
    method: Method,
    path: String,
    endpoint: CompiledHandler,
    interceptors: Vec<Middleware>,
}

impl Route {
    pub(crate) fn new(method: Method, path: String, endpoint: CompiledHandler, interceptors: Vec<Middleware>) -> Self {
        Self {
            method,
            path,
            endpoint,
            interceptors,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the owning controller's prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn endpoint(&self) -> &CompiledHandler {
        &self.endpoint
    }

    pub fn interceptors(&self) -> &[Middleware] {
        &self.interceptors
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("plan", self.endpoint.plan())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

/// Per-route registration options.
#[derive(Clone, Default)]
pub struct RouteOptions {
    /// Middleware that wraps only this route, outermost first.
    pub interceptors: Vec<Middleware>,
}

impl RouteOptions {
    pub fn with_interceptor(mut self, interceptor: Middleware) -> Self {
        self.interceptors.push(interceptor);
        self
    }
}

/// A group of routes sharing a path prefix and middleware.
#[derive(Clone, Default)]
pub struct Controller {
    prefix: String,
    middlewares: Vec<Middleware>,
    routes: Vec<Route>,
}

impl Controller {
    pub fn new(prefix: impl Into<String>, middlewares: Vec<Middleware>) -> Self {
        Self {
            prefix: prefix.into(),
            middlewares,
            routes: Vec::new(),
        }
    }

    /// A controller without group middleware.
    pub fn base(prefix: impl Into<String>) -> Self {
        Self::new(prefix, Vec::new())
    }

    /// Validate, compile and add a handler.
    pub fn route<H, Args>(
        &mut self,
        method: Method,
        path: &str,
        handler: H,
        options: RouteOptions,
    ) -> Result<&mut Self, RegistrationError>
    where
        H: Handler<Args>,
        Args: 'static,
    {
        let route = register(method, path, handler, options.interceptors)?;
        tracing::debug!(
            method = %route.method(),
            path = %join_path(&self.prefix, route.path()),
            "Handler registered"
        );
        self.routes.push(route);
        Ok(self)
    }

    pub fn get<H: Handler<Args>, Args: 'static>(&mut self, path: &str, handler: H) -> Result<&mut Self, RegistrationError> {
        self.route(Method::GET, path, handler, RouteOptions::default())
    }

    pub fn post<H: Handler<Args>, Args: 'static>(&mut self, path: &str, handler: H) -> Result<&mut Self, RegistrationError> {
        self.route(Method::POST, path, handler, RouteOptions::default())
    }

    pub fn put<H: Handler<Args>, Args: 'static>(&mut self, path: &str, handler: H) -> Result<&mut Self, RegistrationError> {
        self.route(Method::PUT, path, handler, RouteOptions::default())
    }

    pub fn delete<H: Handler<Args>, Args: 'static>(&mut self, path: &str, handler: H) -> Result<&mut Self, RegistrationError> {
        self.route(Method::DELETE, path, handler, RouteOptions::default())
    }

    pub fn patch<H: Handler<Args>, Args: 'static>(&mut self, path: &str, handler: H) -> Result<&mut Self, RegistrationError> {
        self.route(Method::PATCH, path, handler, RouteOptions::default())
    }

    pub fn head<H: Handler<Args>, Args: 'static>(&mut self, path: &str, handler: H) -> Result<&mut Self, RegistrationError> {
        self.route(Method::HEAD, path, handler, RouteOptions::default())
    }

    pub fn options<H: Handler<Args>, Args: 'static>(&mut self, path: &str, handler: H) -> Result<&mut Self, RegistrationError> {
        self.route(Method::OPTIONS, path, handler, RouteOptions::default())
    }

    pub fn trace<H: Handler<Args>, Args: 'static>(&mut self, path: &str, handler: H) -> Result<&mut Self, RegistrationError> {
        self.route(Method::TRACE, path, handler, RouteOptions::default())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("prefix", &self.prefix)
            .field("middlewares", &self.middlewares.len())
            .field("routes", &self.routes)
            .finish()
    }
}

/// Join a group prefix and a route path into one absolute path.
///
/// An empty route path mounts at the prefix itself.
pub fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if path.is_empty() {
        return if prefix.is_empty() { "/".to_owned() } else { prefix.to_owned() };
    }
    let path = path.trim_start_matches('/');
    format!("{}/{}", prefix, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::context::RequestContext;
    use crate::handler::reply::JsonReply;
    use crate::handler::signature::SignatureError;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct UserPath {
        #[allow(dead_code)]
        id: u64,
    }
    crate::param!(UserPath: PathParam);

    #[derive(Deserialize)]
    struct Unmarked;
    crate::param!(Unmarked:);

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/api", "/users"), "/api/users");
        assert_eq!(join_path("/api/", "users"), "/api/users");
        assert_eq!(join_path("/api", "/"), "/api/");
        assert_eq!(join_path("", "/users"), "/users");
        assert_eq!(join_path("/", "/"), "/");
        assert_eq!(join_path("/api", ""), "/api");
        assert_eq!(join_path("/api/", ""), "/api");
        assert_eq!(join_path("", ""), "/");
    }

    #[test]
    fn test_chained_registration() {
        let mut controller = Controller::base("/users");
        controller
            .get("/{id}", |_p: UserPath| async {})
            .unwrap()
            .delete("/{id}", |_ctx: RequestContext, _p: UserPath| async {
                (204u16, None::<JsonReply<()>>, None::<anyhow::Error>)
            })
            .unwrap();

        let routes = controller.routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].method(), Method::GET);
        assert_eq!(routes[1].method(), Method::DELETE);
        assert_eq!(routes[1].path(), "/{id}");
        assert!(routes[1].endpoint().plan().with_context());
    }

    #[test]
    fn test_registration_errors_name_route() {
        let mut controller = Controller::base("/");

        let err = controller.post("/things", |_u: Unmarked| async {}).unwrap_err();
        assert_eq!(err.method, Method::POST);
        assert_eq!(err.path, "/things");
        assert!(matches!(err.source, SignatureError::UnknownParamType { position: 0, .. }));
        assert!(err.to_string().contains("unknown param type"));

        let err = controller
            .get("/ctx", |_p: UserPath, _ctx: RequestContext| async {})
            .unwrap_err();
        assert!(matches!(err.source, SignatureError::ContextNotFirst { position: 1, .. }));

        let err = controller
            .get("/status", || async { ("ok".to_string(), JsonReply(1), None::<anyhow::Error>) })
            .unwrap_err();
        assert!(matches!(err.source, SignatureError::StatusNotInteger(_)));

        let err = controller.get("/pair", || async { (200u16, JsonReply(1)) }).unwrap_err();
        assert_eq!(err.source, SignatureError::OutputArity(2));

        assert!(controller.routes().is_empty());
    }
}
