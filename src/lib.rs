//! Type-directed request handler binding for Axum.
//!
//! Handlers are plain async functions. Each argument type declares how it is
//! bound (path parameters, structured data, headers, or the request context)
//! and the return type declares a status, a reply, and an optional error.
//! Signatures are checked once at registration; requests only extract and call.

pub mod binding;
pub mod config;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use binding::{BindError, Capability, Param, RequestContext};
pub use config::ServerConfig;
pub use handler::{JsonReply, RawReply, RegistrationError, Reply, XmlReply};
pub use http::{ErrorHandler, ResponseHandler, Server, ServerError, ServerOptions};
pub use lifecycle::Shutdown;
pub use routing::{middleware, Controller, Middleware, RouteOptions};
