//! Route and group registry.
//!
//! # Data Flow
//! ```text
//! Registration (before serving):
//!     Controller::get/post/... (handler fn)
//!     → handler::register (validate signature, compile)
//!     → Route descriptor appended to the controller
//!
//! Server construction:
//!     Controllers
//!     → full path = prefix + route path
//!     → per-route interceptors, then group middleware
//!     → merged into one axum Router
//! ```
//!
//! # Design Decisions
//! - Registration returns errors instead of panicking
//! - Descriptors are immutable once registered
//! - Group middleware only wraps the group's own routes

pub mod controller;
pub mod middleware;

pub use controller::{join_path, Controller, Route, RouteOptions};
pub use middleware::{middleware, Middleware};
