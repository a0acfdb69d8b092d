//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router: global → group → route middleware)
//!     → handler::Dispatcher (bind arguments, call handler)
//!     → responders.rs (error handler or response handler)
//!     → Send to client
//! ```

pub mod responders;
pub mod server;

pub use responders::{DefaultErrorHandler, DefaultResponseHandler, ErrorHandler, ResponseHandler};
pub use server::{Server, ServerError, ServerOptions};
