//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs / caller):
//!     Load config → Register controllers → Server::new → Server::run
//!
//! Shutdown (shutdown.rs):
//!     Trigger → axum stops accepting → in-flight requests drain → run returns
//!
//! Signals (signals.rs):
//!     Ctrl+C → Shutdown::trigger
//! ```
//!
//! # Design Decisions
//! - Registration errors surface before anything is bound
//! - Listeners start last (traffic only when every route compiled)

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
