//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, server, lifecycle produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (request counters, latency histogram, bind errors)
//!
//! Consumers:
//!     → stdout via tracing-subscriber fmt layer
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID from the request context is attached to dispatch events
//! - Metrics are recorded through the `metrics` facade; without an installed
//!   recorder they are no-ops

pub mod logging;
pub mod metrics;
