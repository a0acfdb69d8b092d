//! Argument binding subsystem.
//!
//! # Data Flow
//! ```text
//! Registration time:
//!     Param::capabilities() for each handler argument
//!     → capability.rs (classify into Context or an Extractor)
//!     → stored in the argument plan
//!
//! Request time:
//!     Request<Body>
//!     → extract.rs (Binder reads path / body / query / headers)
//!     → source.rs (raw Source handed to the argument type)
//!     → param.rs (Param::decode builds the value via serde)
//!     → BindError on any failure
//! ```
//!
//! # Design Decisions
//! - Capabilities are declared nominally, never guessed from structure
//! - Extractors are chosen once; the hot path only reads and decodes
//! - The request body is single-pass; a second read is a bind error

pub mod capability;
pub mod context;
pub mod error;
pub mod extract;
pub mod param;
pub mod source;

pub use capability::{classify, Capabilities, Capability, Classified};
pub use context::{CancelGuard, RequestContext};
pub use error::{is_bind_error, BindError, BindLocation};
pub use extract::{Binder, Extractor};
pub use param::{Param, ParamSpec};
pub use source::Source;
