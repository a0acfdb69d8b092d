//! Capability markers and parameter classification.
//!
//! # Responsibilities
//! - Represent the capabilities a parameter type declares
//! - Map a parameter to its extraction strategy once, at registration
//!
//! # Design Decisions
//! - Priority order is StructuredData, PathParam, Header; first match wins
//! - Context is special-cased and only legal as the first parameter
//! - Only the request context itself may declare the context capability
//! - A parameter without any recognised capability is rejected

use std::fmt;

use crate::binding::extract::Extractor;
use crate::binding::param::ParamSpec;
use crate::handler::signature::SignatureError;

/// Capability a parameter type can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Cancellation-aware request context.
    Context,
    /// Body or query data (DTO).
    StructuredData,
    /// Named URI path segments.
    PathParam,
    /// Request header fields.
    Header,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Capability::Context => 1,
            Capability::StructuredData => 1 << 1,
            Capability::PathParam => 1 << 2,
            Capability::Header => 1 << 3,
        }
    }
}

/// Set of declared capabilities.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const EMPTY: Capabilities = Capabilities(0);

    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Capabilities(self.0 | capability.bit())
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        [
            Capability::Context,
            Capability::StructuredData,
            Capability::PathParam,
            Capability::Header,
        ]
        .into_iter()
        .filter(move |c| self.contains(*c))
    }
}

impl From<Capability> for Capabilities {
    fn from(capability: Capability) -> Self {
        Capabilities::EMPTY.with(capability)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Result of classifying one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    /// Bound from the request's own context; not an extractor.
    Context,
    /// Built by the given extractor.
    Extract(Extractor),
}

const PRIORITY: [(Capability, Extractor); 3] = [
    (Capability::StructuredData, Extractor::StructuredData),
    (Capability::PathParam, Extractor::PathParam),
    (Capability::Header, Extractor::Header),
];

/// Classify the parameter at `position`.
pub fn classify(position: usize, spec: &ParamSpec) -> Result<Classified, SignatureError> {
    if spec.capabilities.contains(Capability::Context) {
        if !spec.context {
            return Err(SignatureError::NotAContext {
                position,
                type_name: spec.type_name,
            });
        }
        if position != 0 {
            return Err(SignatureError::ContextNotFirst {
                position,
                type_name: spec.type_name,
            });
        }
        return Ok(Classified::Context);
    }

    let mut matching = PRIORITY
        .iter()
        .filter(|(capability, _)| spec.capabilities.contains(*capability));

    match matching.next() {
        Some((_, extractor)) => {
            if matching.next().is_some() {
                tracing::debug!(
                    param = spec.type_name,
                    capabilities = ?spec.capabilities,
                    chosen = ?extractor,
                    "Parameter declares several capabilities, using highest priority"
                );
            }
            Ok(Classified::Extract(*extractor))
        }
        None => Err(SignatureError::UnknownParamType {
            position,
            type_name: spec.type_name,
        }),
    }
}
