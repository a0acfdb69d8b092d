//! Registration-time handler signature validation.
//!
//! # Responsibilities
//! - Classify every parameter into an argument plan
//! - Check the output shape: nothing, or (status, response, error)
//! - Report exactly which position broke which rule
//!
//! # Design Decisions
//! - Runs once per handler; the dispatcher never re-checks types
//! - Fixed arity is guaranteed by the `Handler` impls, so there is no
//!   variadic check at runtime

use thiserror::Error;

use crate::binding::capability::{classify, Classified};
use crate::binding::extract::Extractor;
use crate::binding::param::ParamSpec;

/// Structural problem with a handler signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("context must be first parameter, found `{type_name}` at position {position}")]
    ContextNotFirst {
        position: usize,
        type_name: &'static str,
    },

    #[error("`{type_name}` at position {position} declares the context capability but is not the request context")]
    NotAContext {
        position: usize,
        type_name: &'static str,
    },

    #[error("unknown param type `{type_name}` at position {position}")]
    UnknownParamType {
        position: usize,
        type_name: &'static str,
    },

    #[error("handler must have 3 or 0 outputs, found {0}")]
    OutputArity(usize),

    #[error("first output must be an integer status code, found `{0}`")]
    StatusNotInteger(&'static str),

    #[error("second output must implement Reply, found `{0}`")]
    NotResponse(&'static str),

    #[error("third output must be an error, found `{0}`")]
    NotError(&'static str),
}

/// What an output position holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Integer,
    Response,
    Error,
    Other,
}

/// Static facts about one output position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    pub type_name: &'static str,
    pub kind: SlotKind,
}

/// Everything the validator needs to know about a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<ParamSpec>,
    pub outputs: Vec<SlotSpec>,
}

/// Output shape accepted by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// No return value; dispatch answers 204.
    Empty,
    /// (status, response, error).
    StatusReplyError,
}

/// One non-context argument and how to build it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanEntry {
    pub type_name: &'static str,
    pub indirect: bool,
    pub extractor: Extractor,
}

/// Extraction plan resolved once per handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentPlan {
    with_context: bool,
    entries: Vec<PlanEntry>,
    output: OutputShape,
}

impl ArgumentPlan {
    pub fn new(with_context: bool, entries: Vec<PlanEntry>, output: OutputShape) -> Self {
        Self {
            with_context,
            entries,
            output,
        }
    }

    /// Whether argument 0 is the request context.
    pub fn with_context(&self) -> bool {
        self.with_context
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn output(&self) -> OutputShape {
        self.output
    }

    /// Number of declared parameters, context included.
    pub fn arity(&self) -> usize {
        self.entries.len() + usize::from(self.with_context)
    }
}

/// Validate a signature and resolve its argument plan.
pub fn validate(signature: &Signature) -> Result<ArgumentPlan, SignatureError> {
    let mut with_context = false;
    let mut entries = Vec::with_capacity(signature.params.len());

    for (position, spec) in signature.params.iter().enumerate() {
        match classify(position, spec)? {
            Classified::Context => with_context = true,
            Classified::Extract(extractor) => entries.push(PlanEntry {
                type_name: spec.type_name,
                indirect: spec.indirect,
                extractor,
            }),
        }
    }

    let output = check_output(&signature.outputs)?;
    Ok(ArgumentPlan::new(with_context, entries, output))
}

fn check_output(outputs: &[SlotSpec]) -> Result<OutputShape, SignatureError> {
    match outputs {
        [] => Ok(OutputShape::Empty),
        [status, response, error] => {
            if status.kind != SlotKind::Integer {
                return Err(SignatureError::StatusNotInteger(status.type_name));
            }
            if response.kind != SlotKind::Response {
                return Err(SignatureError::NotResponse(response.type_name));
            }
            if error.kind != SlotKind::Error {
                return Err(SignatureError::NotError(error.type_name));
            }
            Ok(OutputShape::StatusReplyError)
        }
        other => Err(SignatureError::OutputArity(other.len())),
    }
}
