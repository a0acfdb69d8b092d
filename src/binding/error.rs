//! Bind error type.
//!
//! The error's type is its kind marker: anything that fails while populating
//! a handler argument is a `BindError`, and error handlers recognise it by
//! downcasting rather than by message.

use std::fmt;

use thiserror::Error;

/// Where in the request a bind failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindLocation {
    /// Path segments of the route with this template.
    Path(String),
    /// Body or query data.
    Dto,
    /// Request header fields.
    Header,
    /// The argument plan itself (argument count mismatch).
    Plan,
}

impl fmt::Display for BindLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindLocation::Path(template) => write!(f, "Path: {}", template),
            BindLocation::Dto => write!(f, "DTO"),
            BindLocation::Header => write!(f, "Header"),
            BindLocation::Plan => write!(f, "argument plan"),
        }
    }
}

/// Failure to build a handler argument from the request.
#[derive(Debug, Clone, Error)]
#[error("bind error for {location}: {cause}")]
pub struct BindError {
    location: BindLocation,
    cause: String,
}

impl BindError {
    pub fn new(location: BindLocation, cause: impl Into<String>) -> Self {
        Self {
            location,
            cause: cause.into(),
        }
    }

    pub fn path(template: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::new(BindLocation::Path(template.into()), cause.to_string())
    }

    pub fn dto(cause: impl fmt::Display) -> Self {
        Self::new(BindLocation::Dto, cause.to_string())
    }

    pub fn header(cause: impl fmt::Display) -> Self {
        Self::new(BindLocation::Header, cause.to_string())
    }

    pub fn location(&self) -> &BindLocation {
        &self.location
    }

    /// Underlying binder message without the location prefix.
    pub fn cause(&self) -> &str {
        &self.cause
    }
}

/// Returns true if `error` or anything in its source chain is a [`BindError`].
pub fn is_bind_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<BindError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_display_includes_location() {
        let err = BindError::path("/users/{id}", "invalid digit");
        assert_eq!(err.to_string(), "bind error for Path: /users/{id}: invalid digit");

        let err = BindError::dto("missing field `foo`");
        assert_eq!(err.to_string(), "bind error for DTO: missing field `foo`");
        assert_eq!(err.cause(), "missing field `foo`");
    }

    #[test]
    fn test_classification_through_chain() {
        let direct = anyhow::Error::new(BindError::header("bad value"));
        assert!(is_bind_error(&direct));

        let wrapped = Err::<(), _>(BindError::dto("oops"))
            .context("while loading user")
            .unwrap_err();
        assert!(is_bind_error(&wrapped));

        let generic = anyhow::anyhow!("database unavailable");
        assert!(!is_bind_error(&generic));
    }
}
