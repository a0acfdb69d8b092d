//! Response capability.
//!
//! A [`Reply`] declares its content type and offers either a serialized form
//! (JSON, XML) or a raw body stream with an optional declared length. The
//! response handler picks which one to use from the content type.

use axum::body::Body;
use serde::Serialize;
use thiserror::Error;

pub const MIME_JSON: &str = "application/json";
pub const MIME_XML: &str = "application/xml";
pub const MIME_XML2: &str = "text/xml";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// Serialization format requested from a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Format implied by a content type, ignoring parameters.
    pub fn for_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(MIME_JSON) {
            Some(Format::Json)
        } else if essence.eq_ignore_ascii_case(MIME_XML) || essence.eq_ignore_ascii_case(MIME_XML2) {
            Some(Format::Xml)
        } else {
            None
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("reply with content type {content_type} cannot be encoded as {format:?}")]
    Unsupported {
        format: Format,
        content_type: String,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML encoding failed: {0}")]
    Xml(String),
}

/// A value a handler can return as its response.
pub trait Reply: Send + 'static {
    fn content_type(&self) -> &str;

    /// Declared body length, if known.
    fn content_length(&self) -> Option<u64> {
        None
    }

    /// Serialize the reply in `format`.
    fn encode(&self, format: Format) -> Result<Vec<u8>, EncodeError> {
        Err(EncodeError::Unsupported {
            format,
            content_type: self.content_type().to_owned(),
        })
    }

    /// Raw body stream.
    fn into_body(self: Box<Self>) -> Body {
        Body::empty()
    }
}

impl Reply for Box<dyn Reply> {
    fn content_type(&self) -> &str {
        (**self).content_type()
    }

    fn content_length(&self) -> Option<u64> {
        (**self).content_length()
    }

    fn encode(&self, format: Format) -> Result<Vec<u8>, EncodeError> {
        (**self).encode(format)
    }

    fn into_body(self: Box<Self>) -> Body {
        (*self).into_body()
    }
}

/// Reply serialized as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonReply<T>(pub T);

impl<T: Serialize + Send + 'static> Reply for JsonReply<T> {
    fn content_type(&self) -> &str {
        MIME_JSON
    }

    fn encode(&self, format: Format) -> Result<Vec<u8>, EncodeError> {
        encode_value(&self.0, format)
    }
}

/// Reply serialized as XML.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlReply<T>(pub T);

impl<T: Serialize + Send + 'static> Reply for XmlReply<T> {
    fn content_type(&self) -> &str {
        MIME_XML
    }

    fn encode(&self, format: Format) -> Result<Vec<u8>, EncodeError> {
        encode_value(&self.0, format)
    }
}

fn encode_value<T: Serialize>(value: &T, format: Format) -> Result<Vec<u8>, EncodeError> {
    match format {
        Format::Json => Ok(serde_json::to_vec(value)?),
        Format::Xml => quick_xml::se::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| EncodeError::Xml(e.to_string())),
    }
}

/// Reply streamed as-is with a declared content type.
#[derive(Debug)]
pub struct RawReply {
    content_type: String,
    content_length: Option<u64>,
    body: Body,
}

impl RawReply {
    pub fn new(content_type: impl Into<String>, body: impl Into<Body>) -> Self {
        Self {
            content_type: content_type.into(),
            content_length: None,
            body: body.into(),
        }
    }

    /// Buffered bytes; the length is known up front.
    pub fn bytes(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            content_type: content_type.into(),
            content_length: Some(bytes.len() as u64),
            body: Body::from(bytes),
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u64) -> Self {
        self.content_length = Some(length);
        self
    }
}

impl Reply for RawReply {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn into_body(self: Box<Self>) -> Body {
        self.body
    }
}
