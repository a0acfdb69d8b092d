//! Error and response handlers.
//!
//! # Responsibilities
//! - Turn a failed request into a response (bind errors vs. everything else)
//! - Turn a handler's (status, reply) into a response by content type
//!
//! # Design Decisions
//! - One pair per server, fixed at construction and shared read-only
//! - Plain closures implement both traits, so overriding is one line
//! - Bind errors are recognised by type through the error chain

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::binding::error::{is_bind_error, BindError};
use crate::handler::reply::{Format, Reply};

/// Renders errors raised while handling a request.
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle(&self, error: anyhow::Error) -> Response;
}

impl<F> ErrorHandler for F
where
    F: Fn(anyhow::Error) -> Response + Send + Sync + 'static,
{
    fn handle(&self, error: anyhow::Error) -> Response {
        self(error)
    }
}

/// Renders a successful handler result.
pub trait ResponseHandler: Send + Sync + 'static {
    fn respond(&self, status: StatusCode, reply: Option<Box<dyn Reply>>) -> Response;
}

impl<F> ResponseHandler for F
where
    F: Fn(StatusCode, Option<Box<dyn Reply>>) -> Response + Send + Sync + 'static,
{
    fn respond(&self, status: StatusCode, reply: Option<Box<dyn Reply>>) -> Response {
        self(status, reply)
    }
}

#[derive(Debug, Serialize)]
struct BindErrorBody {
    message: &'static str,
    detail: String,
}

/// 400 with `{"message":"bindError","detail":...}` for bind errors, 500 with
/// the error text for anything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, error: anyhow::Error) -> Response {
        if is_bind_error(&error) {
            let detail = error
                .chain()
                .find_map(|cause| cause.downcast_ref::<BindError>())
                .map(ToString::to_string)
                .unwrap_or_else(|| error.to_string());
            let body = BindErrorBody {
                message: "bindError",
                detail,
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }

        tracing::error!(error = %error, "Handler failed");
        (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
    }
}

/// Serializes JSON and XML replies, streams everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResponseHandler;

impl ResponseHandler for DefaultResponseHandler {
    fn respond(&self, status: StatusCode, reply: Option<Box<dyn Reply>>) -> Response {
        let Some(reply) = reply else {
            return StatusCode::NO_CONTENT.into_response();
        };

        let content_type = match HeaderValue::from_str(reply.content_type()) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(content_type = reply.content_type(), error = %e, "Invalid reply content type");
                return (StatusCode::INTERNAL_SERVER_ERROR, "invalid reply content type").into_response();
            }
        };

        let (body, length) = match Format::for_content_type(reply.content_type()) {
            Some(format) => match reply.encode(format) {
                Ok(bytes) => {
                    let length = bytes.len() as u64;
                    (Body::from(bytes), Some(length))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode reply");
                    return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
                }
            },
            None => {
                let length = reply.content_length();
                (reply.into_body(), length)
            }
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        if let Some(length) = length {
            response.headers_mut().insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::reply::{JsonReply, RawReply, XmlReply};
    use anyhow::Context;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[derive(Serialize)]
    struct Item {
        id: u32,
    }

    #[tokio::test]
    async fn test_bind_error_is_bad_request() {
        let error = Err::<(), _>(BindError::dto("missing field `foo`"))
            .context("loading")
            .unwrap_err();
        let response = DefaultErrorHandler.handle(error);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["message"], "bindError");
        assert_eq!(body["detail"], "bind error for DTO: missing field `foo`");
    }

    #[tokio::test]
    async fn test_generic_error_is_server_error() {
        let response = DefaultErrorHandler.handle(anyhow::anyhow!("disk full"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "disk full");
    }

    #[tokio::test]
    async fn test_none_reply_is_no_content() {
        let response = DefaultResponseHandler.respond(StatusCode::OK, None);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_json_and_xml_replies() {
        let response = DefaultResponseHandler.respond(StatusCode::OK, Some(Box::new(JsonReply(Item { id: 7 }))));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_string(response).await, r#"{"id":7}"#);

        let response = DefaultResponseHandler.respond(StatusCode::ACCEPTED, Some(Box::new(XmlReply(Item { id: 7 }))));
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
        assert_eq!(body_string(response).await, "<Item><id>7</id></Item>");
    }

    #[tokio::test]
    async fn test_raw_reply_is_streamed() {
        let reply = RawReply::bytes("text/plain", "hello");
        let response = DefaultResponseHandler.respond(StatusCode::OK, Some(Box::new(reply)));
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
        assert_eq!(body_string(response).await, "hello");
    }
}
