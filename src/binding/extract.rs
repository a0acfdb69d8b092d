//! Argument extractors.
//!
//! # Responsibilities
//! - Read the request source selected for each argument
//! - Honour the plan order; one source per argument
//! - Turn binder failures into [`BindError`]s with location detail
//!
//! # Design Decisions
//! - JSON bodies by content type, urlencoded forms on body-carrying methods,
//!   the query string otherwise; form values replace query values of the
//!   same name
//! - The body is read at most once and under a size limit
//! - Repeated header fields are joined with `", "` as HTTP allows
//! - A header value that is not visible ASCII is a bind error, never dropped

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, MatchedPath, RawPathParams},
    http::{header, request::Parts, Method, Request},
};

use crate::binding::context::RequestContext;
use crate::binding::error::{BindError, BindLocation};
use crate::binding::source::Source;
use crate::handler::signature::ArgumentPlan;

const MIME_JSON: &str = "application/json";
const MIME_FORM: &str = "application/x-www-form-urlencoded";

/// Extraction strategy chosen for one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// Named URI path segments.
    PathParam,
    /// Body or query data, by content type.
    StructuredData,
    /// Request header fields.
    Header,
}

/// Request-scoped binding state for one dispatch.
pub struct Binder {
    parts: Parts,
    body: Option<Body>,
    context: RequestContext,
    plan: Arc<ArgumentPlan>,
    body_limit: usize,
    cursor: usize,
}

impl Binder {
    pub fn new(
        request: Request<Body>,
        context: RequestContext,
        plan: Arc<ArgumentPlan>,
        body_limit: usize,
    ) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            parts,
            body: Some(body),
            context,
            plan,
            body_limit,
            cursor: 0,
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Source for the next handler argument, in declaration order.
    pub async fn next_source(&mut self) -> Result<Source, BindError> {
        let position = self.cursor;
        self.cursor += 1;

        if self.plan.with_context() && position == 0 {
            return Ok(Source::Context(self.context.clone()));
        }
        let index = position - usize::from(self.plan.with_context());

        let extractor = match self.plan.entries().get(index) {
            Some(entry) => entry.extractor,
            None => {
                return Err(BindError::new(
                    BindLocation::Plan,
                    format!("no plan entry for argument {}", position),
                ))
            }
        };
        self.extract(extractor).await
    }

    /// Run one extractor against the request.
    pub async fn extract(&mut self, extractor: Extractor) -> Result<Source, BindError> {
        match extractor {
            Extractor::PathParam => self.path_params().await,
            Extractor::StructuredData => self.structured_data().await,
            Extractor::Header => self.header_fields(),
        }
    }

    fn template(&self) -> String {
        self.parts
            .extensions
            .get::<MatchedPath>()
            .map(|m| m.as_str().to_owned())
            .unwrap_or_else(|| self.parts.uri.path().to_owned())
    }

    async fn path_params(&mut self) -> Result<Source, BindError> {
        let template = self.template();
        let raw = RawPathParams::from_request_parts(&mut self.parts, &())
            .await
            .map_err(|rejection| BindError::path(template.clone(), rejection.body_text()))?;

        let params = raw
            .iter()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect();
        Ok(Source::Path { template, params })
    }

    async fn structured_data(&mut self) -> Result<Source, BindError> {
        let content_type = self
            .parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
            .unwrap_or_default();

        if content_type == MIME_JSON {
            let bytes = self.read_body().await?;
            return Ok(Source::Json(bytes));
        }

        let query = self.parts.uri.query().unwrap_or_default().to_owned();
        let has_body = !matches!(self.parts.method, Method::GET | Method::HEAD);
        if content_type == MIME_FORM && has_body {
            let bytes = self.read_body().await?;
            let form = String::from_utf8(bytes.to_vec()).map_err(BindError::dto)?;
            return merge_form(&query, &form).map(Source::Form);
        }

        Ok(Source::Form(query))
    }

    async fn read_body(&mut self) -> Result<axum::body::Bytes, BindError> {
        let body = self
            .body
            .take()
            .ok_or_else(|| BindError::dto("request body already consumed"))?;
        axum::body::to_bytes(body, self.body_limit)
            .await
            .map_err(BindError::dto)
    }

    fn header_fields(&self) -> Result<Source, BindError> {
        let mut fields: Vec<(String, String)> = Vec::new();
        for name in self.parts.headers.keys() {
            let values = self
                .parts
                .headers
                .get_all(name)
                .iter()
                .map(|v| v.to_str())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| BindError::header(format!("field `{}`: {}", name, e)))?;
            fields.push((name.as_str().to_owned(), values.join(", ")));
        }
        Ok(Source::Headers(fields))
    }
}

/// Query and form body pairs as one urlencoded string; body values replace
/// query values of the same name.
fn merge_form(query: &str, body: &str) -> Result<String, BindError> {
    let body_pairs: Vec<(String, String)> = serde_urlencoded::from_str(body).map_err(BindError::dto)?;
    if query.is_empty() {
        return serde_urlencoded::to_string(&body_pairs).map_err(BindError::dto);
    }
    let query_pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).map_err(BindError::dto)?;

    let mut pairs: Vec<(String, String)> = query_pairs
        .into_iter()
        .filter(|(name, _)| !body_pairs.iter().any(|(body_name, _)| body_name == name))
        .collect();
    pairs.extend(body_pairs);
    serde_urlencoded::to_string(&pairs).map_err(BindError::dto)
}
