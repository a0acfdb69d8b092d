//! Raw request data handed from an extractor to an argument type.

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::binding::context::RequestContext;
use crate::binding::error::BindError;

/// Request data read by one extractor, not yet decoded.
#[derive(Debug)]
pub enum Source {
    /// The request's cancellation scope.
    Context(RequestContext),
    /// Named path segments matched by the route `template`.
    Path {
        template: String,
        params: Vec<(String, String)>,
    },
    /// A JSON request body.
    Json(Bytes),
    /// A urlencoded query string or form body.
    Form(String),
    /// Header fields keyed by lowercase name.
    Headers(Vec<(String, String)>),
}

impl Source {
    /// Short name of the source, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Context(_) => "context",
            Source::Path { .. } => "path",
            Source::Json(_) => "json body",
            Source::Form(_) => "form data",
            Source::Headers(_) => "headers",
        }
    }

    /// Deserialize a fresh `T` from this source.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, BindError> {
        match self {
            Source::Path { template, params } => {
                decode_pairs(&params).map_err(|e| BindError::path(template, e))
            }
            Source::Json(bytes) => serde_json::from_slice(&bytes).map_err(BindError::dto),
            Source::Form(query) => serde_urlencoded::from_str(&query).map_err(BindError::dto),
            Source::Headers(fields) => decode_pairs(&fields).map_err(BindError::header),
            Source::Context(_) => Err(BindError::dto("request context is not deserializable")),
        }
    }
}

/// Name/value pairs go through the urlencoded deserializer so numeric and
/// boolean fields parse the same way they do from a query string.
fn decode_pairs<T: DeserializeOwned>(pairs: &[(String, String)]) -> Result<T, serde_urlencoded::de::Error> {
    let encoded = serde_urlencoded::to_string(pairs)
        .map_err(|e| <serde_urlencoded::de::Error as serde::de::Error>::custom(e.to_string()))?;
    serde_urlencoded::from_str(&encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::error::BindLocation;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pair {
        foo: String,
        bar: Option<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct UserPath {
        id: u64,
    }

    #[test]
    fn test_query_and_json_agree() {
        let from_query: Pair = Source::Form("foo=bar&bar=foo".into()).deserialize().unwrap();
        let from_json: Pair = Source::Json(Bytes::from_static(br#"{"foo":"bar","bar":"foo"}"#))
            .deserialize()
            .unwrap();

        assert_eq!(from_query, from_json);
        assert_eq!(from_query.foo, "bar");
        assert_eq!(from_query.bar.as_deref(), Some("foo"));
    }

    #[test]
    fn test_missing_required_field() {
        let err = Source::Form("bar=foo".into()).deserialize::<Pair>().unwrap_err();
        assert_eq!(err.location(), &BindLocation::Dto);
        assert!(err.cause().contains("foo"));
    }

    #[test]
    fn test_path_numbers_and_template() {
        let source = Source::Path {
            template: "/users/{id}".into(),
            params: vec![("id".into(), "42".into())],
        };
        assert_eq!(source.deserialize::<UserPath>().unwrap(), UserPath { id: 42 });

        let source = Source::Path {
            template: "/users/{id}".into(),
            params: vec![("id".into(), "forty-two".into())],
        };
        let err = source.deserialize::<UserPath>().unwrap_err();
        assert_eq!(err.location(), &BindLocation::Path("/users/{id}".into()));
    }

    #[test]
    fn test_header_fields() {
        #[derive(Deserialize)]
        struct Auth {
            #[serde(rename = "x-api-key")]
            api_key: String,
        }

        let auth: Auth = Source::Headers(vec![("x-api-key".into(), "secret value".into())])
            .deserialize()
            .unwrap();
        assert_eq!(auth.api_key, "secret value");
    }
}
