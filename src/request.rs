//! Request descriptions built with a `with_*` chain.
//!
//! A [`Request`] collects everything needed to make one HTTP call: method,
//! path, body, query parameters, and header operations. Building never fails
//! loudly: a body that refuses to serialize or a malformed header name is
//! recorded inside the request and surfaced when it is sent, aggregated with
//! every other construction error.

use crate::Error;
use http::{HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Whether a header or query operation replaces existing values or adds
/// alongside them.
///
/// An `Overwrite` operation removes every value already present under the
/// key (including the client's default headers) before adding its own.
/// An `Append` operation preserves what is there. Operations apply in the
/// order they were chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetMode {
    /// Replace all existing values under the key.
    #[default]
    Overwrite,
    /// Add a value while keeping existing ones.
    Append,
}

/// A single header operation, applied over the client's default headers in
/// chain order when the request is sent.
#[derive(Debug, Clone)]
pub(crate) struct HeaderOp {
    pub(crate) name: HeaderName,
    pub(crate) value: HeaderValue,
    pub(crate) mode: SetMode,
}

/// A description of one HTTP request, consumed by
/// [`Client::send`](crate::Client::send).
///
/// Defaults to a GET with an empty path, no body, no query parameters, and
/// no headers beyond the client's defaults.
///
/// # Examples
///
/// ```
/// use apireq::{Request, SetMode};
/// use http::Method;
///
/// let request = Request::new()
///     .with_method(Method::POST)
///     .with_path("/search")
///     .with_query_param("page", "1", SetMode::Overwrite)
///     .with_query_param("tag", "rust", SetMode::Append)
///     .with_query_param("tag", "http", SetMode::Append)
///     .with_header("X-Request-Id", "abc-123", SetMode::Overwrite);
/// # let _ = request;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) query_params: BTreeMap<String, Vec<String>>,
    pub(crate) header_ops: Vec<HeaderOp>,
    pub(crate) errors: Vec<Error>,
}

impl Request {
    /// Creates an empty GET request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path appended to the client's base URL.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the HTTP method. Defaults to GET.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Serializes `value` to JSON and uses it as the request body.
    ///
    /// Serialization happens here, not at send time. If it fails, the error
    /// is recorded in the request and reported by
    /// [`Client::send`](crate::Client::send); any previously set body is
    /// left unchanged.
    pub fn with_body<T>(mut self, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Some(bytes),
            Err(err) => {
                tracing::error!(error = %err, "failed to encode request body as JSON");
                self.errors.push(Error::BodyEncode(Arc::new(err)));
            }
        }
        self
    }

    /// Adds a query parameter.
    ///
    /// [`SetMode::Overwrite`] replaces all prior values under `key`;
    /// [`SetMode::Append`] adds an additional value. Keys are encoded in
    /// sorted order, values in the order they were added.
    pub fn with_query_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        mode: SetMode,
    ) -> Self {
        let values = self.query_params.entry(key.into()).or_default();
        if mode == SetMode::Overwrite {
            values.clear();
        }
        values.push(value.into());
        self
    }

    /// Adds a header operation.
    ///
    /// Operations apply over the client's default headers in chain order:
    /// [`SetMode::Overwrite`] replaces every value under `name` (defaults
    /// included), [`SetMode::Append`] adds alongside them. A malformed name
    /// or value is recorded as a construction error rather than panicking.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
        mode: SetMode,
    ) -> Self {
        let name = name.as_ref();
        let parsed = HeaderName::try_from(name)
            .map_err(|err| Error::InvalidHeader {
                name: name.to_string(),
                reason: format!("invalid name: {err}"),
            })
            .and_then(|header_name| {
                HeaderValue::try_from(value.as_ref())
                    .map(|header_value| (header_name, header_value))
                    .map_err(|err| Error::InvalidHeader {
                        name: name.to_string(),
                        reason: format!("invalid value: {err}"),
                    })
            });
        match parsed {
            Ok((name, value)) => self.header_ops.push(HeaderOp { name, value, mode }),
            Err(err) => {
                tracing::error!(error = %err, "failed to build request header");
                self.errors.push(err);
            }
        }
        self
    }

    /// Returns the construction errors collected so far, if any, as one
    /// aggregated [`Error::InvalidRequest`].
    pub(crate) fn build_error(&self) -> Option<Error> {
        if self.errors.is_empty() {
            None
        } else {
            Some(Error::InvalidRequest(self.errors.clone()))
        }
    }
}
