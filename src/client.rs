//! HTTP client that resolves and executes [`Request`] descriptions.
//!
//! The [`Client`] type is the entry point for sending requests. Use
//! [`ClientBuilder`] to configure the base URL, default headers, and
//! timeout.

use crate::{
    request::{HeaderOp, SetMode},
    Error, Request, Response, Result,
};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// An HTTP client that sends [`Request`] descriptions against a base URL.
///
/// The client is cheap to clone and safe to share across tasks; concurrent
/// calls share only the underlying connection pool. Each
/// [`send`](Client::send) is exactly one HTTP call; retries and streaming
/// are left to the caller.
///
/// # Examples
///
/// ```no_run
/// use apireq::{Client, Request, SetMode};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), apireq::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
///
/// let response = client
///     .send(
///         Request::new()
///             .with_path("/users")
///             .with_query_param("page", "1", SetMode::Overwrite),
///     )
///     .await;
///
/// let users: Vec<User> = response.scan()?;
/// println!("fetched {} users", users.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl Client {
    /// Creates a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Sends a request and returns the uniform [`Response`] wrapper.
    ///
    /// Every failure mode (construction errors collected while the request
    /// was built, URL join failure, transport failure, body buffering
    /// failure) is terminal for the call and reported on the returned
    /// `Response`; this method itself never fails. If the request carries
    /// construction errors, they are aggregated and no network call is
    /// made.
    ///
    /// The response body is fully drained into memory before this method
    /// returns, which releases the connection but also means large bodies
    /// are buffered whole.
    pub async fn send(&self, request: Request) -> Response {
        if let Some(err) = request.build_error() {
            tracing::error!(
                error = %err,
                base_url = %self.inner.base_url,
                "rejecting request with invalid parts"
            );
            return Response::from_error(err);
        }

        let mut url = match join_path(&self.inner.base_url, &request.path) {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    base_url = %self.inner.base_url,
                    path = %request.path,
                    "failed to join base URL with path"
                );
                return Response::from_error(err);
            }
        };

        // The query accumulated on the request replaces anything carried by
        // the base URL.
        url.set_query(None);
        if !request.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, values) in &request.query_params {
                for value in values {
                    pairs.append_pair(key, value);
                }
            }
        }

        let mut headers = merge_headers(&self.inner.default_headers, &request.header_ops);
        if request.body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        tracing::debug!(
            method = %request.method,
            url = %url,
            "executing HTTP request"
        );

        let mut builder = self
            .inner
            .http_client
            .request(request.method.clone(), url.clone())
            .headers(headers);
        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    url = %url,
                    method = %request.method,
                    "request failed"
                );
                return Response::from_error(Error::Network(Arc::new(err)));
            }
        };

        let status = response.status();
        match response.bytes().await {
            Ok(body) => {
                tracing::debug!(
                    status = status.as_u16(),
                    body_len = body.len(),
                    "received HTTP response"
                );
                Response::delivered(status, body)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    status = status.as_u16(),
                    "failed to buffer response body"
                );
                Response::from_error(Error::BodyRead(Arc::new(err)))
            }
        }
    }
}

/// Appends `path` to `base` segment by segment, leaving the base's own path
/// prefix intact. Empty segments (doubled or leading slashes) are dropped.
fn join_path(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    if path.is_empty() {
        return Ok(url);
    }
    {
        let mut segments = url.path_segments_mut().map_err(|_| Error::UrlJoin {
            base: base.to_string(),
            path: path.to_string(),
        })?;
        segments.pop_if_empty();
        segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
    }
    Ok(url)
}

/// Applies header operations over the client's defaults in chain order:
/// `Overwrite` replaces every value under the name, `Append` adds alongside.
fn merge_headers(defaults: &HeaderMap, ops: &[HeaderOp]) -> HeaderMap {
    let mut headers = defaults.clone();
    for op in ops {
        match op.mode {
            SetMode::Overwrite => {
                headers.insert(op.name.clone(), op.value.clone());
            }
            SetMode::Append => {
                headers.append(op.name.clone(), op.value.clone());
            }
        }
    }
    headers
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use apireq::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), apireq::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com")?
///     .default_header("User-Agent", "my-app/1.0")?
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # let _ = client;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Sets the base URL all request paths are joined onto.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header included in every request.
    ///
    /// A request can replace it with an `Overwrite` header operation or add
    /// values alongside it with `Append`.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        let header_name = HeaderName::try_from(name).map_err(|err| Error::InvalidHeader {
            name: name.to_string(),
            reason: format!("invalid name: {err}"),
        })?;
        let header_value =
            HeaderValue::try_from(value.as_ref()).map_err(|err| Error::InvalidHeader {
                name: name.to_string(),
                reason: format!("invalid value: {err}"),
            })?;
        self.default_headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Sets the per-request timeout. A request that exceeds it surfaces a
    /// network error on its [`Response`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided or the underlying HTTP
    /// client cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Configuration("base URL is required".to_string()))?;

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|err| Error::Configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers: self.default_headers,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
