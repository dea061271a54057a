//! Error types for request building and execution.
//!
//! Every failure mode of a request, from body encoding and header
//! validation through transport and decoding, is represented here as a
//! value. Nothing panics; errors travel on the [`Response`](crate::Response)
//! or are returned from [`Response::scan`](crate::Response::scan).

use http::StatusCode;
use std::sync::Arc;

/// The error type for request building and execution.
///
/// `Error` is `Clone` (non-clonable sources are held behind [`Arc`]) so a
/// failed [`Response`](crate::Response) can hand the same stored error to
/// both [`err`](crate::Response::err) and [`scan`](crate::Response::scan).
///
/// # Examples
///
/// ```no_run
/// use apireq::{Client, Error, Request};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// let response = client.send(Request::new().with_path("/status")).await;
///
/// match response.err() {
///     None => println!("status: {:?}", response.status()),
///     Some(Error::Network(_)) => eprintln!("transport failure"),
///     Some(Error::InvalidRequest(causes)) => {
///         for cause in causes {
///             eprintln!("bad request part: {cause}");
///         }
///     }
///     Some(other) => eprintln!("request failed: {other}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// A network-level failure (connection refused, DNS failure, timeout,
    /// cancellation). Wraps the underlying `reqwest::Error`.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The request body could not be serialized to JSON.
    ///
    /// Captured when [`Request::with_body`](crate::Request::with_body) is
    /// called and surfaced when the request is sent.
    #[error("failed to encode request body as JSON: {0}")]
    BodyEncode(Arc<serde_json::Error>),

    /// The response body could not be drained into the buffer.
    #[error("failed to read response body: {0}")]
    BodyRead(Arc<reqwest::Error>),

    /// The buffered response body could not be decoded into the requested
    /// type. Only returned from [`Response::scan`](crate::Response::scan).
    #[error("failed to decode response body (status {status}): {source}")]
    Decode {
        /// The HTTP status code of the response whose body failed to decode.
        status: StatusCode,
        /// The underlying serde error.
        source: Arc<serde_json::Error>,
    },

    /// A header name or value passed to
    /// [`Request::with_header`](crate::Request::with_header) or
    /// [`ClientBuilder::default_header`](crate::ClientBuilder::default_header)
    /// was malformed.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader {
        /// The offending header name as given by the caller.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The base URL string could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request path could not be joined onto the base URL.
    #[error("cannot join path {path:?} onto base URL {base}")]
    UrlJoin {
        /// The base URL the join was attempted against.
        base: String,
        /// The path that could not be appended.
        path: String,
    },

    /// One or more request parts failed during building.
    ///
    /// All construction errors are collected while the
    /// [`Request`](crate::Request) is assembled and reported together when
    /// it is sent; building never short-circuits on the first bad part.
    #[error("invalid request: {}", join_causes(.0))]
    InvalidRequest(Vec<Error>),

    /// Invalid client configuration, such as a missing base URL.
    #[error("configuration error: {0}")]
    Configuration(String),
}

fn join_causes(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Returns the individual causes of this error.
    ///
    /// For [`Error::InvalidRequest`] this is the list of collected
    /// construction errors; for every other variant it is a one-element
    /// slice containing the error itself.
    pub fn causes(&self) -> &[Error] {
        match self {
            Error::InvalidRequest(causes) => causes,
            other => std::slice::from_ref(other),
        }
    }

    /// Returns the HTTP status code attached to this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(Arc::new(err))
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
