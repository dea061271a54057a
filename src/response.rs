//! The uniform response wrapper returned by every request.
//!
//! A [`Response`] is either a delivered HTTP exchange (status plus fully
//! buffered body) or a terminal error. The body is buffered in memory before
//! the wrapper is built, so it can be decoded any number of times and the
//! underlying connection is already released.

use crate::{Error, Result};
use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Outcome {
    Delivered { status: StatusCode, body: Bytes },
    Failed(Error),
}

/// The result of sending a [`Request`](crate::Request).
///
/// Every call to [`Client::send`](crate::Client::send) returns a `Response`,
/// whether the exchange succeeded or not. When [`err`](Response::err) is
/// `Some`, no HTTP exchange completed: [`status`](Response::status) reads
/// `None` and [`body`](Response::body) is empty.
///
/// # Examples
///
/// ```no_run
/// use apireq::{Client, Request};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Message {
///     msg: String,
/// }
///
/// # async fn example() -> Result<(), apireq::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// let response = client.send(Request::new().with_path("/messages/1")).await;
///
/// // A 404 is still a delivered response; its JSON body can be decoded.
/// let message: Message = response.scan()?;
/// println!("{} ({:?})", message.msg, response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    outcome: Outcome,
}

impl Response {
    pub(crate) fn delivered(status: StatusCode, body: Bytes) -> Self {
        Self {
            outcome: Outcome::Delivered { status, body },
        }
    }

    pub(crate) fn from_error(err: Error) -> Self {
        Self {
            outcome: Outcome::Failed(err),
        }
    }

    /// The HTTP status code, or `None` if the call failed before a response
    /// was received.
    pub fn status(&self) -> Option<StatusCode> {
        match &self.outcome {
            Outcome::Delivered { status, .. } => Some(*status),
            Outcome::Failed(_) => None,
        }
    }

    /// The error that terminated this call, if any.
    pub fn err(&self) -> Option<&Error> {
        match &self.outcome {
            Outcome::Delivered { .. } => None,
            Outcome::Failed(err) => Some(err),
        }
    }

    /// The buffered response body. Empty when the call failed.
    ///
    /// [`Bytes`] is cheap to clone, so the body can be handed out and
    /// decoded repeatedly.
    pub fn body(&self) -> Bytes {
        match &self.outcome {
            Outcome::Delivered { body, .. } => body.clone(),
            Outcome::Failed(_) => Bytes::new(),
        }
    }

    /// The buffered body length in bytes. Zero when the call failed.
    pub fn body_len(&self) -> u64 {
        match &self.outcome {
            Outcome::Delivered { body, .. } => body.len() as u64,
            Outcome::Failed(_) => 0,
        }
    }

    /// Whether a response was received with a 2xx status.
    pub fn is_success(&self) -> bool {
        matches!(&self.outcome, Outcome::Delivered { status, .. } if status.is_success())
    }

    /// JSON-decodes the buffered body into `T`.
    ///
    /// If the call failed, the stored error is returned immediately and no
    /// decoding is attempted. Otherwise the buffered body is decoded
    /// regardless of status code (error payloads are often JSON too), and
    /// a malformed body yields [`Error::Decode`].
    pub fn scan<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let (status, body) = match &self.outcome {
            Outcome::Failed(err) => return Err(err.clone()),
            Outcome::Delivered { status, body } => (*status, body),
        };

        serde_json::from_slice(body).map_err(|err| {
            tracing::error!(
                error = %err,
                status = status.as_u16(),
                "failed to decode response body"
            );
            Error::Decode {
                status,
                source: Arc::new(err),
            }
        })
    }
}
