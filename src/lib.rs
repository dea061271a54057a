//! # apireq - a small HTTP request-building helper
//!
//! `apireq` assembles an HTTP request (method, path, query parameters,
//! headers, body) from a base URL and a composable [`Request`] description,
//! executes it once with `reqwest`, and returns a uniform [`Response`]
//! wrapper with the body fully buffered for later decoding.
//!
//! ## Quick Start
//!
//! ```no_run
//! use apireq::{Client, Request, SetMode};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//!     email: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), apireq::Error> {
//!     let client = Client::builder()
//!         .base_url("https://api.example.com")?
//!         .default_header("User-Agent", "my-app/1.0")?
//!         .build()?;
//!
//!     // GET with query parameters
//!     let response = client
//!         .send(
//!             Request::new()
//!                 .with_path("/users")
//!                 .with_query_param("page", "1", SetMode::Overwrite),
//!         )
//!         .await;
//!     let users: Vec<User> = response.scan()?;
//!     println!("fetched {} users", users.len());
//!
//!     // POST with a JSON body
//!     let new_user = CreateUser {
//!         name: "Alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!     };
//!     let response = client
//!         .send(
//!             Request::new()
//!                 .with_method(http::Method::POST)
//!                 .with_path("/users")
//!                 .with_body(&new_user),
//!         )
//!         .await;
//!     let created: User = response.scan()?;
//!     println!("created user with ID: {}", created.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Design
//!
//! - **Deferred failure** - building a [`Request`] never fails loudly. A
//!   body that refuses to serialize or a malformed header name is recorded
//!   inside the request, and [`Client::send`] reports every collected
//!   problem at once as [`Error::InvalidRequest`] without touching the
//!   network.
//! - **Uniform responses** - every send returns a [`Response`], success or
//!   not. Status, buffered body, and error are values on the wrapper;
//!   [`Response::scan`] decodes the body as JSON, or returns the stored
//!   error if the call never completed.
//! - **Overwrite vs. append** - header and query operations carry an
//!   explicit [`SetMode`]: `Overwrite` replaces existing values (including
//!   the client's default headers), `Append` adds alongside them.
//! - **Buffered bodies** - the response body is drained into memory before
//!   the wrapper is returned, releasing the connection and making the body
//!   decodable any number of times. There is no streaming; arbitrarily
//!   large responses are buffered whole.
//!
//! Retries, connection-reuse policy, TLS configuration, and authentication
//! flows are out of scope; they belong to the underlying HTTP client or
//! the caller. Cancellation works the usual async way: dropping the
//! [`Client::send`] future aborts the in-flight call.

mod client;
mod error;
mod request;
mod response;

pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use request::{Request, SetMode};
pub use response::Response;
