//! Error types and result handling for yomu operations.
//!
//! All operations return a [`Result<T>`] which is a type alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Auth**: the server rejected the bearer credential (401/403). Fatal to the
//!   call, never retried, surfaced verbatim to the invoking context.
//! - **Transport**: connection resets, timeouts, 5xx responses. Retried with
//!   exponential backoff by the client; surfaced with the last underlying cause
//!   once retries are exhausted.
//! - **Decode**: the response arrived but could not be decoded into the expected
//!   shape. Never retried.
//! - **Api**: the server answered with a GraphQL-level error payload instead of
//!   usable data. Never retried.
//! - **Validation**: malformed invocation input (limit out of range, empty
//!   query), rejected before any network call.
//! - **RateLimited**: HTTP 429 after retries, with the server's `Retry-After`
//!   hint when present.
//!
//! Note that a selection session running out of time is *not* an error — it is
//! the [`TimedOut`](crate::session::SessionState::TimedOut) state.
//!
//! # Examples
//!
//! ```rust
//! use yomu::error::{Error, Result};
//!
//! fn check_limit(limit: usize) -> Result<()> {
//!     if !(1..=10).contains(&limit) {
//!         return Err(Error::validation(format!(
//!             "per-source limit must be in 1..=10, got {limit}"
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(check_limit(0), Err(Error::Validation(_))));
//! ```

use thiserror::Error;

/// Type alias for Results with yomu errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all yomu operations.
///
/// The variants mirror how the API client classifies responses: the variant
/// decides whether a failure is retried, and whether it is attributable to one
/// source or one batch rather than the whole pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The server rejected the configured bearer credential.
    ///
    /// Produced for 401/403 responses. Never retried: retrying with the same
    /// credential cannot succeed.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// A transient network failure that survived all retry attempts.
    ///
    /// Carries the number of attempts made and the last underlying cause from
    /// the HTTP client (timeout, connection reset, or a 5xx status turned into
    /// an error).
    #[error("transport error after {attempts} attempts: {cause}")]
    Transport {
        attempts: u32,
        #[source]
        cause: reqwest::Error,
    },

    /// The response payload could not be decoded into the expected records.
    ///
    /// Malformed JSON, a missing `data` envelope, or fields of the wrong shape
    /// all land here. Never retried, the payload will not improve.
    #[error("decode error: {0}")]
    Decode(String),

    /// The server answered with a GraphQL `errors` payload and no usable data.
    #[error("server error: {0}")]
    Api(String),

    /// Invocation input was rejected before any network call was made.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yomu::Error;
    ///
    /// let error = Error::validation("search query must not be empty");
    /// ```
    #[error("invalid request: {0}")]
    Validation(String),

    /// The server rate-limited the request even after backoff.
    ///
    /// `retry_after` is the number of seconds from the server's `Retry-After`
    /// header, when it sent one.
    #[error("rate limited, retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },
}

impl Error {
    /// Creates an auth error with the given message.
    pub fn auth(msg: impl Into<String>) -> Self {
        Error::Auth(msg.into())
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Creates a server (GraphQL-level) error with the given message.
    pub fn api(msg: impl Into<String>) -> Self {
        Error::Api(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Creates a rate limit error with an optional retry-after time.
    pub fn rate_limited(retry_after: Option<u64>) -> Self {
        Error::RateLimited { retry_after }
    }

    /// Returns `true` if retrying the operation could plausibly succeed.
    ///
    /// Only transport-level failures are retryable; auth, decode, API and
    /// validation errors are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::RateLimited { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}
