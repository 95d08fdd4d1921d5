//! Error types for the request core.
//!
//! # Design
//! `DbxError` is a flat taxonomy: one variant per way an exchange can fail.
//! Variants produced from a response carry the server's request id (when the
//! `X-Dropbox-Request-Id` header was present) so failures can be correlated
//! with server logs. Only `Server`, `Retry` and `RateLimited` are retried;
//! see [`DbxError::retry_backoff`].
//!
//! `RequestError<E>` adds a second channel for endpoint-specific ("route")
//! failures decoded by the caller's response handler. The retry loop passes
//! route failures through untouched.

use std::convert::Infallible;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failures raised by the request core.
#[derive(Debug, Error)]
pub enum DbxError {
    /// HTTP 400: the server rejected the request as malformed.
    #[error("bad request: {message}")]
    BadRequest {
        request_id: Option<String>,
        message: String,
    },

    /// HTTP 401: the access token is invalid, expired or revoked.
    #[error("invalid access token: {message}")]
    InvalidAccessToken {
        request_id: Option<String>,
        message: String,
    },

    /// HTTP 429: too many requests; wait `backoff` before trying again.
    #[error("rate limited (retry after {}s): {message}", .backoff.as_secs())]
    RateLimited {
        request_id: Option<String>,
        message: String,
        backoff: Duration,
    },

    /// HTTP 500: the server failed while handling the request.
    #[error("server error: {message}")]
    Server {
        request_id: Option<String>,
        message: String,
    },

    /// HTTP 503: transient server condition, safe to retry immediately.
    #[error("retryable server condition: {message}")]
    Retry {
        request_id: Option<String>,
        message: String,
        backoff: Duration,
    },

    /// Any status code without a dedicated variant.
    #[error("{message}")]
    BadResponseCode {
        request_id: Option<String>,
        message: String,
        status: u16,
    },

    /// The response could not be understood (bad encoding, bad header, bad JSON).
    #[error("bad response: {message}")]
    BadResponse {
        request_id: Option<String>,
        message: String,
    },

    /// The transport failed while sending or receiving.
    #[error("network I/O error: {0}")]
    NetworkIo(#[source] io::Error),

    /// The caller passed arguments the core cannot use.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A condition that indicates a bug rather than a runtime failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DbxError {
    pub(crate) fn bad_response(request_id: Option<&str>, message: impl Into<String>) -> Self {
        DbxError::BadResponse {
            request_id: request_id.map(str::to_owned),
            message: message.into(),
        }
    }

    /// Request id reported by the server for this failure, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            DbxError::BadRequest { request_id, .. }
            | DbxError::InvalidAccessToken { request_id, .. }
            | DbxError::RateLimited { request_id, .. }
            | DbxError::Server { request_id, .. }
            | DbxError::Retry { request_id, .. }
            | DbxError::BadResponseCode { request_id, .. }
            | DbxError::BadResponse { request_id, .. } => request_id.as_deref(),
            DbxError::NetworkIo(_) | DbxError::InvalidArgument(_) | DbxError::Internal(_) => None,
        }
    }

    /// How long to wait before retrying, or `None` if this failure must not be
    /// retried.
    ///
    /// `Server` failures are retried without waiting.
    pub fn retry_backoff(&self) -> Option<Duration> {
        match self {
            DbxError::RateLimited { backoff, .. } | DbxError::Retry { backoff, .. } => Some(*backoff),
            DbxError::Server { .. } => Some(Duration::ZERO),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.retry_backoff().is_some()
    }
}

/// Result of a dispatched call: either a core failure or a route-specific
/// failure produced by the caller's response handler.
#[derive(Debug, Error)]
pub enum RequestError<E> {
    #[error(transparent)]
    Dbx(#[from] DbxError),

    #[error("route error: {0}")]
    Route(E),
}

impl<E> RequestError<E> {
    /// The core failure, if this is not a route failure.
    pub fn as_dbx(&self) -> Option<&DbxError> {
        match self {
            RequestError::Dbx(e) => Some(e),
            RequestError::Route(_) => None,
        }
    }

    pub fn into_route(self) -> Option<E> {
        match self {
            RequestError::Route(e) => Some(e),
            RequestError::Dbx(_) => None,
        }
    }
}

impl From<RequestError<Infallible>> for DbxError {
    fn from(e: RequestError<Infallible>) -> Self {
        match e {
            RequestError::Dbx(e) => e,
            RequestError::Route(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_side_conditions_are_retryable() {
        let server = DbxError::Server {
            request_id: None,
            message: "boom".to_string(),
        };
        assert_eq!(server.retry_backoff(), Some(Duration::ZERO));

        let limited = DbxError::RateLimited {
            request_id: None,
            message: "slow down".to_string(),
            backoff: Duration::from_secs(5),
        };
        assert_eq!(limited.retry_backoff(), Some(Duration::from_secs(5)));

        let bad = DbxError::BadRequest {
            request_id: None,
            message: "nope".to_string(),
        };
        assert!(!bad.is_retryable());
        assert!(!DbxError::NetworkIo(io::Error::other("reset")).is_retryable());
    }

    #[test]
    fn request_id_is_exposed_for_response_failures() {
        let err = DbxError::bad_response(Some("abc123"), "garbled");
        assert_eq!(err.request_id(), Some("abc123"));
        assert_eq!(DbxError::Internal("x".to_string()).request_id(), None);
    }

    #[test]
    fn display_includes_backoff_seconds() {
        let err = DbxError::RateLimited {
            request_id: None,
            message: "too many requests".to_string(),
            backoff: Duration::from_secs(7),
        };
        let text = err.to_string();
        assert!(text.contains("7s"));
        assert!(text.contains("too many requests"));
    }

    #[test]
    fn infallible_request_error_unwraps_to_core_error() {
        let err: RequestError<Infallible> = DbxError::InvalidArgument("odd".to_string()).into();
        let dbx: DbxError = err.into();
        assert!(matches!(dbx, DbxError::InvalidArgument(_)));
    }
}
