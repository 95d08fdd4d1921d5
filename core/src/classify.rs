//! Mapping unsuccessful responses to [`DbxError`].
//!
//! | Status | Error |
//! |--------|-------|
//! | 400 | `BadRequest` |
//! | 401 | `InvalidAccessToken` |
//! | 429 | `RateLimited`, backoff from `Retry-After` (seconds) |
//! | 500 | `Server` |
//! | 503 | `Retry`, zero backoff |
//! | other | `BadResponseCode` |

use std::time::Duration;

use crate::body::{load_error_body, parse_error_body};
use crate::error::DbxError;
use crate::http::HttpResponse;

pub const REQUEST_ID_HEADER: &str = "X-Dropbox-Request-Id";
pub const RETRY_AFTER_HEADER: &str = "Retry-After";

/// Classify a response the caller's handler did not accept.
///
/// Reads at most the capped error body. Failures while reading or decoding
/// that body are returned in place of the status-based classification.
pub fn unexpected_status(response: &mut HttpResponse) -> DbxError {
    classify(response).unwrap_or_else(|e| e)
}

fn classify(response: &mut HttpResponse) -> Result<DbxError, DbxError> {
    let request_id = get_request_id(response);
    let body = load_error_body(response)?;
    let message = parse_error_body(request_id.as_deref(), response.status, &body)?;

    let error = match response.status {
        400 => DbxError::BadRequest { request_id, message },
        401 => DbxError::InvalidAccessToken { request_id, message },
        429 => {
            let raw = get_first_header(response, RETRY_AFTER_HEADER)?;
            // Seconds as a non-negative 32-bit integer; anything else is malformed.
            let Some(secs) = raw.parse::<i32>().ok().and_then(|s| u64::try_from(s).ok()) else {
                return Err(DbxError::bad_response(
                    request_id.as_deref(),
                    format!("Invalid value for HTTP header: \"{RETRY_AFTER_HEADER}\""),
                ));
            };
            DbxError::RateLimited {
                request_id,
                message,
                backoff: Duration::from_secs(secs),
            }
        }
        500 => DbxError::Server { request_id, message },
        503 => DbxError::Retry {
            request_id,
            message,
            backoff: Duration::ZERO,
        },
        status => DbxError::BadResponseCode {
            request_id,
            message: format!("unexpected HTTP status code: {status}: {message}"),
            status,
        },
    };

    tracing::debug!(status = response.status, error = %error, "classified response");
    Ok(error)
}

/// First value of header `name`, or a bad-response error if it is missing.
pub fn get_first_header<'a>(response: &'a HttpResponse, name: &str) -> Result<&'a str, DbxError> {
    response.first_header(name).ok_or_else(|| {
        DbxError::bad_response(
            get_request_id(response).as_deref(),
            format!("missing HTTP header \"{name}\""),
        )
    })
}

/// First value of header `name`, if present. Names are matched exactly.
pub fn get_first_header_maybe<'a>(response: &'a HttpResponse, name: &str) -> Option<&'a str> {
    response.first_header(name)
}

pub fn get_request_id(response: &HttpResponse) -> Option<String> {
    get_first_header_maybe(response, REQUEST_ID_HEADER).map(str::to_owned)
}
