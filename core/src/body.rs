//! Reading response bodies.

use std::io::Read;

use serde::de::DeserializeOwned;

use crate::classify::get_request_id;
use crate::error::DbxError;
use crate::http::HttpResponse;

/// Error bodies are short diagnostics; anything past this is not read.
pub const MAX_ERROR_BODY_BYTES: u64 = 4096;

/// Read at most [`MAX_ERROR_BODY_BYTES`] of the body.
pub fn load_error_body(response: &mut HttpResponse) -> Result<Vec<u8>, DbxError> {
    let mut buf = Vec::new();
    response
        .body
        .by_ref()
        .take(MAX_ERROR_BODY_BYTES)
        .read_to_end(&mut buf)
        .map_err(DbxError::NetworkIo)?;
    Ok(buf)
}

/// Decode an error body as UTF-8 text.
pub fn parse_error_body(
    request_id: Option<&str>,
    status: u16,
    body: &[u8],
) -> Result<String, DbxError> {
    std::str::from_utf8(body).map(str::to_owned).map_err(|e| {
        DbxError::bad_response(
            request_id,
            format!("Got non-UTF8 response body: {status}: {e}"),
        )
    })
}

/// Decode the whole body as JSON into `T`.
///
/// Malformed or mismatched JSON becomes [`DbxError::BadResponse`]; a failure
/// of the underlying stream becomes [`DbxError::NetworkIo`].
pub fn read_json_from_response<T: DeserializeOwned>(
    response: &mut HttpResponse,
) -> Result<T, DbxError> {
    serde_json::from_reader(response.body.by_ref()).map_err(|e| {
        if e.is_io() {
            DbxError::NetworkIo(e.into())
        } else {
            DbxError::bad_response(
                get_request_id(response).as_deref(),
                format!("error in response JSON: {e}"),
            )
        }
    })
}
