//! The JSON envelope wrapping endpoint-specific errors.
//!
//! ```json
//! {"error": <route error>, "user_message": {"text": "...", "locale": "en"}}
//! ```
//!
//! Only the envelope is interpreted here; the `error` value is decoded by the
//! caller's type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::body::read_json_from_response;
use crate::classify::get_request_id;
use crate::error::DbxError;
use crate::http::HttpResponse;

/// Human-readable message the server suggests showing to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Deserialize)]
#[serde(bound = "E: DeserializeOwned")]
struct Envelope<E> {
    error: E,
    #[serde(default)]
    user_message: Option<LocalizedText>,
}

/// A decoded route error with the request id and user message that came with it.
#[derive(Debug, Error)]
#[error("route error {error:?} (request id {request_id:?})")]
pub struct ErrorWrapper<E: std::fmt::Debug> {
    pub error: E,
    pub request_id: Option<String>,
    pub user_message: Option<LocalizedText>,
}

impl<E: DeserializeOwned + std::fmt::Debug> ErrorWrapper<E> {
    /// Decode the envelope from `response`'s body.
    pub fn from_response(response: &mut HttpResponse) -> Result<Self, DbxError> {
        let request_id = get_request_id(response);
        let envelope: Envelope<E> = read_json_from_response(response)?;
        Ok(Self {
            error: envelope.error,
            request_id,
            user_message: envelope.user_message,
        })
    }
}
