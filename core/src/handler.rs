//! Common response handlers for the dispatcher's `do_*` calls.

use std::convert::Infallible;
use std::fmt::Debug;

use serde::de::DeserializeOwned;

use crate::body::read_json_from_response;
use crate::classify::unexpected_status;
use crate::envelope::ErrorWrapper;
use crate::error::RequestError;
use crate::http::HttpResponse;

/// 200 decodes the body as `T`; anything else is classified.
pub fn json_handler<T: DeserializeOwned>(
) -> impl FnMut(&mut HttpResponse) -> Result<T, RequestError<Infallible>> {
    |response: &mut HttpResponse| {
        if response.status == 200 {
            Ok(read_json_from_response(response)?)
        } else {
            Err(unexpected_status(response).into())
        }
    }
}

/// Like [`json_handler`], but a 409 decodes the error envelope into a route
/// error of type `R`.
pub fn route_handler<T, R>(
) -> impl FnMut(&mut HttpResponse) -> Result<T, RequestError<ErrorWrapper<R>>>
where
    T: DeserializeOwned,
    R: DeserializeOwned + Debug,
{
    |response: &mut HttpResponse| match response.status {
        200 => Ok(read_json_from_response(response)?),
        409 => Err(RequestError::Route(ErrorWrapper::from_response(response)?)),
        _ => Err(unexpected_status(response).into()),
    }
}
