//! Authenticated request dispatch.
//!
//! # Design
//! `RequestDispatcher` holds only an immutable [`RequestConfig`] and the SDK
//! identifier used in `User-Agent`, so one instance can serve any number of
//! threads. Every call copies the caller's headers before adding its own and
//! builds a fresh URL per attempt.
//!
//! `start_*` methods make a single exchange and hand back the raw response or
//! upload handle. `do_*` methods wrap a start call plus a caller-supplied
//! response handler in [`run_and_retry`], and always release the response body
//! once the handler returns. Uploads are never retried here: a consumed body
//! stream cannot be replayed.

use crate::config::RequestConfig;
use crate::error::{DbxError, RequestError};
use crate::headers::{
    add_auth_header, add_user_agent_header, Header, CONTENT_LENGTH, CONTENT_TYPE,
};
use crate::http::{ClosingUploader, HttpResponse, Uploader};
use crate::retry::run_and_retry;
use crate::uri::{build_uri, build_url_with_params, encode_params};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    config: RequestConfig,
    sdk_user_agent_identifier: String,
}

impl RequestDispatcher {
    pub fn new(config: RequestConfig, sdk_user_agent_identifier: impl Into<String>) -> Self {
        Self {
            config,
            sdk_user_agent_identifier: sdk_user_agent_identifier.into(),
        }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    fn with_user_agent(&self, headers: &[Header]) -> Vec<Header> {
        add_user_agent_header(
            headers.to_vec(),
            self.config.client_identifier(),
            &self.sdk_user_agent_identifier,
        )
    }

    /// Single authenticated GET; `params` is a flattened key/value list.
    pub fn start_get(
        &self,
        access_token: &str,
        host: &str,
        path: &str,
        params: &[Option<&str>],
        headers: &[Header],
    ) -> Result<HttpResponse, DbxError> {
        let headers = add_auth_header(self.with_user_agent(headers), access_token);
        let url = build_url_with_params(self.config.user_locale(), host, path, params)?;

        tracing::debug!(%url, "starting GET");
        let response = self
            .config
            .requestor()
            .do_get(&url, &headers)
            .map_err(DbxError::NetworkIo)?;
        tracing::debug!(status = response.status, %url, "GET response");
        Ok(response)
    }

    /// Open an authenticated streaming PUT. The caller writes the body,
    /// finishes, and closes the returned handle.
    pub fn start_put(
        &self,
        access_token: &str,
        host: &str,
        path: &str,
        params: &[Option<&str>],
        headers: &[Header],
    ) -> Result<Box<dyn Uploader>, DbxError> {
        let headers = add_auth_header(self.with_user_agent(headers), access_token);
        let url = build_url_with_params(self.config.user_locale(), host, path, params)?;

        tracing::debug!(%url, "starting PUT");
        self.config
            .requestor()
            .start_put(&url, &headers)
            .map_err(DbxError::NetworkIo)
    }

    /// Single POST with `params` sent as a form body. No `Authorization`
    /// header is added.
    pub fn start_post_no_auth(
        &self,
        host: &str,
        path: &str,
        params: &[Option<&str>],
        headers: &[Header],
    ) -> Result<HttpResponse, DbxError> {
        let body = encode_params(self.config.user_locale(), params)?.into_bytes();

        let mut headers = headers.to_vec();
        headers.push(Header::new(CONTENT_TYPE, FORM_CONTENT_TYPE));

        self.start_post_raw(host, path, &body, &headers)
    }

    /// Single POST of `body`. The upload handle is closed on every path.
    pub fn start_post_raw(
        &self,
        host: &str,
        path: &str,
        body: &[u8],
        headers: &[Header],
    ) -> Result<HttpResponse, DbxError> {
        let uri = build_uri(host, path)?;

        let mut headers = self.with_user_agent(headers);
        headers.push(Header::new(CONTENT_LENGTH, body.len().to_string()));

        tracing::debug!(%uri, bytes = body.len(), "starting POST");
        let uploader = self
            .config
            .requestor()
            .start_post(&uri, &headers)
            .map_err(DbxError::NetworkIo)?;
        let response = ClosingUploader::new(uploader)
            .upload(body)
            .map_err(DbxError::NetworkIo)?;
        tracing::debug!(status = response.status, %uri, "POST response");
        Ok(response)
    }

    /// Authenticated GET, retried per the config, with `handler` turning the
    /// response into a value.
    pub fn do_get<T, E, H>(
        &self,
        access_token: &str,
        host: &str,
        path: &str,
        params: &[Option<&str>],
        headers: &[Header],
        mut handler: H,
    ) -> Result<T, RequestError<E>>
    where
        H: FnMut(&mut HttpResponse) -> Result<T, RequestError<E>>,
    {
        run_and_retry(self.config.max_retries(), self.config.cancel_token(), || {
            let response = self.start_get(access_token, host, path, params, headers)?;
            finish_response(response, &mut handler)
        })
    }

    /// Authenticated form POST, retried per the config.
    pub fn do_post<T, E, H>(
        &self,
        access_token: &str,
        host: &str,
        path: &str,
        params: &[Option<&str>],
        headers: &[Header],
        handler: H,
    ) -> Result<T, RequestError<E>>
    where
        H: FnMut(&mut HttpResponse) -> Result<T, RequestError<E>>,
    {
        let headers = add_auth_header(headers.to_vec(), access_token);
        self.do_post_no_auth(host, path, params, &headers, handler)
    }

    /// Unauthenticated form POST, retried per the config.
    pub fn do_post_no_auth<T, E, H>(
        &self,
        host: &str,
        path: &str,
        params: &[Option<&str>],
        headers: &[Header],
        mut handler: H,
    ) -> Result<T, RequestError<E>>
    where
        H: FnMut(&mut HttpResponse) -> Result<T, RequestError<E>>,
    {
        run_and_retry(self.config.max_retries(), self.config.cancel_token(), || {
            let response = self.start_post_no_auth(host, path, params, headers)?;
            finish_response(response, &mut handler)
        })
    }
}

/// Run `handler` on `response`, then release the body whatever the outcome.
pub fn finish_response<T, E, H>(mut response: HttpResponse, handler: &mut H) -> Result<T, RequestError<E>>
where
    H: FnMut(&mut HttpResponse) -> Result<T, RequestError<E>>,
{
    let result = handler(&mut response);
    response.close();
    result
}
