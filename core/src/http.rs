//! Transport capability consumed by the request core.
//!
//! # Design
//! The core never opens sockets. A host supplies an [`HttpRequestor`] that
//! performs the actual GET/POST/PUT exchanges; the core only builds URLs and
//! headers, interprets status codes, and decides whether to retry. Swapping
//! the requestor (a real HTTP stack, a scripted fake in tests) changes nothing
//! else.
//!
//! Bodies are streams, not buffers: a [`HttpResponse`] owns a single-use
//! reader, and uploads go through an [`Uploader`] whose sink is written
//! incrementally before [`Uploader::finish`] yields the response.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read, Write};

pub use crate::headers::Header;

/// Response header multimap. Names are matched exactly as the transport
/// reported them; each name maps to its values in arrival order.
pub type HeaderMap = HashMap<String, Vec<String>>;

/// A response returned by the transport.
///
/// `body` can be consumed once. Dropping the response (or calling
/// [`HttpResponse::close`]) releases the underlying stream.
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Box<dyn Read + Send>,
}

impl HttpResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }

    pub(crate) fn first_header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Release the body stream.
    pub fn close(self) {
        tracing::trace!(status = self.status, "releasing response body");
        drop(self);
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// A one-shot request body stream bound to an in-flight POST or PUT.
pub trait Uploader {
    /// Sink for the request body.
    fn body(&mut self) -> &mut dyn Write;

    /// Complete the request and wait for the response.
    fn finish(&mut self) -> io::Result<HttpResponse>;

    /// Release the underlying connection. Must be idempotent.
    fn close(&mut self);
}

/// Performs HTTP exchanges on behalf of the core.
pub trait HttpRequestor: Send + Sync {
    fn do_get(&self, url: &str, headers: &[Header]) -> io::Result<HttpResponse>;

    fn start_post(&self, url: &str, headers: &[Header]) -> io::Result<Box<dyn Uploader>>;

    fn start_put(&self, url: &str, headers: &[Header]) -> io::Result<Box<dyn Uploader>>;
}

/// Owns an uploader and closes it exactly once when dropped.
pub(crate) struct ClosingUploader(Box<dyn Uploader>);

impl ClosingUploader {
    pub(crate) fn new(inner: Box<dyn Uploader>) -> Self {
        Self(inner)
    }

    pub(crate) fn upload(&mut self, body: &[u8]) -> io::Result<HttpResponse> {
        self.0.body().write_all(body)?;
        self.0.finish()
    }
}

impl Drop for ClosingUploader {
    fn drop(&mut self) {
        tracing::trace!("closing upload handle");
        self.0.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn response_with(headers: &[(&str, &[&str])]) -> HttpResponse {
        let headers = headers
            .iter()
            .map(|(name, values)| {
                (
                    name.to_string(),
                    values.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect();
        HttpResponse::new(200, headers, Cursor::new(Vec::new()))
    }

    #[test]
    fn first_header_returns_first_value() {
        let response = response_with(&[("Retry-After", &["5", "10"])]);
        assert_eq!(response.first_header("Retry-After"), Some("5"));
    }

    #[test]
    fn first_header_matches_names_exactly() {
        let response = response_with(&[("X-Dropbox-Request-Id", &["abc"])]);
        assert_eq!(response.first_header("x-dropbox-request-id"), None);
    }

    #[test]
    fn first_header_ignores_empty_value_lists() {
        let response = response_with(&[("Retry-After", &[])]);
        assert_eq!(response.first_header("Retry-After"), None);
    }

    #[test]
    fn debug_omits_body() {
        let response = response_with(&[]);
        let text = format!("{response:?}");
        assert!(text.contains("200"));
        assert!(!text.contains("body"));
    }
}
