//! Transport core for an authenticated web-API client.
//!
//! # Overview
//! Turns a logical request (host, path, parameters, access token, optional
//! body) into an HTTP exchange through an injected [`HttpRequestor`],
//! classifies failed exchanges into [`DbxError`], and retries transient
//! server failures with the server's backoff hint.
//!
//! # Design
//! - The core performs no I/O of its own; the host supplies the transport.
//! - `RequestDispatcher` is immutable and holds no per-call state, so it can be
//!   shared freely between threads.
//! - Response bodies and upload handles are released on every path: bodies by
//!   ownership once the handler returns, upload handles by a drop guard.
//! - Only `Server`, `Retry` and `RateLimited` failures are retried; the backoff
//!   wait can be cut short through the config's [`CancelToken`].

pub mod body;
pub mod cancel;
pub mod classify;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod headers;
pub mod http;
pub mod retry;
pub mod uri;

pub use cancel::CancelToken;
pub use client::{finish_response, RequestDispatcher, FORM_CONTENT_TYPE};
pub use config::{RequestConfig, RequestConfigBuilder, RequestSettings};
pub use envelope::{ErrorWrapper, LocalizedText};
pub use error::{DbxError, RequestError};
pub use handler::{json_handler, route_handler};
pub use headers::{Header, SDK_VERSION};
pub use http::{HeaderMap, HttpRequestor, HttpResponse, Uploader};
pub use retry::run_and_retry;
