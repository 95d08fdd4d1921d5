//! Per-client request configuration.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::http::HttpRequestor;

/// Plain settings, loadable from any serde format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    /// Identifies the calling application in the `User-Agent` header.
    pub client_identifier: String,
    /// Sent as the `locale` parameter when set.
    pub user_locale: Option<String>,
    /// Extra attempts after the first one for retryable failures.
    pub max_retries: u32,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            client_identifier: "dbx-core".to_string(),
            user_locale: None,
            max_retries: 0,
        }
    }
}

/// Settings plus the transport and cancellation token used for every request.
#[derive(Clone)]
pub struct RequestConfig {
    settings: RequestSettings,
    requestor: Arc<dyn HttpRequestor>,
    cancel: CancelToken,
}

impl RequestConfig {
    pub fn builder(
        client_identifier: impl Into<String>,
        requestor: Arc<dyn HttpRequestor>,
    ) -> RequestConfigBuilder {
        RequestConfigBuilder {
            settings: RequestSettings {
                client_identifier: client_identifier.into(),
                ..RequestSettings::default()
            },
            requestor,
            cancel: CancelToken::new(),
        }
    }

    pub fn from_settings(settings: RequestSettings, requestor: Arc<dyn HttpRequestor>) -> Self {
        Self {
            settings,
            requestor,
            cancel: CancelToken::new(),
        }
    }

    pub fn client_identifier(&self) -> &str {
        &self.settings.client_identifier
    }

    pub fn user_locale(&self) -> Option<&str> {
        self.settings.user_locale.as_deref()
    }

    pub fn max_retries(&self) -> u32 {
        self.settings.max_retries
    }

    pub fn requestor(&self) -> &dyn HttpRequestor {
        self.requestor.as_ref()
    }

    /// Token that interrupts backoff waits for requests made with this config.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("settings", &self.settings)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

pub struct RequestConfigBuilder {
    settings: RequestSettings,
    requestor: Arc<dyn HttpRequestor>,
    cancel: CancelToken,
}

impl RequestConfigBuilder {
    pub fn user_locale(mut self, locale: impl Into<String>) -> Self {
        self.settings.user_locale = Some(locale.into());
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.settings.max_retries = max_retries;
        self
    }

    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn build(self) -> RequestConfig {
        RequestConfig {
            settings: self.settings,
            requestor: self.requestor,
            cancel: self.cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Header, HttpResponse, Uploader};
    use std::io;

    struct Offline;

    impl HttpRequestor for Offline {
        fn do_get(&self, _url: &str, _headers: &[Header]) -> io::Result<HttpResponse> {
            Err(io::Error::other("offline"))
        }

        fn start_post(&self, _url: &str, _headers: &[Header]) -> io::Result<Box<dyn Uploader>> {
            Err(io::Error::other("offline"))
        }

        fn start_put(&self, _url: &str, _headers: &[Header]) -> io::Result<Box<dyn Uploader>> {
            Err(io::Error::other("offline"))
        }
    }

    #[test]
    fn settings_default_missing_fields() {
        let settings: RequestSettings =
            serde_json::from_str(r#"{"client_identifier":"my-app/2.0"}"#).unwrap();
        assert_eq!(settings.client_identifier, "my-app/2.0");
        assert_eq!(settings.user_locale, None);
        assert_eq!(settings.max_retries, 0);
    }

    #[test]
    fn builder_sets_every_field() {
        let token = CancelToken::new();
        let config = RequestConfig::builder("my-app/2.0", Arc::new(Offline))
            .user_locale("de")
            .max_retries(4)
            .cancel_token(token.clone())
            .build();

        assert_eq!(config.client_identifier(), "my-app/2.0");
        assert_eq!(config.user_locale(), Some("de"));
        assert_eq!(config.max_retries(), 4);
        token.cancel();
        assert!(config.cancel_token().is_cancelled());
    }

    #[test]
    fn from_settings_keeps_values() {
        let settings = RequestSettings {
            client_identifier: "cli".to_string(),
            user_locale: Some("ja".to_string()),
            max_retries: 2,
        };
        let config = RequestConfig::from_settings(settings.clone(), Arc::new(Offline));
        assert_eq!(config.settings(), &settings);
        assert!(config.requestor().do_get("https://x/", &[]).is_err());
    }
}
