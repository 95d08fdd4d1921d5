//! URL and query-string construction.
//!
//! Parameters are passed as a flattened key/value sequence
//! (`[key0, value0, key1, value1, ...]`). A `None` value drops the pair; a
//! `None` key or an odd-length sequence is a caller error, reported before any
//! request is made.

use ::url::form_urlencoded;
use ::url::Url;

use crate::error::DbxError;

/// Form-encode a single key or value (space becomes `+`).
pub fn encode_param(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// `https://{host}/{path}`, with the path escaped as needed.
pub fn build_uri(host: &str, path: &str) -> Result<String, DbxError> {
    let mut url = Url::parse(&format!("https://{host}")).map_err(|e| {
        DbxError::Internal(format!("URI creation failed, host={host:?}, path={path:?}: {e}"))
    })?;
    if url.host_str().is_none() || url.path() != "/" || url.query().is_some() {
        return Err(DbxError::Internal(format!(
            "URI creation failed, host={host:?}, path={path:?}: not a bare host"
        )));
    }
    url.set_path(&format!("/{path}"));
    Ok(url.into())
}

pub fn build_url_with_params(
    user_locale: Option<&str>,
    host: &str,
    path: &str,
    params: &[Option<&str>],
) -> Result<String, DbxError> {
    Ok(format!(
        "{}?{}",
        build_uri(host, path)?,
        encode_params(user_locale, params)?
    ))
}

/// Build a query string (or form body) from an optional locale and a flattened
/// key/value sequence. The locale, when present, comes first and is not
/// escaped.
pub fn encode_params(user_locale: Option<&str>, params: &[Option<&str>]) -> Result<String, DbxError> {
    if params.len() % 2 != 0 {
        return Err(DbxError::InvalidArgument(format!(
            "'params.len()' is {}; expecting a multiple of two",
            params.len()
        )));
    }

    let mut buf = String::new();
    let mut sep = "";
    if let Some(locale) = user_locale {
        buf.push_str("locale=");
        buf.push_str(locale);
        sep = "&";
    }

    for (i, pair) in params.chunks_exact(2).enumerate() {
        let key = pair[0]
            .ok_or_else(|| DbxError::InvalidArgument(format!("params[{}] is absent", i * 2)))?;
        if let Some(value) = pair[1] {
            buf.push_str(sep);
            sep = "&";
            buf.push_str(&encode_param(key));
            buf.push('=');
            buf.push_str(&encode_param(value));
        }
    }

    Ok(buf)
}
