//! Request header composition.
//!
//! Every function takes the header list by value and returns it with one
//! header appended, so callers decide whether to hand over their own list or a
//! copy. Order is preserved and duplicate names are allowed.

use crate::error::DbxError;

/// Version reported in the `User-Agent` header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const AUTHORIZATION: &str = "Authorization";
pub const SELECT_USER: &str = "Dropbox-API-Select-User";
pub const USER_AGENT: &str = "User-Agent";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";

/// A single request header. The value is sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

pub fn add_auth_header(mut headers: Vec<Header>, access_token: &str) -> Vec<Header> {
    headers.push(Header::new(AUTHORIZATION, format!("Bearer {access_token}")));
    headers
}

/// Append the header that makes a team-scoped token act as `member_id`.
pub fn add_select_user_header(
    mut headers: Vec<Header>,
    member_id: Option<&str>,
) -> Result<Vec<Header>, DbxError> {
    let member_id =
        member_id.ok_or_else(|| DbxError::InvalidArgument("'member_id' is absent".to_string()))?;
    headers.push(Header::new(SELECT_USER, member_id));
    Ok(headers)
}

pub fn add_user_agent_header(
    mut headers: Vec<Header>,
    client_identifier: &str,
    sdk_identifier: &str,
) -> Vec<Header> {
    headers.push(build_user_agent_header(client_identifier, sdk_identifier));
    headers
}

/// `User-Agent: <client> <sdk>/<version>`
pub fn build_user_agent_header(client_identifier: &str, sdk_identifier: &str) -> Header {
    Header::new(
        USER_AGENT,
        format!("{client_identifier} {sdk_identifier}/{SDK_VERSION}"),
    )
}
