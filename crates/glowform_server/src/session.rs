//! Session token transport and the authenticated-user extractor.
//!
//! The token travels in the `sid` cookie or an `Authorization: Bearer`
//! header. The cookie wins when both are present.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use glowform_core::User;

use crate::{error::ApiError, state::SharedState};

pub const SESSION_COOKIE: &str = "sid";
/// Cookie lifetime in seconds; matches the server-side session TTL.
pub const SESSION_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// Account resolved from a valid session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        let user = state
            .storage
            .auth(|service| Ok(service.authenticate(&token)?))?;
        Ok(AuthUser { user, token })
    }
}

/// Extracts the session token from cookie or bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = raw.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// `Set-Cookie` value that installs a session.
pub fn session_cookie(token: &str, secure: bool) -> String {
    cookie(token, SESSION_MAX_AGE_SECS, secure)
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    cookie("", 0, secure)
}

fn cookie(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; HttpOnly; Path=/; Max-Age={max_age}; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
