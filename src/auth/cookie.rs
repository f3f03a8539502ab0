use axum::http::{HeaderMap, HeaderValue, header};
use chrono::Duration;

use crate::core::error::Error;

pub(crate) const COOKIE_NAME: &str = "Authorization";

/// Issuance parameters for the session cookie. Name, path and lifetime must
/// match on issue and clear for browsers to replace the same cookie.
#[derive(Clone, Debug)]
pub(crate) struct SessionCookie {
    max_age: Duration,
    secure: bool,
}

impl SessionCookie {
    pub(crate) fn new(max_age: Duration, secure: bool) -> Self {
        Self { max_age, secure }
    }

    pub(crate) fn issue(&self, token: &str) -> Result<HeaderValue, Error> {
        self.render(token, self.max_age.num_seconds())
    }

    pub(crate) fn clear(&self) -> Result<HeaderValue, Error> {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> Result<HeaderValue, Error> {
        let secure = if self.secure { "; Secure" } else { "" };

        Ok(HeaderValue::from_str(&format!(
            "{COOKIE_NAME}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax{secure}"
        ))?)
    }
}

/// Pulls the session token from the `Authorization` cookie, falling back to
/// an `Authorization: Bearer` header.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<&str> {
    from_cookie(headers).or_else(|| from_bearer(headers))
}

fn from_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value)
}

fn from_bearer(headers: &HeaderMap) -> Option<&str> {
    let mut header = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_whitespace();

    match (header.next(), header.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}
