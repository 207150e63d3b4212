//! Axum extractors and cookie helpers for session authentication.

use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::service::AuthService;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use std::sync::Arc;

/// Name of the cookie carrying the session token.
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub config: Arc<Config>,
}

/// Authenticated session extractor.
///
/// Reads the token from the `auth_token` cookie, falling back to an
/// `Authorization: Bearer {token}` header. Returns 401 Unauthorized if the
/// token is missing, invalid, expired, or names an unknown user.
pub struct AuthSession {
    pub user: User,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers);
        let user = state.auth.session(token.as_deref())?;

        Ok(AuthSession { user })
    }
}

/// Locate the session token in request headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, AUTH_COOKIE_NAME).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
    })
}

/// Value of the first cookie named `name` across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value installing a session token.
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> Result<HeaderValue, AppError> {
    build_cookie(token, max_age_secs, secure)
}

/// `Set-Cookie` value that clears the session token immediately.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, AppError> {
    build_cookie("", 0, secure)
}

fn build_cookie(value: &str, max_age_secs: u64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        AUTH_COOKIE_NAME, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("Invalid cookie header: {}", e)))
}
