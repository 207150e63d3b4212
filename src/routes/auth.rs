//! Auth API endpoints.

use crate::auth::middleware::{clear_session_cookie, session_cookie, AppState, AuthSession};
use crate::error::AppError;
use crate::models::{
    ChallengeQuery, ChallengeResponse, OkResponse, SessionResponse, VerifyRequest, VerifyResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};

/// Domain used when neither `PUBLIC_HOST` nor a `Host` header is available.
const FALLBACK_DOMAIN: &str = "localhost";

/// Domain to embed in challenge messages.
fn challenge_domain(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(host) = &state.config.public_host {
        return host.clone();
    }

    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or(FALLBACK_DOMAIN)
        .to_string()
}

/// GET /challenge?address=: Issue a challenge message for signing
pub async fn request_challenge(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ChallengeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e, "Unparsable challenge query");
        AppError::BadRequest("invalid address".to_string())
    })?;

    let domain = challenge_domain(&state, &headers);
    let record = state.auth.request_challenge(&query.address, &domain)?;

    Ok(Json(ChallengeResponse {
        address: record.address,
        nonce: record.nonce,
        message: record.message,
    }))
}

/// POST /verify: Verify the signed challenge and set the session cookie
pub async fn verify_challenge(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Unparsable verify body");
        AppError::BadRequest("bad request".to_string())
    })?;

    if req.address.is_empty() || req.signature.is_empty() || req.nonce.is_empty() {
        return Err(AppError::BadRequest("bad request".to_string()));
    }

    let outcome = state.auth.verify(&req.address, &req.signature, &req.nonce)?;

    let cookie = session_cookie(
        &outcome.token,
        state.auth.session_ttl_secs(),
        state.config.cookie_secure,
    )?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(VerifyResponse {
            ok: true,
            address: outcome.user.address,
        }),
    ))
}

/// GET /session: Current user for the presented session token
pub async fn current_session(session: AuthSession) -> Json<SessionResponse> {
    Json(session.user.into())
}

/// POST /logout: Clear the client-held session cookie
pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cookie = clear_session_cookie(state.config.cookie_secure)?;

    tracing::info!(action = "logout", "Session cookie cleared");

    Ok(([(header::SET_COOKIE, cookie)], Json(OkResponse { ok: true })))
}
