//! API route handlers.

pub mod auth;

use crate::auth::middleware::AppState;
use axum::{routing::get, routing::post, Router};

/// Build the API router with all endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/challenge", get(auth::request_challenge))
        .route("/verify", post(auth::verify_challenge))
        .route("/session", get(auth::current_session))
        .route("/logout", post(auth::logout))
}
