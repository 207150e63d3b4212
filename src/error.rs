//! Error types and Axum response conversions.

use crate::service::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Message returned for both a nonce mismatch and a bad signature, so the
/// verify endpoint does not reveal which check failed.
pub const AUTH_FAILED_MESSAGE: &str = "authentication failed";

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Internal(msg) => {
                // Log detailed error server-side, return generic message to client
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidAddress
            | AuthError::MissingChallenge
            | AuthError::NonceAlreadyUsed => AppError::BadRequest(err.to_string()),
            AuthError::NonceMismatch | AuthError::SignatureInvalid => {
                AppError::Unauthorized(AUTH_FAILED_MESSAGE.to_string())
            }
            AuthError::Unauthorized => AppError::Unauthorized(err.to_string()),
            AuthError::TokenIssue(e) => AppError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    /// Extract status code and JSON body from an AppError response.
    async fn error_response(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let (status, body) = error_response(AppError::Internal(
            "failed to sign session token: InvalidKeyFormat".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body["error"].as_str().unwrap().contains("InvalidKeyFormat"));
    }

    #[tokio::test]
    async fn test_bad_request() {
        let (status, body) = error_response(AppError::BadRequest("bad request".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad request");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (status, body) =
            error_response(AppError::Unauthorized("unauthorized".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_auth_error_mapping() {
        let cases = [
            (AuthError::InvalidAddress, StatusCode::BAD_REQUEST, "invalid address"),
            (
                AuthError::MissingChallenge,
                StatusCode::BAD_REQUEST,
                "nonce not found or expired",
            ),
            (
                AuthError::NonceAlreadyUsed,
                StatusCode::BAD_REQUEST,
                "nonce already used",
            ),
            (
                AuthError::NonceMismatch,
                StatusCode::UNAUTHORIZED,
                AUTH_FAILED_MESSAGE,
            ),
            (
                AuthError::SignatureInvalid,
                StatusCode::UNAUTHORIZED,
                AUTH_FAILED_MESSAGE,
            ),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
        ];

        for (err, expected_status, expected_message) in cases {
            let (status, body) = error_response(AppError::from(err)).await;
            assert_eq!(status, expected_status);
            assert_eq!(body["error"], expected_message);
        }
    }

    #[tokio::test]
    async fn test_mismatch_and_bad_signature_are_indistinguishable() {
        let mismatch = error_response(AuthError::NonceMismatch.into()).await;
        let bad_sig = error_response(AuthError::SignatureInvalid.into()).await;
        assert_eq!(mismatch, bad_sig);
    }
}
