//! Request and response models for the API, plus the in-memory entities.
//!
//! Wire models use camelCase field names; timestamps go out as Unix
//! milliseconds.

use crate::auth::address::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Auth Models
// ============================================================================

/// Query for `GET /challenge`.
#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    #[serde(default)]
    pub address: String,
}

/// Challenge handed to the client for signing.
#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub address: Address,
    pub nonce: String,
    pub message: String,
}

/// Body of `POST /verify`. Missing fields deserialize as empty and are
/// rejected by the handler.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub nonce: String,
}

/// Response after successful verification.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub ok: bool,
    pub address: Address,
}

/// Response of `GET /session`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub address: Address,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_login_at: DateTime<Utc>,
}

/// Generic `{ "ok": true }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

// ============================================================================
// Storage Models
// ============================================================================

/// Outstanding challenge for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceRecord {
    pub address: Address,
    pub nonce: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub consumed: bool,
}

/// Account that has logged in at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl From<User> for SessionResponse {
    fn from(user: User) -> Self {
        Self {
            address: user.address,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}
