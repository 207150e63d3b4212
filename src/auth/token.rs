//! Stateless session tokens.
//!
//! A session is an HS256 JWT carrying the authenticated address (`sub`),
//! issue time (`iat`) and expiry (`exp`). Nothing is stored server-side:
//! validity is decided by the MAC and the embedded expiry alone. Rotating
//! the secret invalidates every outstanding token.

use crate::auth::address::{self, Address};
use crate::clock::Clock;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SESSION_JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Claims of a token that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaimsInfo {
    pub subject: Address,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenIssueError {
    #[error("session expiry out of range: ttl {0}s")]
    ExpiryOutOfRange(u64),

    #[error("failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Issues and validates session tokens with one process-wide secret.
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl SessionIssuer {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            clock,
        }
    }

    /// Create a token for `address` expiring `ttl_secs` from now.
    ///
    /// Fails if the expiry is not a representable timestamp.
    pub fn issue(&self, address: &Address, ttl_secs: u64) -> Result<String, TokenIssueError> {
        let iat = self.clock.now().timestamp();
        let exp = i64::try_from(ttl_secs)
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .filter(|exp| DateTime::<Utc>::from_timestamp(*exp, 0).is_some())
            .ok_or(TokenIssueError::ExpiryOutOfRange(ttl_secs))?;

        let claims = SessionClaims {
            sub: address.as_str().to_string(),
            iat,
            exp,
        };

        Ok(encode(
            &Header::new(SESSION_JWT_ALGORITHM),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Validate a token and return its claims.
    ///
    /// Returns `None` on a bad MAC, malformed token, unparsable subject, or
    /// once `now >= exp`. The reason is logged at debug level only.
    pub fn validate(&self, token: &str) -> Option<SessionClaimsInfo> {
        let mut validation = Validation::new(SESSION_JWT_ALGORITHM);
        // Expiry is checked against the injected clock below
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let data = match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                return None;
            }
        };
        let claims = data.claims;

        let now = self.clock.now().timestamp();
        if now >= claims.exp {
            tracing::debug!(exp = claims.exp, now, "Session token expired");
            return None;
        }

        let subject = address::normalize(&claims.sub).ok()?;
        let issued_at = DateTime::<Utc>::from_timestamp(claims.iat, 0)?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)?;

        Some(SessionClaimsInfo {
            subject,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use chrono::Duration;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn test_address() -> Address {
        address::normalize("0x52908400098527886e0f7030069857d2e4169ee7").unwrap()
    }

    fn fixed_clock() -> FakeClock {
        FakeClock::new_set(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }

    fn issuer(clock: &FakeClock) -> SessionIssuer {
        SessionIssuer::new(SECRET, Arc::new(clock.clone()))
    }

    #[test]
    fn test_issue_then_validate() {
        let clock = fixed_clock();
        let issuer = issuer(&clock);

        let token = issuer.issue(&test_address(), DEFAULT_SESSION_TTL_SECS).unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(claims.subject, test_address());
        assert_eq!(claims.issued_at.timestamp(), clock.now().timestamp());
        assert_eq!(
            claims.expires_at.timestamp(),
            clock.now().timestamp() + DEFAULT_SESSION_TTL_SECS as i64
        );
    }

    #[test]
    fn test_issue_rejects_unrepresentable_expiry() {
        let clock = fixed_clock();
        let issuer = issuer(&clock);

        let err = issuer.issue(&test_address(), u64::MAX).unwrap_err();
        assert!(matches!(err, TokenIssueError::ExpiryOutOfRange(u64::MAX)));

        let err = issuer.issue(&test_address(), i64::MAX as u64).unwrap_err();
        assert!(matches!(err, TokenIssueError::ExpiryOutOfRange(_)));
    }

    #[test]
    fn test_validate_rejects_after_ttl() {
        let clock = fixed_clock();
        let issuer = issuer(&clock);

        let token = issuer.issue(&test_address(), 60).unwrap();

        clock.advance(Duration::seconds(59));
        assert!(issuer.validate(&token).is_some());

        clock.advance(Duration::seconds(1));
        assert!(issuer.validate(&token).is_none());
    }

    #[test]
    fn test_validate_rejects_other_secret() {
        let clock = fixed_clock();
        let token = issuer(&clock).issue(&test_address(), 60).unwrap();

        let other = SessionIssuer::new(b"another-secret-another-secret-xx", Arc::new(clock));
        assert!(other.validate(&token).is_none());
    }

    #[test]
    fn test_validate_rejects_tampered_payload() {
        let clock = fixed_clock();
        let issuer = issuer(&clock);
        let token = issuer.issue(&test_address(), 60).unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = {
            use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
            let payload = format!(
                r#"{{"sub":"0x0000000000000000000000000000000000000001","iat":{},"exp":{}}}"#,
                clock.now().timestamp(),
                clock.now().timestamp() + 60
            );
            URL_SAFE_NO_PAD.encode(payload)
        };
        parts[1] = &forged;

        assert!(issuer.validate(&parts.join(".")).is_none());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let clock = fixed_clock();
        let issuer = issuer(&clock);

        assert!(issuer.validate("").is_none());
        assert!(issuer.validate("not.a.jwt").is_none());
        assert!(issuer.validate("abc").is_none());
    }
}
