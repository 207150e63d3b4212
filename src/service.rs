//! Login protocol orchestration.
//!
//! Sequences the three steps of a wallet login:
//! 1. challenge: issue a nonce-bound message for an address
//! 2. verify: check the signed message and consume the nonce
//! 3. session: resolve a presented token to a known user
//!
//! Every predicate is delegated to its component and the first failure is
//! returned as an [`AuthError`] classification.

use crate::auth::address::{self, Address};
use crate::auth::token::{SessionIssuer, TokenIssueError};
use crate::auth::verify::verify_signature;
use crate::clock::Clock;
use crate::models::{NonceRecord, User};
use crate::storage::nonce::NonceStore;
use crate::storage::user::UserDirectory;
use std::sync::Arc;

/// Failure classifications of the login flow.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid address")]
    InvalidAddress,

    #[error("nonce not found or expired")]
    MissingChallenge,

    #[error("nonce mismatch")]
    NonceMismatch,

    #[error("signature invalid")]
    SignatureInvalid,

    #[error("nonce already used")]
    NonceAlreadyUsed,

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    TokenIssue(#[from] TokenIssueError),
}

impl From<address::InvalidAddress> for AuthError {
    fn from(_: address::InvalidAddress) -> Self {
        AuthError::InvalidAddress
    }
}

/// Result of a successful verify step.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

/// Settings for [`AuthService`].
#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    pub challenge_ttl_secs: u64,
    pub session_ttl_secs: u64,
}

/// Owns the nonce store, user directory and session issuer.
pub struct AuthService {
    nonces: NonceStore,
    users: UserDirectory,
    sessions: SessionIssuer,
    session_ttl_secs: u64,
}

impl AuthService {
    pub fn new(settings: AuthSettings, session_secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            nonces: NonceStore::new(settings.challenge_ttl_secs, clock.clone()),
            users: UserDirectory::new(clock.clone()),
            sessions: SessionIssuer::new(session_secret, clock),
            session_ttl_secs: settings.session_ttl_secs,
        }
    }

    pub fn session_ttl_secs(&self) -> u64 {
        self.session_ttl_secs
    }

    /// Issue a challenge for `raw_address`, replacing any outstanding one.
    pub fn request_challenge(
        &self,
        raw_address: &str,
        domain: &str,
    ) -> Result<NonceRecord, AuthError> {
        let address = address::normalize(raw_address)?;
        let record = self.nonces.issue_challenge(&address, domain);

        tracing::info!(action = "challenge_issued", address = %address, "Challenge issued");
        Ok(record)
    }

    /// Verify a signed challenge and establish a session.
    ///
    /// Checks run in order and stop at the first failure: challenge present
    /// and fresh, nonce matches, signature recovers to the address, nonce
    /// consumed by this call. A rejected attempt leaves the challenge in
    /// place until it expires or is replaced.
    pub fn verify(
        &self,
        raw_address: &str,
        signature: &str,
        nonce: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let address = address::normalize(raw_address)?;

        let result = self.verify_normalized(&address, signature, nonce);
        if let Err(e) = &result {
            tracing::warn!(action = "auth_failed", address = %address, reason = %e, "Login rejected");
        }
        result
    }

    fn verify_normalized(
        &self,
        address: &Address,
        signature: &str,
        nonce: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let Some(record) = self.nonces.peek(address) else {
            if self.nonces.was_consumed(address, nonce) {
                return Err(AuthError::NonceAlreadyUsed);
            }
            return Err(AuthError::MissingChallenge);
        };

        if record.nonce != nonce {
            return Err(AuthError::NonceMismatch);
        }

        if !verify_signature(address, &record.message, signature) {
            return Err(AuthError::SignatureInvalid);
        }

        // A concurrent verify or re-issue may have changed the record since peek
        if !self.nonces.consume(address, nonce) {
            return Err(self.lost_consume_reason(address, nonce));
        }

        let token = self.sessions.issue(address, self.session_ttl_secs)?;
        let user = self.users.record_login(address);

        tracing::info!(action = "auth_success", address = %address, "User authenticated");
        Ok(LoginOutcome { user, token })
    }

    /// Classify a `consume` that failed after a successful `peek`.
    fn lost_consume_reason(&self, address: &Address, nonce: &str) -> AuthError {
        if self.nonces.was_consumed(address, nonce) {
            AuthError::NonceAlreadyUsed
        } else if self.nonces.peek(address).is_some() {
            AuthError::NonceMismatch
        } else {
            AuthError::MissingChallenge
        }
    }

    /// Resolve a session token to its user.
    ///
    /// A missing, invalid or expired token and a subject with no directory
    /// entry are all reported as [`AuthError::Unauthorized`].
    pub fn session(&self, token: Option<&str>) -> Result<User, AuthError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::Unauthorized)?;
        let claims = self
            .sessions
            .validate(token)
            .ok_or(AuthError::Unauthorized)?;

        self.users
            .lookup(&claims.subject)
            .ok_or(AuthError::Unauthorized)
    }

    /// Evict expired challenges. Returns the number removed.
    pub fn sweep_expired_challenges(&self) -> usize {
        self.nonces.sweep_expired()
    }

    /// Number of challenges held in memory, including expired ones not yet
    /// evicted.
    pub fn pending_challenges(&self) -> usize {
        self.nonces.len()
    }
}
