//! Challenge nonce generation and sign-in message construction.

use crate::auth::address::Address;

/// Generate a cryptographically random challenge nonce.
///
/// 128 bits from the OS RNG, rendered as a hyphenated v4 UUID (36 characters).
pub fn generate_challenge_nonce() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Build the exact text the account key must sign.
///
/// Field order and wording are fixed: the signature is verified against
/// these bytes, so any change here invalidates every outstanding challenge.
pub fn build_message(domain: &str, address: &Address, nonce: &str) -> String {
    [
        "Sign this message to log in.".to_string(),
        String::new(),
        format!("Domain: {}", domain),
        format!("Address: {}", address),
        format!("Nonce: {}", nonce),
    ]
    .join("\n")
}
