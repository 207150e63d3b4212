//! Wallet authentication: address codec, challenge messages, EIP-191
//! signature verification and stateless session tokens.

pub mod address;
pub mod challenge;
pub mod middleware;
pub mod token;
pub mod verify;

pub use address::{normalize, Address, InvalidAddress};
pub use challenge::{build_message, generate_challenge_nonce};
pub use middleware::{AppState, AuthSession, AUTH_COOKIE_NAME};
pub use token::{SessionClaimsInfo, SessionIssuer};
pub use verify::verify_signature;
