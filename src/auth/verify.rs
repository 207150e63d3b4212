//! EIP-191 `personal_sign` signature verification.

use crate::auth::address::Address;
use alloy_primitives::{hex, Signature};

/// Length of an `r || s || v` signature in bytes.
const SIGNATURE_LEN: usize = 65;

/// Verify that `signature` over `message` was produced by `address`'s key.
///
/// The message is hashed with the `"\x19Ethereum Signed Message:\n" + len`
/// prefix, the public key is recovered from the signature, and the derived
/// address is compared against the claimed one.
///
/// # Arguments
/// * `address` - Claimed signer (already normalized)
/// * `message` - Exact challenge text that was signed
/// * `signature_hex` - 65-byte signature, hex-encoded with or without `0x`
///
/// # Returns
/// `true` only on a successful recovery that matches. Malformed hex, wrong
/// length, an invalid `v`, or a failed recovery all yield `false`.
pub fn verify_signature(address: &Address, message: &str, signature_hex: &str) -> bool {
    let bytes = match hex::decode(signature_hex) {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(error = %e, "Signature is not valid hex");
            return false;
        }
    };

    if bytes.len() != SIGNATURE_LEN {
        tracing::debug!(len = bytes.len(), "Signature has wrong length");
        return false;
    }

    let signature = match Signature::try_from(bytes.as_slice()) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(error = %e, "Signature could not be parsed");
            return false;
        }
    };

    let recovered = match signature.recover_address_from_msg(message.as_bytes()) {
        Ok(a) => a,
        Err(e) => {
            tracing::debug!(error = %e, "Signer recovery failed");
            return false;
        }
    };

    // Lowercase hex form of the recovered address
    let recovered = format!("0x{}", hex::encode(recovered.as_slice()));
    recovered == address.as_str()
}
