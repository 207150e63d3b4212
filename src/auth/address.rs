//! Account address codec.
//!
//! Addresses are `0x`-prefixed, 20-byte hex strings. They are case-insensitive
//! on input and always held in canonical lowercase form, so two spellings of
//! the same account compare equal and key the same store entries.

use serde::Serialize;
use std::fmt;

const ADDRESS_HEX_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address")]
pub struct InvalidAddress;

/// A validated, lowercase account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Address {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Validate and lowercase a raw address string.
///
/// Accepts `0x` or `0X` followed by exactly 40 hex digits in any case.
/// Surrounding whitespace is not tolerated.
pub fn normalize(raw: &str) -> Result<Address, InvalidAddress> {
    let lower = raw.to_ascii_lowercase();

    let hex = lower.strip_prefix("0x").ok_or(InvalidAddress)?;
    if hex.len() != ADDRESS_HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(InvalidAddress);
    }

    Ok(Address(lower))
}
