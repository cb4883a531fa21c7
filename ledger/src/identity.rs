//! # Account Identity
//!
//! An [`Address`] is 32 opaque bytes naming an account. By convention those
//! bytes are an Ed25519 verifying key, which buys us something important:
//! the ledger can verify a signed meta-approval from any holder without
//! maintaining a separate address-to-key registry. The address *is* the key.
//!
//! The all-zero address is the null account. It can never receive assets
//! (transfers to it are rejected) and — conveniently — all-zeros is not a
//! valid Ed25519 public key, so it can never sign anything either.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::signatures::SignatureError;

/// A 32-byte account identity.
///
/// Ordered and hashable so it can key the ledger's maps. Serialized as a
/// hex string so that address-keyed maps survive JSON as well as bincode.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 32]);

impl Address {
    /// The null account. Not a valid recipient, not a valid signer.
    pub const ZERO: Address = Address([0u8; 32]);

    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The address of the account controlling `key`.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    /// Returns `true` for the null account.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32 address bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Reinterprets the address as an Ed25519 verifying key.
    ///
    /// Fails for byte patterns that are not valid curve points — including
    /// the null account and any address that was never a key to begin with.
    pub fn verifying_key(&self) -> Result<VerifyingKey, SignatureError> {
        VerifyingKey::from_bytes(&self.0).map_err(|_| SignatureError::InvalidPublicKey)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    #[test]
    fn zero_address_is_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::new([1u8; 32]).is_zero());
    }

    #[test]
    fn zero_address_is_not_a_key() {
        // The identity point is rejected by ed25519-dalek, so the null
        // account can never pass signature verification.
        assert!(Address::ZERO.verifying_key().is_err());
    }

    #[test]
    fn address_from_keypair_roundtrips_to_key() {
        let signing = SigningKey::generate(&mut OsRng);
        let addr = Address::from_verifying_key(&signing.verifying_key());
        let recovered = addr.verifying_key().expect("valid key");
        assert_eq!(recovered, signing.verifying_key());
    }

    #[test]
    fn display_and_parse_roundtrip() {
        let addr = Address::new([0xAB; 32]);
        let parsed: Address = addr.to_string().parse().expect("parse");
        assert_eq!(parsed, addr);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!("abcd".parse::<Address>().is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let addr = Address::new([0x11; 32]);
        let json = serde_json::to_string(&addr).expect("serialize");
        assert_eq!(json, format!("\"{}\"", "11".repeat(32)));
        let back: Address = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, addr);
    }
}
