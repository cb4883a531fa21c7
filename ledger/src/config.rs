//! # Ledger Configuration
//!
//! The identity of a ledger instance and the one privileged capability it
//! carries. Every constant that feeds the permit domain separator lives
//! here — if you're hardcoding one of these somewhere else, you're doing
//! it wrong.
//!
//! Two ledgers with different instance tags produce different permit
//! digests for otherwise identical permits, so a signature captured on one
//! ledger can never be replayed against another. Same idea as an EIP-712
//! `verifyingContract`, expressed as plain bytes in the digest.

use serde::{Deserialize, Serialize};

use crate::identity::Address;

/// Ledger family name, bound into every permit digest.
pub const LEDGER_NAME: &str = "folio";

/// Permit message format version. Bump on any change to the digest layout —
/// old signatures must not verify against a new layout.
pub const LEDGER_VERSION: &str = "1";

/// Static configuration for one ledger instance.
///
/// The mint capability is modeled as an explicit address carried here and
/// checked on every `mint` call — not ambient global state. Whoever
/// constructs the ledger decides who can create primitive assets; nothing
/// else in the engine is privileged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Unique tag for this ledger instance (deployment name, chain id,
    /// database path — anything stable and unique). Part of the permit
    /// domain separator.
    pub instance: String,

    /// The only account allowed to mint primitive assets.
    pub mint_authority: Address,
}

impl LedgerConfig {
    /// Creates a config for a named instance with the given mint authority.
    pub fn new(instance: impl Into<String>, mint_authority: Address) -> Self {
        Self {
            instance: instance.into(),
            mint_authority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_serialization_roundtrip() {
        let config = LedgerConfig::new("devnet-1", Address::new([7u8; 32]));
        let json = serde_json::to_string(&config).expect("serialize");
        let recovered: LedgerConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(recovered.instance, "devnet-1");
        assert_eq!(recovered.mint_authority, config.mint_authority);
    }
}
