//! # Permit — Signed Meta-Approval
//!
//! A permit lets a holder grant (or revoke) operator approval without ever
//! touching the ledger themselves: they sign a structured message off-ledger
//! and anyone — typically the spender or a relayer — submits it.
//!
//! The message digest binds five fields `(holder, spender, nonce, expiry,
//! allowed)` to one specific ledger instance via the domain context and the
//! instance tag from [`LedgerConfig`]. Replay is dead on arrival in every
//! direction: a different ledger changes the digest, a consumed nonce
//! changes the expected value, and a flipped `allowed` bit is a different
//! message entirely.
//!
//! The ledger only ever *verifies* permits. Building and signing the digest
//! is the caller's job; [`Permit::digest`] is public precisely so that
//! wallets, relayers, and tests all sign the same bytes the engine checks.

use serde::{Deserialize, Serialize};

use crate::config::{LedgerConfig, LEDGER_NAME, LEDGER_VERSION};
use crate::crypto::hash::domain_hash;
use crate::identity::Address;

/// Domain context for permit digests. Versioned independently of the
/// portfolio-id context — the two must never share an image.
const PERMIT_CONTEXT: &str = "folio/permit/v1";

/// The fields of a signed meta-approval.
///
/// `expiry` is UNIX seconds; 0 means the permit never expires. `allowed`
/// carries the approval state being set, so a revocation is a signed
/// message too — not just the absence of one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    /// The account granting or revoking approval. Must be the signer.
    pub holder: Address,
    /// The account whose operator status is being changed.
    pub spender: Address,
    /// Must equal the holder's current permit nonce.
    pub nonce: u64,
    /// UNIX-seconds deadline; 0 = no deadline.
    pub expiry: u64,
    /// `true` grants operator approval, `false` revokes it.
    pub allowed: bool,
}

impl Permit {
    /// The 32-byte digest the holder signs.
    ///
    /// Layout: domain-separated hash over the ledger name, message version,
    /// instance tag, and the five permit fields, each length-framed. Any
    /// single differing byte — including in the instance tag — yields an
    /// unrelated digest.
    pub fn digest(&self, config: &LedgerConfig) -> [u8; 32] {
        domain_hash(
            PERMIT_CONTEXT,
            &[
                LEDGER_NAME.as_bytes(),
                LEDGER_VERSION.as_bytes(),
                config.instance.as_bytes(),
                self.holder.as_bytes(),
                self.spender.as_bytes(),
                &self.nonce.to_le_bytes(),
                &self.expiry.to_le_bytes(),
                &[self.allowed as u8],
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LedgerConfig {
        LedgerConfig::new("test-instance", Address::new([9u8; 32]))
    }

    fn permit() -> Permit {
        Permit {
            holder: Address::new([1u8; 32]),
            spender: Address::new([2u8; 32]),
            nonce: 0,
            expiry: 0,
            allowed: true,
        }
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(permit().digest(&config()), permit().digest(&config()));
    }

    #[test]
    fn every_field_changes_the_digest() {
        let base = permit().digest(&config());

        let mut p = permit();
        p.spender = Address::new([3u8; 32]);
        assert_ne!(p.digest(&config()), base);

        let mut p = permit();
        p.nonce = 1;
        assert_ne!(p.digest(&config()), base);

        let mut p = permit();
        p.expiry = 12345;
        assert_ne!(p.digest(&config()), base);

        let mut p = permit();
        p.allowed = false;
        assert_ne!(p.digest(&config()), base);
    }

    #[test]
    fn different_instances_produce_different_digests() {
        // Cross-ledger replay protection: same permit, different deployment.
        let other = LedgerConfig::new("other-instance", Address::new([9u8; 32]));
        assert_ne!(permit().digest(&config()), permit().digest(&other));
    }
}
