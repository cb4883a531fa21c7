//! # Approval Registry
//!
//! The authorization state behind transfers: blanket operator approvals,
//! one-shot single-asset spenders, and the permit nonces that make signed
//! meta-approvals replay-proof.
//!
//! This is deliberately a dumb data structure. Every authorization
//! *predicate* — who may call what, when a spender is consulted, why batch
//! transfers refuse single-asset approvals — lives in the engine next to
//! the operations it gates, where it can be documented per entry point
//! instead of hidden in a shared branch.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::identity::Address;

use super::asset::AssetId;

/// Operator approvals, single-asset spenders, and permit nonces.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApprovalRegistry {
    /// `owner → set of operators` approved for all of the owner's assets.
    operators: HashMap<Address, HashSet<Address>>,

    /// `owner → (asset → spender)`: at most one approved spender per
    /// (owner, asset). Cleared by the engine on a successful transfer.
    spenders: HashMap<Address, HashMap<AssetId, Address>>,

    /// `holder → next expected permit nonce`. Missing entry means 0.
    nonces: HashMap<Address, u64>,
}

impl ApprovalRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `operator` is approved for all assets of `owner`.
    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.operators
            .get(owner)
            .map(|set| set.contains(operator))
            .unwrap_or(false)
    }

    /// Grants or revokes `operator`'s blanket approval for `owner`.
    pub fn set_operator(&mut self, owner: Address, operator: Address, approved: bool) {
        if approved {
            self.operators.entry(owner).or_default().insert(operator);
        } else if let Some(set) = self.operators.get_mut(&owner) {
            set.remove(&operator);
            if set.is_empty() {
                self.operators.remove(&owner);
            }
        }
    }

    /// The single approved spender for `(owner, asset)`, if any.
    pub fn spender_of(&self, owner: &Address, asset: &AssetId) -> Option<Address> {
        self.spenders
            .get(owner)
            .and_then(|per_asset| per_asset.get(asset))
            .copied()
    }

    /// Sets or clears the single approved spender for `(owner, asset)`.
    pub fn set_spender(&mut self, owner: Address, asset: AssetId, spender: Option<Address>) {
        match spender {
            Some(spender) => {
                self.spenders.entry(owner).or_default().insert(asset, spender);
            }
            None => self.clear_spender(&owner, &asset),
        }
    }

    /// Removes the single approved spender for `(owner, asset)`, if set.
    pub fn clear_spender(&mut self, owner: &Address, asset: &AssetId) {
        if let Some(per_asset) = self.spenders.get_mut(owner) {
            per_asset.remove(asset);
            if per_asset.is_empty() {
                self.spenders.remove(owner);
            }
        }
    }

    /// The next permit nonce expected from `holder`. Starts at 0.
    pub fn nonce_of(&self, holder: &Address) -> u64 {
        self.nonces.get(holder).copied().unwrap_or(0)
    }

    /// Consumes the current nonce of `holder`, incrementing it by one.
    pub fn bump_nonce(&mut self, holder: Address) {
        *self.nonces.entry(holder).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::new([1u8; 32])
    }

    fn operator() -> Address {
        Address::new([2u8; 32])
    }

    #[test]
    fn operator_approval_lifecycle() {
        let mut reg = ApprovalRegistry::new();
        assert!(!reg.is_approved_for_all(&owner(), &operator()));

        reg.set_operator(owner(), operator(), true);
        assert!(reg.is_approved_for_all(&owner(), &operator()));

        reg.set_operator(owner(), operator(), false);
        assert!(!reg.is_approved_for_all(&owner(), &operator()));
    }

    #[test]
    fn revoking_an_unset_operator_is_a_noop() {
        let mut reg = ApprovalRegistry::new();
        reg.set_operator(owner(), operator(), false);
        assert!(!reg.is_approved_for_all(&owner(), &operator()));
    }

    #[test]
    fn spender_set_and_clear() {
        let mut reg = ApprovalRegistry::new();
        let asset = AssetId::from(7);

        assert_eq!(reg.spender_of(&owner(), &asset), None);
        reg.set_spender(owner(), asset, Some(operator()));
        assert_eq!(reg.spender_of(&owner(), &asset), Some(operator()));

        reg.clear_spender(&owner(), &asset);
        assert_eq!(reg.spender_of(&owner(), &asset), None);
    }

    #[test]
    fn spender_replaces_previous() {
        let mut reg = ApprovalRegistry::new();
        let asset = AssetId::from(7);
        let other = Address::new([3u8; 32]);

        reg.set_spender(owner(), asset, Some(operator()));
        reg.set_spender(owner(), asset, Some(other));
        assert_eq!(reg.spender_of(&owner(), &asset), Some(other));
    }

    #[test]
    fn nonces_start_at_zero_and_count_up() {
        let mut reg = ApprovalRegistry::new();
        assert_eq!(reg.nonce_of(&owner()), 0);
        reg.bump_nonce(owner());
        reg.bump_nonce(owner());
        assert_eq!(reg.nonce_of(&owner()), 2);
        // Per-holder, not global.
        assert_eq!(reg.nonce_of(&operator()), 0);
    }

    #[test]
    fn registry_serialization_roundtrip() {
        let mut reg = ApprovalRegistry::new();
        reg.set_operator(owner(), operator(), true);
        reg.set_spender(owner(), AssetId::from(1), Some(operator()));
        reg.bump_nonce(owner());

        let json = serde_json::to_string(&reg).expect("serialize");
        let recovered: ApprovalRegistry = serde_json::from_str(&json).expect("deserialize");
        assert!(recovered.is_approved_for_all(&owner(), &operator()));
        assert_eq!(
            recovered.spender_of(&owner(), &AssetId::from(1)),
            Some(operator())
        );
        assert_eq!(recovered.nonce_of(&owner()), 1);
    }
}
