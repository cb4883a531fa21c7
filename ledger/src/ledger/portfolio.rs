//! # Portfolio Identifiers
//!
//! A portfolio's id is a content hash of its composition: the ordered
//! component ids and their ordered ratios. That single design choice does
//! three jobs at once:
//!
//! 1. **Deduplication.** Composing the same basket twice yields the same
//!    id, so the holder's quantity of one portfolio asset grows instead of
//!    two distinct assets appearing.
//! 2. **Integrity.** Nothing stores a recipe. Decompose and recompose take
//!    the recipe as arguments, and re-deriving the hash is the proof the
//!    caller isn't lying about what's inside.
//! 3. **Framing.** `[1,2]` with ratios `[1,2]` and `[2,1]` with `[1,2]`
//!    are different baskets and hash differently — position is meaning.
//!
//! Callers are responsible for rejecting mismatched sequence lengths
//! before deriving; the codec itself has no error conditions.

use crate::crypto::hash::domain_hash;

use super::asset::AssetId;

/// Domain context for portfolio ids. Versioned independently of the permit
/// context.
const PORTFOLIO_CONTEXT: &str = "folio/portfolio-id/v1";

/// Derives the content-addressed id of a `(asset_ids, ratios)` composition.
///
/// Pure and deterministic. The component count, each 32-byte id, and each
/// ratio are fed as separately framed parts, so neither sequence can be
/// reordered, extended, or shifted into the other without changing the
/// result.
pub fn portfolio_id(asset_ids: &[AssetId], ratios: &[u64]) -> AssetId {
    debug_assert_eq!(asset_ids.len(), ratios.len());

    let count = (asset_ids.len() as u32).to_le_bytes();
    let ratio_bytes: Vec<[u8; 8]> = ratios.iter().map(|r| r.to_le_bytes()).collect();

    let mut parts: Vec<&[u8]> = Vec::with_capacity(1 + asset_ids.len() + ratios.len());
    parts.push(&count);
    for id in asset_ids {
        parts.push(id.as_bytes());
    }
    for ratio in &ratio_bytes {
        parts.push(ratio);
    }

    AssetId::new(domain_hash(PORTFOLIO_CONTEXT, &parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[u64]) -> Vec<AssetId> {
        values.iter().map(|&v| AssetId::from(v)).collect()
    }

    #[test]
    fn deterministic() {
        let a = portfolio_id(&ids(&[1, 2]), &[1, 1]);
        let b = portfolio_id(&ids(&[1, 2]), &[1, 1]);
        assert_eq!(a, b);
    }

    #[test]
    fn component_order_matters() {
        let forward = portfolio_id(&ids(&[1, 2]), &[1, 1]);
        let reversed = portfolio_id(&ids(&[2, 1]), &[1, 1]);
        assert_ne!(forward, reversed);
    }

    #[test]
    fn ratio_order_matters() {
        let forward = portfolio_id(&ids(&[1, 2]), &[1, 2]);
        let reversed = portfolio_id(&ids(&[1, 2]), &[2, 1]);
        assert_ne!(forward, reversed);
    }

    #[test]
    fn ratios_change_the_id() {
        let one_one = portfolio_id(&ids(&[1, 2]), &[1, 1]);
        let one_two = portfolio_id(&ids(&[1, 2]), &[1, 2]);
        assert_ne!(one_one, one_two);
    }

    #[test]
    fn derived_id_differs_from_components() {
        // Not a proof, but a sanity check: a portfolio id should never
        // collide with a small primitive id.
        let id = portfolio_id(&ids(&[1, 2, 3]), &[1, 1, 1]);
        assert_ne!(id, AssetId::from(1));
        assert_ne!(id, AssetId::from(2));
        assert_ne!(id, AssetId::from(3));
    }

    #[test]
    fn nested_portfolios_derive_cleanly() {
        let inner = portfolio_id(&ids(&[1, 2]), &[1, 1]);
        let outer = portfolio_id(&[inner, AssetId::from(3)], &[2, 5]);
        assert_ne!(outer, inner);
    }

    #[test]
    fn wide_compositions_are_stable() {
        let components = ids(&(0..100).map(|i| 300 + i).collect::<Vec<_>>());
        let ratios = vec![1u64; 100];
        let a = portfolio_id(&components, &ratios);
        let b = portfolio_id(&components, &ratios);
        assert_eq!(a, b);
    }
}
