//! # Balance Book
//!
//! Per-(owner, asset) quantity storage and the distinct-asset index, which
//! are deliberately the same data structure. A balance that reaches zero is
//! removed from the owner's sheet in the same mutation that wrote it, so
//! the sheet's key set is *always* exactly the set of assets the owner
//! holds a positive quantity of. `distinct_count` is a map length, not a
//! scan, and there is no moment where balance and index disagree.
//!
//! The book also provides `capture`/`restore` snapshot primitives. The
//! engine wraps every multi-step operation (batch transfer, compose,
//! decompose, recompose) in a snapshot of the touched accounts and restores
//! it on failure — that is the entire atomicity story, and it's boring on
//! purpose.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Address;

use super::asset::AssetId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during balance operations.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// Attempted to debit more than the available balance.
    #[error(
        "insufficient balance: available {available}, requested {requested} (asset {asset})"
    )]
    InsufficientBalance {
        /// The asset that was being debited.
        asset: AssetId,
        /// The current balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// Arithmetic overflow during a credit operation.
    ///
    /// If you're hitting this, someone is trying to credit more than
    /// 18.4 quintillion units. That's either a bug or an attack.
    #[error("balance overflow: current {current}, credit {credit} (asset {asset})")]
    Overflow {
        /// The asset that was being credited.
        asset: AssetId,
        /// The current balance before the failed credit.
        current: u64,
        /// The amount that caused the overflow.
        credit: u64,
    },
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A captured copy of the balance sheets of a set of owners.
///
/// Opaque outside this module; produced by [`BalanceBook::capture`] and
/// consumed by [`BalanceBook::restore`].
#[derive(Debug)]
pub(crate) struct Snapshot {
    sheets: Vec<(Address, Option<HashMap<AssetId, u64>>)>,
}

// ---------------------------------------------------------------------------
// BalanceBook
// ---------------------------------------------------------------------------

/// All balances in the ledger: `owner → (asset → quantity)`.
///
/// Invariant: no stored quantity is ever zero, and no owner entry is ever
/// an empty map. Both are enforced by `credit` and `debit`, the only two
/// mutation paths.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalanceBook {
    holdings: HashMap<Address, HashMap<AssetId, u64>>,
}

impl BalanceBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the quantity of `asset` held by `owner`, defaulting to 0.
    pub fn get(&self, owner: &Address, asset: &AssetId) -> u64 {
        self.holdings
            .get(owner)
            .and_then(|sheet| sheet.get(asset))
            .copied()
            .unwrap_or(0)
    }

    /// Credits `amount` of `asset` to `owner`.
    ///
    /// A zero-amount credit is a no-op and must not materialize a zero
    /// entry — that would corrupt the distinct-asset index.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::Overflow`] if the credit would exceed
    /// `u64::MAX`.
    pub fn credit(
        &mut self,
        owner: Address,
        asset: AssetId,
        amount: u64,
    ) -> Result<u64, BalanceError> {
        let current = self.get(&owner, &asset);
        let new_amount = current.checked_add(amount).ok_or(BalanceError::Overflow {
            asset,
            current,
            credit: amount,
        })?;

        if new_amount > 0 {
            self.holdings
                .entry(owner)
                .or_default()
                .insert(asset, new_amount);
        }

        Ok(new_amount)
    }

    /// Debits `amount` of `asset` from `owner`.
    ///
    /// A debit that lands exactly on zero removes the entry — the
    /// positive-to-zero transition and the index removal are one write.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::InsufficientBalance`] if `amount` exceeds
    /// the current balance.
    pub fn debit(
        &mut self,
        owner: Address,
        asset: AssetId,
        amount: u64,
    ) -> Result<u64, BalanceError> {
        let available = self.get(&owner, &asset);
        if amount > available {
            return Err(BalanceError::InsufficientBalance {
                asset,
                available,
                requested: amount,
            });
        }

        let remaining = available - amount;
        if let Some(sheet) = self.holdings.get_mut(&owner) {
            if remaining == 0 {
                sheet.remove(&asset);
                if sheet.is_empty() {
                    self.holdings.remove(&owner);
                }
            } else {
                sheet.insert(asset, remaining);
            }
        }

        Ok(remaining)
    }

    /// The number of distinct assets `owner` holds a positive quantity of.
    pub fn distinct_count(&self, owner: &Address) -> usize {
        self.holdings.get(owner).map(|sheet| sheet.len()).unwrap_or(0)
    }

    /// The asset ids `owner` holds a positive quantity of, unordered.
    pub fn assets_of(&self, owner: &Address) -> Vec<AssetId> {
        self.holdings
            .get(owner)
            .map(|sheet| sheet.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Captures the sheets of `owners` for a later [`restore`](Self::restore).
    ///
    /// Duplicate owners are fine — both entries capture the same pre-state
    /// and restoring it twice is idempotent.
    pub(crate) fn capture(&self, owners: &[Address]) -> Snapshot {
        Snapshot {
            sheets: owners
                .iter()
                .map(|owner| (*owner, self.holdings.get(owner).cloned()))
                .collect(),
        }
    }

    /// Restores previously captured sheets, discarding any changes made to
    /// those owners since the capture. Other owners are untouched.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        for (owner, sheet) in snapshot.sheets {
            match sheet {
                Some(sheet) => {
                    self.holdings.insert(owner, sheet);
                }
                None => {
                    self.holdings.remove(&owner);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
