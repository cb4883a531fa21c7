//! # Ledger Engine
//!
//! The public surface of the ledger: mint, transfers, approvals, permits,
//! and the compose/decompose/recompose triple. Everything else in the crate
//! is plumbing for this file.
//!
//! ## Authorization Model
//!
//! Single and batch transfers deliberately use *different* predicates, as
//! two separate entry points rather than one path with a hidden branch:
//!
//! - [`transfer`](Ledger::transfer) passes if the caller is the holder, an
//!   approved operator, or the single approved spender for that exact
//!   (owner, asset) pair. Failure is [`LedgerError::NotApproved`].
//! - [`batch_transfer`](Ledger::batch_transfer) passes only if the caller
//!   is the holder or an operator. A single-asset spender fails the whole
//!   batch with [`LedgerError::NotOperator`] — bulk moves get the stricter
//!   rule, and the distinct error makes that visible to callers.
//!
//! Composition operations act purely on the caller's own holdings, so they
//! consult no approvals at all.
//!
//! ## Atomicity
//!
//! Every multi-step operation captures the touched balance sheets up front
//! and restores them on any failure. No operation suspends mid-mutation
//! and no partial state is ever observable — the engine processes one call
//! at a time to completion, and [`SharedLedger`] is the one blessed way to
//! serialize calls across threads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::crypto::signatures::verify_raw;
use crate::identity::Address;

use super::approval::ApprovalRegistry;
use super::asset::AssetId;
use super::balance::{BalanceBook, BalanceError};
use super::permit::Permit;
use super::portfolio::portfolio_id;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by ledger operations.
///
/// Every failure fully rejects the call's effects. There is no partial
/// commit, no silent clamping, and no internal retry — retry, if any, is
/// the caller's concern.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The zero address can never receive assets.
    #[error("invalid recipient: the zero address cannot receive assets")]
    InvalidRecipient,

    /// Single-transfer authorization failed: the caller is not the holder,
    /// not an operator, and not the approved spender for this asset.
    #[error("caller {caller} is not approved to move asset {asset} of {owner}")]
    NotApproved {
        /// The rejected caller.
        caller: Address,
        /// The account whose assets were targeted.
        owner: Address,
        /// The asset the caller tried to move.
        asset: AssetId,
    },

    /// Batch-transfer authorization failed: batches are operator-only, and
    /// a single-asset approval does not qualify.
    #[error("caller {caller} is neither the holder nor an operator of {owner}")]
    NotOperator {
        /// The rejected caller.
        caller: Address,
        /// The account whose assets were targeted.
        owner: Address,
    },

    /// Parallel arrays disagree in length.
    #[error("length mismatch: {ids} asset ids vs {amounts} amounts")]
    LengthMismatch {
        /// Length of the asset-id sequence.
        ids: usize,
        /// Length of the amount/ratio sequence.
        amounts: usize,
    },

    /// The supplied composition recipe does not hash to the claimed
    /// portfolio id. Content addressing is the integrity check — there is
    /// no stored recipe to compare against.
    #[error("identity mismatch: supplied recipe derives {derived}, claimed {claimed}")]
    IdentityMismatch {
        /// The id the caller claimed.
        claimed: AssetId,
        /// The id the supplied recipe actually derives.
        derived: AssetId,
    },

    /// The permit signature does not verify against the holder's key.
    #[error("invalid permit signature for holder {holder}")]
    InvalidSignature {
        /// The claimed holder.
        holder: Address,
    },

    /// The permit nonce is not the holder's current nonce.
    #[error("nonce mismatch: expected {expected}, got {provided}")]
    NonceMismatch {
        /// The holder's current nonce.
        expected: u64,
        /// The nonce the permit carried.
        provided: u64,
    },

    /// The permit deadline has passed.
    #[error("permit expired: deadline {expiry}, current time {now}")]
    Expired {
        /// The permit's UNIX-seconds deadline.
        expiry: u64,
        /// The supplied current time, UNIX seconds.
        now: u64,
    },

    /// Self-approval is meaningless and rejected rather than ignored.
    #[error("self-approval: owner and operator are the same account")]
    InvalidOperator,

    /// The caller does not hold the mint capability.
    #[error("caller {caller} is not the mint authority")]
    UnauthorizedMint {
        /// The rejected caller.
        caller: Address,
    },

    /// A composition needs at least one component.
    #[error("composition requires at least one component")]
    EmptyComposition,

    /// Composition ratios must be positive.
    #[error("composition ratio at position {index} is zero")]
    ZeroRatio {
        /// Index of the offending ratio.
        index: usize,
    },

    /// The amount or count of an operation must be positive.
    #[error("amount must be positive")]
    ZeroAmount,

    /// `ratio * count` does not fit in the quantity type.
    #[error("ratio {ratio} x count {count} overflows the quantity range (asset {asset})")]
    AmountOverflow {
        /// The component whose scaled amount overflowed.
        asset: AssetId,
        /// The per-unit ratio.
        ratio: u64,
        /// The portfolio count.
        count: u64,
    },

    /// A spender can only be appointed for an asset the caller holds.
    #[error("cannot appoint a spender for asset {asset}: caller holds none")]
    EmptyHolding {
        /// The asset with no positive balance.
        asset: AssetId,
    },

    /// A balance operation failed (insufficient funds or overflow).
    #[error("balance error: {0}")]
    Balance(#[from] BalanceError),
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// A shared, thread-safe handle to a [`Ledger`].
///
/// The lock is the single serialization point: one call at a time, run to
/// completion, exactly the execution model the engine assumes.
pub type SharedLedger = Arc<RwLock<Ledger>>;

/// The semi-fungible asset ledger.
///
/// Owns the balance book and the approval registry; every public operation
/// takes `&mut self` and either fully commits or fully fails. The whole
/// struct serializes, so a ledger can be snapshotted to disk as one blob
/// (see [`LedgerStore`](crate::storage::LedgerStore)).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    /// Instance identity and the mint capability.
    config: LedgerConfig,
    /// All balances, which double as the distinct-asset index.
    balances: BalanceBook,
    /// Operators, single-asset spenders, permit nonces.
    approvals: ApprovalRegistry,
}

impl Ledger {
    /// Creates an empty ledger with the given configuration.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            balances: BalanceBook::new(),
            approvals: ApprovalRegistry::new(),
        }
    }

    /// Wraps the ledger in a shared, lock-guarded handle.
    pub fn into_shared(self) -> SharedLedger {
        Arc::new(RwLock::new(self))
    }

    /// This ledger's configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The quantity of `asset` held by `owner` (0 if none).
    pub fn balance_of(&self, owner: &Address, asset: &AssetId) -> u64 {
        self.balances.get(owner, asset)
    }

    /// The number of distinct assets `owner` holds a positive quantity of.
    pub fn distinct_asset_count(&self, owner: &Address) -> usize {
        self.balances.distinct_count(owner)
    }

    /// The asset ids `owner` holds a positive quantity of, unordered.
    pub fn assets_of(&self, owner: &Address) -> Vec<AssetId> {
        self.balances.assets_of(owner)
    }

    /// Whether `operator` holds blanket approval over `owner`'s assets.
    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.approvals.is_approved_for_all(owner, operator)
    }

    /// The single approved spender for `(owner, asset)`, if any.
    pub fn approved_spender(&self, owner: &Address, asset: &AssetId) -> Option<Address> {
        self.approvals.spender_of(owner, asset)
    }

    /// The next permit nonce expected from `holder`.
    pub fn permit_nonce(&self, holder: &Address) -> u64 {
        self.approvals.nonce_of(holder)
    }

    // -----------------------------------------------------------------------
    // Mint
    // -----------------------------------------------------------------------

    /// Mints `amount` of `asset` directly to `to`.
    ///
    /// Only the configured mint authority may call this; the capability is
    /// an explicit address in [`LedgerConfig`], not ambient state. Minting
    /// an id that already circulates simply increases supply — primitive
    /// and portfolio ids share one namespace and one rule set.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnauthorizedMint`] for any other caller,
    /// [`LedgerError::InvalidRecipient`] for the zero address,
    /// [`LedgerError::ZeroAmount`] for a zero amount, and
    /// [`LedgerError::Balance`] on overflow.
    pub fn mint(
        &mut self,
        caller: Address,
        asset: AssetId,
        to: Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if caller != self.config.mint_authority {
            return Err(LedgerError::UnauthorizedMint { caller });
        }
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        self.balances.credit(to, asset, amount)?;
        debug!(%asset, %to, amount, "minted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transfers
    // -----------------------------------------------------------------------

    /// Moves `amount` of `asset` from `from` to `to`.
    ///
    /// Authorized if the caller is the holder, an approved operator, or the
    /// single approved spender for `(from, asset)`. A successful transfer
    /// clears that single-asset approval — it is one-shot by design.
    ///
    /// Self-transfer (`from == to`) is permitted and nets to a no-op, but
    /// runs the real debit/credit pair so the usual balance checks apply.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidRecipient`], [`LedgerError::NotApproved`],
    /// or [`LedgerError::Balance`].
    pub fn transfer(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }

        let authorized = caller == from
            || self.approvals.is_approved_for_all(&from, &caller)
            || self.approvals.spender_of(&from, &asset) == Some(caller);
        if !authorized {
            return Err(LedgerError::NotApproved {
                caller,
                owner: from,
                asset,
            });
        }

        let checkpoint = self.balances.capture(&[from, to]);
        if let Err(err) = self
            .balances
            .debit(from, asset, amount)
            .and_then(|_| self.balances.credit(to, asset, amount))
        {
            self.balances.restore(checkpoint);
            return Err(err.into());
        }

        self.approvals.clear_spender(&from, &asset);
        debug!(%from, %to, %asset, amount, "transfer");
        Ok(())
    }

    /// Moves several assets from `from` to `to` as one atomic unit.
    ///
    /// Batches are operator-only: the caller must be the holder or hold
    /// blanket operator approval. Single-asset approvals are deliberately
    /// not consulted and fail with the distinct [`LedgerError::NotOperator`].
    /// If any component's debit fails, no mutation of the batch is visible.
    /// Single-asset approvals are untouched by batch transfers.
    ///
    /// # Errors
    ///
    /// [`LedgerError::LengthMismatch`], [`LedgerError::InvalidRecipient`],
    /// [`LedgerError::NotOperator`], or [`LedgerError::Balance`].
    pub fn batch_transfer(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        asset_ids: &[AssetId],
        amounts: &[u64],
    ) -> Result<(), LedgerError> {
        if asset_ids.len() != amounts.len() {
            return Err(LedgerError::LengthMismatch {
                ids: asset_ids.len(),
                amounts: amounts.len(),
            });
        }
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        if caller != from && !self.approvals.is_approved_for_all(&from, &caller) {
            return Err(LedgerError::NotOperator {
                caller,
                owner: from,
            });
        }

        let checkpoint = self.balances.capture(&[from, to]);
        match self.batch_transfer_inner(from, to, asset_ids, amounts) {
            Ok(()) => {
                debug!(%from, %to, components = asset_ids.len(), "batch transfer");
                Ok(())
            }
            Err(err) => {
                self.balances.restore(checkpoint);
                Err(err)
            }
        }
    }

    fn batch_transfer_inner(
        &mut self,
        from: Address,
        to: Address,
        asset_ids: &[AssetId],
        amounts: &[u64],
    ) -> Result<(), LedgerError> {
        for (asset, amount) in asset_ids.iter().zip(amounts) {
            self.balances.debit(from, *asset, *amount)?;
            self.balances.credit(to, *asset, *amount)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Approvals
    // -----------------------------------------------------------------------

    /// Grants or revokes blanket operator approval over the caller's assets.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidOperator`] if `operator` is the caller —
    /// self-approval is meaningless and rejected for clarity.
    pub fn set_operator_approval(
        &mut self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), LedgerError> {
        if operator == caller {
            return Err(LedgerError::InvalidOperator);
        }
        self.approvals.set_operator(caller, operator, approved);
        debug!(owner = %caller, %operator, approved, "operator approval");
        Ok(())
    }

    /// Appoints (or clears, with `None`) the single approved spender for
    /// `(caller, asset)`.
    ///
    /// Appointment requires the caller to hold a positive balance of the
    /// asset; clearing is always allowed. The approval is one-shot: the
    /// next successful single transfer of that asset from the caller
    /// removes it.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidOperator`] for self-appointment,
    /// [`LedgerError::EmptyHolding`] when appointing without a balance.
    pub fn set_single_approval(
        &mut self,
        caller: Address,
        asset: AssetId,
        spender: Option<Address>,
    ) -> Result<(), LedgerError> {
        if spender == Some(caller) {
            return Err(LedgerError::InvalidOperator);
        }
        if spender.is_some() && self.balances.get(&caller, &asset) == 0 {
            return Err(LedgerError::EmptyHolding { asset });
        }
        self.approvals.set_spender(caller, asset, spender);
        Ok(())
    }

    /// Applies a signed meta-approval.
    ///
    /// Anyone may submit a permit — typically the spender or a relayer.
    /// Verification order: signature, nonce, expiry; all checks precede all
    /// writes, so a failed permit has no effect whatsoever. On success,
    /// exactly one operator-approval change (grant or revoke, per
    /// `permit.allowed`) and one nonce increment.
    ///
    /// `now` is a domain value supplied by the caller, not an execution
    /// deadline — pass the environment's current wall-clock time.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidOperator`] for a self-permit,
    /// [`LedgerError::InvalidSignature`], [`LedgerError::NonceMismatch`],
    /// or [`LedgerError::Expired`].
    pub fn permit(
        &mut self,
        permit: Permit,
        signature: &[u8; 64],
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if permit.spender == permit.holder {
            return Err(LedgerError::InvalidOperator);
        }

        let digest = permit.digest(&self.config);
        verify_raw(permit.holder.as_bytes(), &digest, signature).map_err(|_| {
            LedgerError::InvalidSignature {
                holder: permit.holder,
            }
        })?;

        let expected = self.approvals.nonce_of(&permit.holder);
        if permit.nonce != expected {
            return Err(LedgerError::NonceMismatch {
                expected,
                provided: permit.nonce,
            });
        }

        let now_secs = now.timestamp().max(0) as u64;
        if permit.expiry != 0 && now_secs > permit.expiry {
            return Err(LedgerError::Expired {
                expiry: permit.expiry,
                now: now_secs,
            });
        }

        self.approvals
            .set_operator(permit.holder, permit.spender, permit.allowed);
        self.approvals.bump_nonce(permit.holder);
        debug!(holder = %permit.holder, spender = %permit.spender, allowed = permit.allowed, "permit applied");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Composition
    // -----------------------------------------------------------------------

    /// Bundles `ratios[i] * count` of each component into `count` units of
    /// the derived portfolio asset, returning its id.
    ///
    /// Acts purely on the caller's own holdings; no approvals involved.
    /// Composing the same `(asset_ids, ratios)` twice grows the balance of
    /// one shared portfolio asset — the id is the recipe's content hash.
    ///
    /// # Errors
    ///
    /// Argument validation ([`LedgerError::LengthMismatch`],
    /// [`LedgerError::EmptyComposition`], [`LedgerError::ZeroRatio`],
    /// [`LedgerError::ZeroAmount`]), [`LedgerError::AmountOverflow`], or
    /// [`LedgerError::Balance`] if any component is short — in which case
    /// nothing moves.
    pub fn compose(
        &mut self,
        caller: Address,
        asset_ids: &[AssetId],
        ratios: &[u64],
        count: u64,
    ) -> Result<AssetId, LedgerError> {
        Self::validate_composition(asset_ids, ratios, count)?;
        let portfolio = portfolio_id(asset_ids, ratios);

        let checkpoint = self.balances.capture(&[caller]);
        match self.compose_inner(caller, asset_ids, ratios, count, portfolio) {
            Ok(()) => {
                debug!(%caller, %portfolio, count, components = asset_ids.len(), "composed");
                Ok(portfolio)
            }
            Err(err) => {
                self.balances.restore(checkpoint);
                Err(err)
            }
        }
    }

    fn compose_inner(
        &mut self,
        caller: Address,
        asset_ids: &[AssetId],
        ratios: &[u64],
        count: u64,
        portfolio: AssetId,
    ) -> Result<(), LedgerError> {
        for (asset, ratio) in asset_ids.iter().zip(ratios) {
            let amount = Self::component_amount(*asset, *ratio, count)?;
            self.balances.debit(caller, *asset, amount)?;
        }
        self.balances.credit(caller, portfolio, count)?;
        Ok(())
    }

    /// Unbundles `count` units of `portfolio` back into its components.
    ///
    /// The recipe is caller-supplied and verified by re-derivation: if
    /// `portfolio_id(asset_ids, ratios) != portfolio` the call fails with
    /// [`LedgerError::IdentityMismatch`] and mutates nothing. That check is
    /// the whole integrity story — no recipe is stored anywhere.
    ///
    /// # Errors
    ///
    /// Argument validation as for [`compose`](Self::compose),
    /// [`LedgerError::IdentityMismatch`], [`LedgerError::AmountOverflow`],
    /// or [`LedgerError::Balance`] if the caller holds fewer than `count`
    /// units of the portfolio.
    pub fn decompose(
        &mut self,
        caller: Address,
        portfolio: AssetId,
        asset_ids: &[AssetId],
        ratios: &[u64],
        count: u64,
    ) -> Result<(), LedgerError> {
        Self::validate_composition(asset_ids, ratios, count)?;
        let derived = portfolio_id(asset_ids, ratios);
        if derived != portfolio {
            return Err(LedgerError::IdentityMismatch {
                claimed: portfolio,
                derived,
            });
        }

        let checkpoint = self.balances.capture(&[caller]);
        match self.decompose_inner(caller, portfolio, asset_ids, ratios, count) {
            Ok(()) => {
                debug!(%caller, %portfolio, count, "decomposed");
                Ok(())
            }
            Err(err) => {
                self.balances.restore(checkpoint);
                Err(err)
            }
        }
    }

    fn decompose_inner(
        &mut self,
        caller: Address,
        portfolio: AssetId,
        asset_ids: &[AssetId],
        ratios: &[u64],
        count: u64,
    ) -> Result<(), LedgerError> {
        self.balances.debit(caller, portfolio, count)?;
        for (asset, ratio) in asset_ids.iter().zip(ratios) {
            let amount = Self::component_amount(*asset, *ratio, count)?;
            self.balances.credit(caller, *asset, amount)?;
        }
        Ok(())
    }

    /// Re-weights `count` units of `old_portfolio` into the portfolio with
    /// the same components at `new_ratios`, returning the new id.
    ///
    /// Instead of a full decompose-then-compose, each component settles its
    /// *net delta* `(new - old) * count`: an additional debit where the new
    /// ratio is higher, a credit where it is lower, untouched where equal.
    /// Unchanged components therefore need no spare liquidity. The caller
    /// must still hold `count` of `old_portfolio` even when every delta is
    /// a credit — the old units are always burned and the new ones minted.
    ///
    /// # Errors
    ///
    /// Argument validation over both ratio sequences,
    /// [`LedgerError::IdentityMismatch`] if `old_ratios` does not
    /// reconstruct `old_portfolio`, [`LedgerError::AmountOverflow`], or
    /// [`LedgerError::Balance`]. Any failure rolls back every prior delta
    /// of the same call.
    pub fn recompose(
        &mut self,
        caller: Address,
        old_portfolio: AssetId,
        asset_ids: &[AssetId],
        old_ratios: &[u64],
        new_ratios: &[u64],
        count: u64,
    ) -> Result<AssetId, LedgerError> {
        Self::validate_composition(asset_ids, old_ratios, count)?;
        Self::validate_composition(asset_ids, new_ratios, count)?;

        let derived = portfolio_id(asset_ids, old_ratios);
        if derived != old_portfolio {
            return Err(LedgerError::IdentityMismatch {
                claimed: old_portfolio,
                derived,
            });
        }
        let new_portfolio = portfolio_id(asset_ids, new_ratios);

        let checkpoint = self.balances.capture(&[caller]);
        match self.recompose_inner(
            caller,
            old_portfolio,
            new_portfolio,
            asset_ids,
            old_ratios,
            new_ratios,
            count,
        ) {
            Ok(()) => {
                debug!(%caller, %old_portfolio, %new_portfolio, count, "recomposed");
                Ok(new_portfolio)
            }
            Err(err) => {
                self.balances.restore(checkpoint);
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn recompose_inner(
        &mut self,
        caller: Address,
        old_portfolio: AssetId,
        new_portfolio: AssetId,
        asset_ids: &[AssetId],
        old_ratios: &[u64],
        new_ratios: &[u64],
        count: u64,
    ) -> Result<(), LedgerError> {
        for (i, asset) in asset_ids.iter().enumerate() {
            let old = old_ratios[i];
            let new = new_ratios[i];
            if new > old {
                let amount = Self::component_amount(*asset, new - old, count)?;
                self.balances.debit(caller, *asset, amount)?;
            } else if old > new {
                let amount = Self::component_amount(*asset, old - new, count)?;
                self.balances.credit(caller, *asset, amount)?;
            }
        }
        self.balances.debit(caller, old_portfolio, count)?;
        self.balances.credit(caller, new_portfolio, count)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal Helpers
    // -----------------------------------------------------------------------

    /// Shared argument validation for the composition operations.
    fn validate_composition(
        asset_ids: &[AssetId],
        ratios: &[u64],
        count: u64,
    ) -> Result<(), LedgerError> {
        if asset_ids.len() != ratios.len() {
            return Err(LedgerError::LengthMismatch {
                ids: asset_ids.len(),
                amounts: ratios.len(),
            });
        }
        if asset_ids.is_empty() {
            return Err(LedgerError::EmptyComposition);
        }
        if let Some(index) = ratios.iter().position(|&r| r == 0) {
            return Err(LedgerError::ZeroRatio { index });
        }
        if count == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        Ok(())
    }

    /// `ratio * count`, checked.
    fn component_amount(asset: AssetId, ratio: u64, count: u64) -> Result<u64, LedgerError> {
        ratio
            .checked_mul(count)
            .ok_or(LedgerError::AmountOverflow { asset, ratio, count })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
