//! # Ledger Module — Balances, Approvals, Composition
//!
//! This is where the money lives. Every balance, every approval, every
//! portfolio passes through here; the other modules exist to serve it.
//!
//! ## Architecture
//!
//! ```text
//! asset.rs      — AssetId: 256-bit asset identifiers
//! balance.rs    — BalanceBook: per-(owner, asset) quantities + distinct index
//! approval.rs   — ApprovalRegistry: operators, single spenders, permit nonces
//! permit.rs     — Permit: the signed meta-approval message and its digest
//! portfolio.rs  — portfolio_id: content-addressed composition identifiers
//! engine.rs     — Ledger: the public surface tying it all together
//! ```
//!
//! ## Design Principles
//!
//! 1. **All quantities are `u64` with checked arithmetic.** Overflow and
//!    underflow are errors the caller sees, never silent wraps.
//!
//! 2. **A zero balance is an absent balance.** `BalanceBook` removes
//!    entries the moment they hit zero, so the per-owner map *is* the
//!    distinct-asset index — the two can't disagree because they're the
//!    same write.
//!
//! 3. **Portfolios are content-addressed, not registered.** Nothing stores
//!    a recipe. Decompose and recompose take the recipe as arguments and
//!    the engine re-derives the hash; a recipe that doesn't reconstruct
//!    the claimed id is rejected before anything moves.
//!
//! 4. **Multi-step operations roll back.** Compose, decompose, recompose
//!    and batch transfers snapshot the touched accounts up front and
//!    restore them on any failure. All-or-nothing, always.

pub mod approval;
pub mod asset;
pub mod balance;
pub mod engine;
pub mod permit;
pub mod portfolio;

pub use approval::ApprovalRegistry;
pub use asset::AssetId;
pub use balance::{BalanceBook, BalanceError};
pub use engine::{Ledger, LedgerError, SharedLedger};
pub use permit::Permit;
pub use portfolio::portfolio_id;
