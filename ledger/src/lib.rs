// Copyright (c) 2026 Folio Labs. MIT License.
// See LICENSE for details.

//! # folio — Semi-Fungible Portfolio Ledger
//!
//! folio is an accounting engine for semi-fungible assets: value that is
//! fungible within an asset id and non-fungible across ids. Any holder can
//! bundle quantities of several assets into a synthetic "portfolio" asset
//! whose identifier is a content hash of its composition, unbundle it again,
//! or atomically re-weight it. No registry of portfolios exists anywhere —
//! the id *is* the recipe's fingerprint, and supplying the wrong recipe
//! simply doesn't hash to the id you're claiming.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! ledger:
//!
//! - **crypto** — Hashing and signature verification. Don't roll your own.
//! - **identity** — Account addresses. An address is a verifying key, which
//!   is what makes signed meta-approvals work without a key registry.
//! - **ledger** — Balances, approvals, transfers, composition. The core.
//! - **storage** — Durable snapshots over sled.
//! - **config** — Ledger identity and the mint capability.
//!
//! ## Design Philosophy
//!
//! 1. Every mutating operation commits fully or not at all. Partial
//!    application on failure is a correctness bug, not a performance knob.
//! 2. Checked arithmetic everywhere. Quantities never wrap, never clamp.
//! 3. A zero balance is an absent balance. The distinct-asset index falls
//!    out of that structurally instead of being maintained on the side.
//! 4. If it touches money, it has tests. Plural.

pub mod config;
pub mod crypto;
pub mod identity;
pub mod ledger;
pub mod storage;

pub use config::LedgerConfig;
pub use identity::Address;
pub use ledger::asset::AssetId;
pub use ledger::balance::BalanceError;
pub use ledger::engine::{Ledger, LedgerError, SharedLedger};
pub use ledger::permit::Permit;
pub use ledger::portfolio::portfolio_id;
pub use storage::{LedgerStore, StoreError};
