//! # Ledger Store — Persistent Snapshots
//!
//! Durability for the ledger, built on sled's embedded key-value store.
//!
//! The ledger state is small and internally consistent only as a whole —
//! balances, approvals, and nonces reference each other — so the store
//! persists it as a single bincode blob rather than scattering rows across
//! trees. One key, one atomic write, no torn state on disk.
//!
//! ## Tree Layout
//!
//! | Tree    | Key     | Value             |
//! |---------|---------|-------------------|
//! | `state` | `ledger`| `bincode(Ledger)` |
//!
//! ## Thread Safety
//!
//! sled handles are thread-safe; a `LedgerStore` can be shared via
//! `Arc<LedgerStore>` without external synchronization. Consistency of the
//! *in-memory* ledger is the engine's concern (see
//! [`SharedLedger`](crate::ledger::SharedLedger)); the store only ever sees
//! complete snapshots.

use sled::{Db, Tree};
use std::path::Path;

use crate::ledger::Ledger;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Well-known key in the `state` tree holding the ledger snapshot.
const STATE_KEY: &[u8] = b"ledger";

// ---------------------------------------------------------------------------
// LedgerStore
// ---------------------------------------------------------------------------

/// Persistent snapshot storage for a [`Ledger`].
///
/// Wraps a sled `Db` and exposes exactly two data operations: persist the
/// whole ledger, load the whole ledger. All serialization uses bincode.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    /// The underlying sled database handle.
    db: Db,
    /// The single-key tree holding the latest snapshot.
    state: Tree,
}

impl LedgerStore {
    /// Open or create a store at the given filesystem path.
    ///
    /// If the directory doesn't exist, sled creates it. An existing store
    /// opens with its last persisted snapshot available immediately.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary store that is cleaned up automatically on drop.
    ///
    /// Ideal for unit tests — no filesystem side effects, no cleanup needed.
    pub fn open_temporary() -> StoreResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let state = db.open_tree("state")?;
        Ok(Self { db, state })
    }

    /// Persist a full snapshot of the ledger, replacing any previous one,
    /// and flush it to disk before returning.
    pub fn persist(&self, ledger: &Ledger) -> StoreResult<()> {
        let bytes = bincode::serialize(ledger)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.state.insert(STATE_KEY, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Load the last persisted snapshot.
    ///
    /// Returns `None` if nothing has been persisted yet.
    pub fn load(&self) -> StoreResult<Option<Ledger>> {
        match self.state.get(STATE_KEY)? {
            Some(bytes) => {
                let ledger: Ledger = bincode::deserialize(&bytes)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(ledger))
            }
            None => Ok(None),
        }
    }

    /// Force a flush of all pending writes to disk.
    ///
    /// `persist` already flushes; this is for callers who want an explicit
    /// durability barrier at other times.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
