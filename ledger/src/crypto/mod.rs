//! # Cryptographic Primitives
//!
//! The two primitives the ledger actually needs, and nothing else:
//!
//! - **hash** — BLAKE3 with `derive_key` domain separation and length-framed
//!   multi-part input. Portfolio ids and permit digests are both built on it.
//! - **signatures** — Raw Ed25519 verification. The ledger never signs
//!   anything; holders sign off-ledger and we check their work here.

pub mod hash;
pub mod signatures;

pub use hash::domain_hash;
pub use signatures::{verify_raw, SignatureError};
