//! Cryptographic primitives for chainfetch.
//!
//! Keysets are identified by the Keccak-256 digest of their bytes, the same
//! digest the registering ledger computes. All hashing wraps `sha3`; no
//! custom cryptography.

pub mod hasher;

pub use hasher::KeysetHasher;
