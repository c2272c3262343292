//! Verified keyset resolution.
//!
//! [`ChainFetchStore`] wraps an untrusted [`KeysetStore`](chainfetch_store::KeysetStore)
//! and a [`LedgerClient`](chainfetch_ledger::LedgerClient). Lookups try the
//! store first and fall back to the ledger's registration record when the
//! store is silent or hands back bytes that do not hash to the request.
//! Whatever path answers, returned bytes always digest to the requested hash.
//!
//! `ChainFetchStore` is itself a `KeysetStore`, so it can stand in wherever
//! a store is expected, including inside another `ChainFetchStore`.

pub mod error;
pub mod resolver;

pub use error::{ResolveError, ResolveResult};
pub use resolver::ChainFetchStore;
