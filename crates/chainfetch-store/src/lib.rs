//! Keyset lookup-by-hash for chainfetch.
//!
//! A keyset store maps a [`KeysetHash`](chainfetch_types::KeysetHash) to the
//! keyset bytes it claims digest to that hash. Stores are not trusted: they
//! may be empty, stale, or hand back bytes that fail the hash check. Callers
//! that need the integrity guarantee wrap a store in a verifying resolver.
//!
//! # Stores
//!
//! All stores implement the [`KeysetStore`] trait:
//!
//! - [`InMemoryKeysetStore`] -- `HashMap`-based store for tests and embedding
//! - [`DirectoryKeysetStore`] -- one file per keyset under a root directory
//!
//! # Design Rules
//!
//! 1. Lookups never verify content; that belongs to the caller.
//! 2. Every lookup honours the request context's cancellation and deadline.
//! 3. Writes are idempotent: the same keyset always lands under the same hash.

pub mod directory;
pub mod error;
pub mod memory;
pub mod traits;

pub use directory::DirectoryKeysetStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryKeysetStore;
pub use traits::KeysetStore;
