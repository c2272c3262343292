//! Foundation types for chainfetch.
//!
//! Every other chainfetch crate depends on `chainfetch-types`.
//!
//! # Key Types
//!
//! - [`KeysetHash`]: 32-byte Keccak-256 digest identifying a keyset
//! - [`RawBlockNumber`]: 256-bit block-number word as reported by a ledger
//! - [`RegistrationBlock`]: the block at which a keyset was registered
//! - [`BlockRange`]: inclusive range of blocks for log scans
//! - [`RequestContext`]: cancellation and deadline carried by every request

pub mod block;
pub mod context;
pub mod error;
pub mod hash;

pub use block::{BlockRange, RawBlockNumber, RegistrationBlock};
pub use context::{CancelHandle, Interrupted, RequestContext};
pub use error::TypeError;
pub use hash::KeysetHash;
