//! Ledger read interface for chainfetch.
//!
//! The ledger is the authoritative, append-only record of keyset
//! registrations. This crate provides:
//! - the [`LedgerClient`] trait boundary: a point lookup of the block at
//!   which a keyset hash was registered, and a bounded scan of registration
//!   events
//! - [`EventScan`], the lazy forward-only sequence a scan yields
//! - [`InMemoryLedger`], an in-memory ledger for tests and embedding
//! - `SequencerInboxClient` (feature `alloy`), which reads registrations
//!   from a sequencer inbox contract over JSON-RPC
//!
//! Clients shape requests and translate errors; they carry no resolution
//! logic. A rejected query is always an error, never an empty result.

pub mod config;
pub mod error;
pub mod event;
pub mod memory;
#[cfg(feature = "alloy")]
pub mod sequencer_inbox;
pub mod traits;

pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use event::{EventScan, RegistrationEvent};
pub use memory::InMemoryLedger;
#[cfg(feature = "alloy")]
pub use sequencer_inbox::SequencerInboxClient;
pub use traits::LedgerClient;
