use std::fmt;

use chainfetch_types::KeysetHash;

use crate::error::LedgerResult;

/// A keyset registration read from a ledger log.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationEvent {
    /// Hash the log claims to register.
    pub hash: KeysetHash,
    /// Keyset bytes carried by the log.
    pub keyset: Vec<u8>,
    /// Block the log was emitted in.
    pub block: u64,
}

impl RegistrationEvent {
    pub fn new(hash: KeysetHash, keyset: Vec<u8>, block: u64) -> Self {
        Self {
            hash,
            keyset,
            block,
        }
    }
}

impl fmt::Debug for RegistrationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationEvent")
            .field("hash", &self.hash)
            .field("keyset_len", &self.keyset.len())
            .field("block", &self.block)
            .finish()
    }
}

/// Result of a registration log scan.
///
/// A lazy, finite, forward-only sequence: items are decoded as they are
/// pulled, and a consumed scan cannot be rewound. Issue a fresh scan to read
/// again. An `Err` item means the scan itself failed part-way.
pub struct EventScan {
    events: Box<dyn Iterator<Item = LedgerResult<RegistrationEvent>> + Send>,
}

impl EventScan {
    pub fn new<I>(events: I) -> Self
    where
        I: IntoIterator<Item = LedgerResult<RegistrationEvent>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            events: Box::new(events.into_iter()),
        }
    }

    /// A scan that matched nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for EventScan {
    type Item = LedgerResult<RegistrationEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.events.next()
    }
}

impl fmt::Debug for EventScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventScan").finish_non_exhaustive()
    }
}
