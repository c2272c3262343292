use chainfetch_ledger::LedgerError;
use chainfetch_types::{Interrupted, KeysetHash, RawBlockNumber};

/// Errors from keyset resolution.
///
/// Inner-store failures never appear here: they only trigger the ledger
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Neither the inner store nor the ledger has a valid keyset.
    #[error("keyset {0} not found in store or on ledger")]
    NotFound(KeysetHash),

    /// The ledger reported a registration block that does not fit a block
    /// number.
    #[error("invalid registration block {block} for keyset {hash}")]
    InvalidRegistration {
        hash: KeysetHash,
        block: RawBlockNumber,
    },

    /// The ledger query or log decoding failed.
    #[error(transparent)]
    Ledger(LedgerError),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl ResolveError {
    /// Returns `true` if the keyset is absent everywhere.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<LedgerError> for ResolveError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Interrupted(interrupted) => Self::Interrupted(interrupted),
            other => Self::Ledger(other),
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
