use chainfetch_types::Interrupted;

/// Errors produced by ledger clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The query was rejected or the transport failed.
    #[error("ledger transport error: {0}")]
    Transport(String),

    /// A log could not be decoded into a registration event.
    #[error("ledger decode error: {0}")]
    Decode(String),

    #[error("ledger configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
