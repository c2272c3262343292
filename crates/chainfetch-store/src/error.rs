use chainfetch_types::{Interrupted, KeysetHash};

/// Errors from keyset store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store has no keyset for the hash.
    #[error("keyset not found: {0}")]
    NotFound(KeysetHash),

    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
