use chainfetch_types::KeysetHash;
use sha3::{Digest, Keccak256};

/// Keccak-256 keyset hasher.
///
/// Not domain-separated: the digest must equal the one the ledger computed
/// over the raw keyset bytes at registration.
pub struct KeysetHasher;

impl KeysetHasher {
    /// Hash raw keyset bytes.
    pub fn hash(data: &[u8]) -> KeysetHash {
        let digest: [u8; 32] = Keccak256::digest(data).into();
        KeysetHash::from_digest(digest)
    }

    /// Returns `true` if `data` digests to `expected`.
    pub fn verify(data: &[u8], expected: &KeysetHash) -> bool {
        Self::hash(data) == *expected
    }
}
