use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chainfetch_crypto::KeysetHasher;
use chainfetch_types::{KeysetHash, RequestContext};

use crate::error::{StoreError, StoreResult};
use crate::traits::KeysetStore;

/// In-memory, HashMap-based keyset store.
///
/// Intended for tests and embedding. Keysets are held behind a `RwLock` and
/// cloned on read. [`InMemoryKeysetStore::insert_raw`] can file bytes under
/// any hash, which is how tests model a stale or corrupted store.
pub struct InMemoryKeysetStore {
    keysets: RwLock<HashMap<KeysetHash, Vec<u8>>>,
    lookups: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryKeysetStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            keysets: RwLock::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Store a keyset under its Keccak-256 hash and return that hash.
    pub fn put(&self, keyset: &[u8]) -> KeysetHash {
        let hash = KeysetHasher::hash(keyset);
        let mut map = self.keysets.write().expect("lock poisoned");
        map.entry(hash).or_insert_with(|| keyset.to_vec());
        hash
    }

    /// Store bytes under an arbitrary hash, without checking that they
    /// digest to it. Replaces any existing entry.
    pub fn insert_raw(&self, hash: KeysetHash, bytes: Vec<u8>) {
        self.keysets
            .write()
            .expect("lock poisoned")
            .insert(hash, bytes);
    }

    /// Make every subsequent lookup fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of lookups served (or refused) so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of keysets currently stored.
    pub fn len(&self) -> usize {
        self.keysets.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.keysets.read().expect("lock poisoned").is_empty()
    }

    fn get(&self, hash: &KeysetHash) -> StoreResult<Vec<u8>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store marked unavailable".into()));
        }
        let map = self.keysets.read().expect("lock poisoned");
        map.get(hash).cloned().ok_or(StoreError::NotFound(*hash))
    }
}

impl Default for InMemoryKeysetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeysetStore for InMemoryKeysetStore {
    type Error = StoreError;

    async fn keyset_from_hash(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> StoreResult<Vec<u8>> {
        ctx.check()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.get(hash)
    }
}

impl std::fmt::Debug for InMemoryKeysetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeysetStore")
            .field("keyset_count", &self.len())
            .field("lookups", &self.lookup_count())
            .finish()
    }
}
