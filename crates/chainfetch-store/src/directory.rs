use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chainfetch_crypto::KeysetHasher;
use chainfetch_types::{KeysetHash, RequestContext};

use crate::error::{StoreError, StoreResult};
use crate::traits::KeysetStore;

/// Keyset store backed by a directory, one file per keyset.
///
/// Files are named by the hex hash. Each write goes to its own uniquely named
/// temporary file in the same directory and is renamed into place, so
/// readers never observe a partial keyset, even with concurrent writers.
#[derive(Clone, Debug)]
pub struct DirectoryKeysetStore {
    root: PathBuf,
}

impl DirectoryKeysetStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, hash: &KeysetHash) -> PathBuf {
        self.root.join(hash.to_hex())
    }

    /// Write a keyset under its Keccak-256 hash and return that hash.
    pub async fn put(&self, keyset: &[u8]) -> StoreResult<KeysetHash> {
        let hash = KeysetHasher::hash(keyset);
        let path = self.path_for(&hash);
        if tokio::fs::try_exists(&path).await? {
            return Ok(hash);
        }
        let root = self.root.clone();
        let bytes = keyset.to_vec();
        tokio::task::spawn_blocking(move || publish(&root, &path, &bytes))
            .await
            .map_err(io::Error::other)??;
        tracing::debug!(hash = %hash.short_hex(), bytes = keyset.len(), "keyset written");
        Ok(hash)
    }
}

/// The temp file is deleted on drop if anything fails before `persist`.
fn publish(root: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(root)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl KeysetStore for DirectoryKeysetStore {
    type Error = StoreError;

    async fn keyset_from_hash(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> StoreResult<Vec<u8>> {
        let path = self.path_for(hash);
        match ctx.run(tokio::fs::read(&path)).await? {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(*hash)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryKeysetStore::open(dir.path()).await.unwrap();
        let hash = store.put(b"on disk").await.unwrap();

        let ctx = RequestContext::background();
        let bytes = store.keyset_from_hash(&ctx, &hash).await.unwrap();
        assert_eq!(bytes, b"on disk");
        assert!(store.root().join(hash.to_hex()).exists());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryKeysetStore::open(dir.path()).await.unwrap();
        let hash = KeysetHash::from_digest([1u8; 32]);
        let err = store
            .keyset_from_hash(&RequestContext::background(), &hash)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(h) if h == hash));
    }

    #[tokio::test]
    async fn put_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryKeysetStore::open(dir.path()).await.unwrap();
        let h1 = store.put(b"twice").await.unwrap();
        let h2 = store.put(b"twice").await.unwrap();
        assert_eq!(h1, h2);
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_publish_whole_keyset() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryKeysetStore::open(dir.path()).await.unwrap();
        let keyset = vec![0xab; 256 * 1024];

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let keyset = keyset.clone();
            tasks.push(tokio::spawn(async move { store.put(&keyset).await }));
        }
        let expected = KeysetHasher::hash(&keyset);
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), expected);
        }

        let on_disk = std::fs::read(store.root().join(expected.to_hex())).unwrap();
        assert_eq!(on_disk, keyset);
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(expected.to_hex())]);
    }

    #[tokio::test]
    async fn open_creates_nested_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = DirectoryKeysetStore::open(&nested).await.unwrap();
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn cancelled_lookup_is_interrupted() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryKeysetStore::open(dir.path()).await.unwrap();
        let hash = store.put(b"present").await.unwrap();
        let (ctx, handle) = RequestContext::cancellable();
        handle.cancel();
        let err = store.keyset_from_hash(&ctx, &hash).await.unwrap_err();
        assert!(matches!(err, StoreError::Interrupted(_)));
    }
}
