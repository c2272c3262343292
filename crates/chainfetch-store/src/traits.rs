use std::sync::Arc;

use async_trait::async_trait;
use chainfetch_types::{KeysetHash, RequestContext};

/// Lookup-by-hash capability.
///
/// This is the one contract shared by raw stores and by verifying wrappers
/// around them, so wrappers compose: anything that accepts a `KeysetStore`
/// accepts a wrapped one too.
///
/// Implementations must:
/// - honour `ctx` for every network or disk round-trip,
/// - return an error rather than empty bytes when they have nothing.
#[async_trait]
pub trait KeysetStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the keyset registered under `hash`.
    async fn keyset_from_hash(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> Result<Vec<u8>, Self::Error>;
}

#[async_trait]
impl<S> KeysetStore for Arc<S>
where
    S: KeysetStore + ?Sized,
{
    type Error = S::Error;

    async fn keyset_from_hash(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> Result<Vec<u8>, Self::Error> {
        (**self).keyset_from_hash(ctx, hash).await
    }
}
