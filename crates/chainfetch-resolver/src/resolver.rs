use std::sync::Arc;

use async_trait::async_trait;
use chainfetch_crypto::KeysetHasher;
use chainfetch_ledger::LedgerClient;
use chainfetch_store::KeysetStore;
use chainfetch_types::{BlockRange, KeysetHash, RegistrationBlock, RequestContext};

use crate::error::{ResolveError, ResolveResult};

/// Keyset store that verifies an inner store against the ledger.
///
/// Resolution order:
/// 1. Ask the inner store. Its errors are not reported; they only mean the
///    store cannot help.
/// 2. If the inner store returned bytes that hash to the request, return
///    them without touching the ledger.
/// 3. Otherwise look up the registration block on the ledger and scan that
///    one block for the registration event carrying the exact hash.
///
/// Holds shared references to both collaborators and no state of its own,
/// so one instance can serve any number of concurrent lookups.
pub struct ChainFetchStore<S: ?Sized, L: ?Sized> {
    inner: Arc<S>,
    ledger: Arc<L>,
}

impl<S, L> ChainFetchStore<S, L>
where
    S: KeysetStore + ?Sized,
    L: LedgerClient + ?Sized,
{
    pub fn new(inner: Arc<S>, ledger: Arc<L>) -> Self {
        Self { inner, ledger }
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Resolve `hash`, preferring the inner store.
    pub async fn resolve(&self, ctx: &RequestContext, hash: &KeysetHash) -> ResolveResult<Vec<u8>> {
        ctx.check()?;

        match ctx.run(self.inner.keyset_from_hash(ctx, hash)).await? {
            Ok(bytes) if KeysetHasher::verify(&bytes, hash) => {
                tracing::debug!(hash = %hash.short_hex(), "keyset served by inner store");
                return Ok(bytes);
            }
            Ok(bytes) => {
                tracing::debug!(
                    hash = %hash.short_hex(),
                    computed = %KeysetHasher::hash(&bytes).short_hex(),
                    "inner store returned a keyset with the wrong hash"
                );
            }
            Err(err) => {
                tracing::debug!(hash = %hash.short_hex(), error = %err, "inner store lookup failed");
            }
        }

        self.resolve_from_ledger(ctx, hash).await
    }

    /// Resolve `hash` from the ledger alone, skipping the inner store.
    pub async fn resolve_from_ledger(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> ResolveResult<Vec<u8>> {
        let block = self.registration_block(ctx, hash).await?;

        let range = BlockRange::single(block);
        let scan = ctx
            .run(self.ledger.scan_registration_events(ctx, range, hash))
            .await??;

        for item in scan {
            let event = item?;
            if event.hash.as_bytes() == hash.as_bytes() {
                tracing::info!(
                    hash = %hash.short_hex(),
                    %block,
                    bytes = event.keyset.len(),
                    "keyset recovered from ledger"
                );
                return Ok(event.keyset);
            }
            tracing::warn!(
                hash = %hash.short_hex(),
                got = %event.hash.short_hex(),
                %block,
                "ledger filter returned a non-matching registration"
            );
        }

        Err(ResolveError::NotFound(*hash))
    }

    async fn registration_block(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> ResolveResult<RegistrationBlock> {
        let word = ctx
            .run(self.ledger.registration_block_of(ctx, hash))
            .await??;

        let word = match word {
            Some(word) if !word.is_zero() => word,
            _ => {
                tracing::debug!(hash = %hash.short_hex(), "keyset not registered on ledger");
                return Err(ResolveError::NotFound(*hash));
            }
        };

        match word.to_u64() {
            Some(number) => Ok(RegistrationBlock(number)),
            None => {
                tracing::warn!(hash = %hash.short_hex(), block = %word, "registration block out of range");
                Err(ResolveError::InvalidRegistration {
                    hash: *hash,
                    block: word,
                })
            }
        }
    }
}

impl<S: ?Sized, L: ?Sized> Clone for ChainFetchStore<S, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<S: ?Sized, L: ?Sized> std::fmt::Debug for ChainFetchStore<S, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainFetchStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl<S, L> KeysetStore for ChainFetchStore<S, L>
where
    S: KeysetStore + ?Sized,
    L: LedgerClient + ?Sized,
{
    type Error = ResolveError;

    async fn keyset_from_hash(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> ResolveResult<Vec<u8>> {
        self.resolve(ctx, hash).await
    }
}
