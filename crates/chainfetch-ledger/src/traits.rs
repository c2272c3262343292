use std::sync::Arc;

use async_trait::async_trait;
use chainfetch_types::{BlockRange, KeysetHash, RawBlockNumber, RequestContext};

use crate::error::LedgerResult;
use crate::event::EventScan;

/// Read boundary for keyset registrations on the ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Block-number word at which `hash` was registered.
    ///
    /// `Ok(None)` is the ledger's explicit "no such keyset" answer. A zero
    /// word carries the same meaning on ledgers that report it that way.
    async fn registration_block_of(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> LedgerResult<Option<RawBlockNumber>>;

    /// Registration events in `range` whose hash matches `hash_filter`.
    ///
    /// The filter is best-effort; callers must compare each event's hash
    /// themselves. An empty result set is an empty scan, not an error.
    async fn scan_registration_events(
        &self,
        ctx: &RequestContext,
        range: BlockRange,
        hash_filter: &KeysetHash,
    ) -> LedgerResult<EventScan>;
}

#[async_trait]
impl<L> LedgerClient for Arc<L>
where
    L: LedgerClient + ?Sized,
{
    async fn registration_block_of(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> LedgerResult<Option<RawBlockNumber>> {
        (**self).registration_block_of(ctx, hash).await
    }

    async fn scan_registration_events(
        &self,
        ctx: &RequestContext,
        range: BlockRange,
        hash_filter: &KeysetHash,
    ) -> LedgerResult<EventScan> {
        (**self).scan_registration_events(ctx, range, hash_filter).await
    }
}
