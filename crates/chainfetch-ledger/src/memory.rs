use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chainfetch_crypto::KeysetHasher;
use chainfetch_types::{BlockRange, KeysetHash, RawBlockNumber, RegistrationBlock, RequestContext};

use crate::error::{LedgerError, LedgerResult};
use crate::event::{EventScan, RegistrationEvent};
use crate::traits::LedgerClient;

/// In-memory ledger for tests, local demos, and embedding.
///
/// Registrations are append-only: the first registration of a hash wins and
/// is never moved. Every query is recorded so callers can assert exactly
/// what was asked of the ledger, and faults can be injected to model a
/// misbehaving node.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    next_block: u64,
    registrations: HashMap<KeysetHash, u64>,
    logs: BTreeMap<u64, Vec<LogEntry>>,
    block_overrides: HashMap<KeysetHash, Option<RawBlockNumber>>,
    point_lookup_failure: Option<LedgerError>,
    scan_failure: Option<LedgerError>,
    latency: Duration,
    point_lookups: Vec<KeysetHash>,
    scans: Vec<BlockRange>,
}

enum LogEntry {
    /// Matched by the hash filter only when the hash is equal.
    Registration(RegistrationEvent),
    /// Returned for any hash filter, as a sloppy node would.
    Unfiltered(RegistrationEvent),
    /// Fails to decode when reached.
    Undecodable(String),
}

impl LogEntry {
    fn passes(&self, filter: &KeysetHash) -> bool {
        match self {
            Self::Registration(event) => event.hash == *filter,
            Self::Unfiltered(_) | Self::Undecodable(_) => true,
        }
    }

    fn to_item(&self) -> LedgerResult<RegistrationEvent> {
        match self {
            Self::Registration(event) | Self::Unfiltered(event) => Ok(event.clone()),
            Self::Undecodable(reason) => Err(LedgerError::Decode(reason.clone())),
        }
    }
}

impl InMemoryLedger {
    /// Create an empty ledger. The first registration lands in block 1, so
    /// block 0 never holds a registration.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState {
                next_block: 1,
                ..LedgerState::default()
            }),
        }
    }

    fn state(&self) -> std::sync::RwLockReadGuard<'_, LedgerState> {
        self.inner.read().expect("lock poisoned")
    }

    fn state_mut(&self) -> std::sync::RwLockWriteGuard<'_, LedgerState> {
        self.inner.write().expect("lock poisoned")
    }

    /// Register a keyset in the next block.
    pub fn register(&self, keyset: &[u8]) -> (KeysetHash, RegistrationBlock) {
        let block = self.state().next_block;
        self.register_at(block, keyset)
    }

    /// Register a keyset in a specific block. If the hash is already
    /// registered the existing registration is returned unchanged.
    pub fn register_at(&self, block: u64, keyset: &[u8]) -> (KeysetHash, RegistrationBlock) {
        let hash = KeysetHasher::hash(keyset);
        let mut state = self.state_mut();
        if let Some(existing) = state.registrations.get(&hash) {
            return (hash, RegistrationBlock(*existing));
        }
        state.registrations.insert(hash, block);
        state
            .logs
            .entry(block)
            .or_default()
            .push(LogEntry::Registration(RegistrationEvent::new(
                hash,
                keyset.to_vec(),
                block,
            )));
        state.next_block = state.next_block.max(block.saturating_add(1));
        (hash, RegistrationBlock(block))
    }

    /// Emit a log in `block` that every hash filter lets through.
    pub fn inject_unfiltered_event(&self, block: u64, hash: KeysetHash, keyset: Vec<u8>) {
        self.state_mut()
            .logs
            .entry(block)
            .or_default()
            .push(LogEntry::Unfiltered(RegistrationEvent::new(hash, keyset, block)));
    }

    /// Emit a log in `block` that fails to decode when the scan reaches it.
    pub fn inject_undecodable_log(&self, block: u64, reason: impl Into<String>) {
        self.state_mut()
            .logs
            .entry(block)
            .or_default()
            .push(LogEntry::Undecodable(reason.into()));
    }

    /// Make the point lookup for `hash` answer `word` regardless of
    /// registrations. `None` answers "no such keyset".
    pub fn set_raw_block(&self, hash: KeysetHash, word: Option<RawBlockNumber>) {
        self.state_mut().block_overrides.insert(hash, word);
    }

    /// Make every point lookup fail with `error` (or succeed again on `None`).
    pub fn fail_point_lookups(&self, error: Option<LedgerError>) {
        self.state_mut().point_lookup_failure = error;
    }

    /// Make every scan fail with `error` (or succeed again on `None`).
    pub fn fail_scans(&self, error: Option<LedgerError>) {
        self.state_mut().scan_failure = error;
    }

    /// Delay every query by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state_mut().latency = latency;
    }

    /// Hashes passed to point lookups, in call order.
    pub fn point_lookups(&self) -> Vec<KeysetHash> {
        self.state().point_lookups.clone()
    }

    /// Ranges passed to scans, in call order.
    pub fn scanned_ranges(&self) -> Vec<BlockRange> {
        self.state().scans.clone()
    }

    /// Total queries of either kind served so far.
    pub fn query_count(&self) -> usize {
        let state = self.state();
        state.point_lookups.len() + state.scans.len()
    }

    async fn round_trip(&self, ctx: &RequestContext) -> LedgerResult<()> {
        let latency = self.state().latency;
        if latency.is_zero() {
            ctx.check()?;
        } else {
            ctx.run(tokio::time::sleep(latency)).await?;
        }
        Ok(())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn registration_block_of(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> LedgerResult<Option<RawBlockNumber>> {
        self.round_trip(ctx).await?;
        let mut state = self.state_mut();
        state.point_lookups.push(*hash);
        if let Some(err) = &state.point_lookup_failure {
            return Err(err.clone());
        }
        if let Some(word) = state.block_overrides.get(hash) {
            return Ok(*word);
        }
        Ok(state
            .registrations
            .get(hash)
            .map(|block| RawBlockNumber::from_u64(*block)))
    }

    async fn scan_registration_events(
        &self,
        ctx: &RequestContext,
        range: BlockRange,
        hash_filter: &KeysetHash,
    ) -> LedgerResult<EventScan> {
        self.round_trip(ctx).await?;
        let mut state = self.state_mut();
        state.scans.push(range);
        if let Some(err) = &state.scan_failure {
            return Err(err.clone());
        }
        let items: Vec<LedgerResult<RegistrationEvent>> = state
            .logs
            .range(range.start()..=range.end())
            .flat_map(|(_, entries)| entries.iter())
            .filter(|entry| entry.passes(hash_filter))
            .map(LogEntry::to_item)
            .collect();
        Ok(EventScan::new(items))
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("InMemoryLedger")
            .field("registrations", &state.registrations.len())
            .field("next_block", &state.next_block)
            .finish()
    }
}
