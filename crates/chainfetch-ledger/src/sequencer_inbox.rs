//! Keyset registrations read from a sequencer inbox contract.

use alloy::primitives::{Address, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log};
use alloy::sol;
use alloy::sol_types::SolEvent;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use chainfetch_types::{BlockRange, KeysetHash, RawBlockNumber, RequestContext};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::event::{EventScan, RegistrationEvent};
use crate::traits::LedgerClient;

sol! {
    #[sol(rpc)]
    interface ISequencerInbox {
        error NoSuchKeyset(bytes32 keysetHash);

        event SetValidKeyset(bytes32 indexed keysetHash, bytes keysetBytes);

        function getKeysetCreationBlock(bytes32 ksHash) external view returns (uint256);
    }
}

/// [`LedgerClient`] over a sequencer inbox contract.
///
/// The point lookup calls `getKeysetCreationBlock`; a `NoSuchKeyset` revert
/// is the explicit not-found answer. Scans fetch `SetValidKeyset` logs with
/// the keyset hash as the indexed topic and decode them while iterating.
#[derive(Clone)]
pub struct SequencerInboxClient {
    provider: DynProvider,
    inbox: Address,
}

impl SequencerInboxClient {
    pub fn new(provider: DynProvider, inbox: Address) -> Self {
        Self { provider, inbox }
    }

    /// Build an HTTP JSON-RPC client from configuration.
    pub fn connect(config: &LedgerConfig) -> LedgerResult<Self> {
        let url: Url = config
            .rpc_url
            .parse()
            .map_err(|e| LedgerError::Config(format!("invalid RPC URL {:?}: {e}", config.rpc_url)))?;
        let inbox: Address = config.sequencer_inbox.parse().map_err(|e| {
            LedgerError::Config(format!(
                "invalid sequencer inbox address {:?}: {e}",
                config.sequencer_inbox
            ))
        })?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        tracing::info!(%inbox, rpc_url = %config.rpc_url, "sequencer inbox client ready");
        Ok(Self::new(provider, inbox))
    }

    pub fn inbox(&self) -> Address {
        self.inbox
    }

    fn registration_filter(&self, range: BlockRange, hash: &KeysetHash) -> Filter {
        Filter::new()
            .address(self.inbox)
            .event_signature(ISequencerInbox::SetValidKeyset::SIGNATURE_HASH)
            .topic1(B256::from(*hash.as_bytes()))
            .from_block(range.start())
            .to_block(range.end())
    }
}

impl std::fmt::Debug for SequencerInboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequencerInboxClient")
            .field("inbox", &self.inbox)
            .finish_non_exhaustive()
    }
}

fn decode_registration(log: Log) -> LedgerResult<RegistrationEvent> {
    let block = log
        .block_number
        .ok_or_else(|| LedgerError::Decode("log has no block number".into()))?;
    let decoded = log
        .log_decode::<ISequencerInbox::SetValidKeyset>()
        .map_err(|e| LedgerError::Decode(e.to_string()))?;
    let event = decoded.inner.data;
    Ok(RegistrationEvent::new(
        KeysetHash::from_digest(event.keysetHash.0),
        event.keysetBytes.to_vec(),
        block,
    ))
}

#[async_trait]
impl LedgerClient for SequencerInboxClient {
    async fn registration_block_of(
        &self,
        ctx: &RequestContext,
        hash: &KeysetHash,
    ) -> LedgerResult<Option<RawBlockNumber>> {
        let inbox = ISequencerInbox::new(self.inbox, self.provider.clone());
        let call = inbox.getKeysetCreationBlock(B256::from(*hash.as_bytes()));
        match ctx.run(call.call()).await? {
            Ok(block) => Ok(Some(RawBlockNumber::from_be_bytes(
                block.to_be_bytes::<32>(),
            ))),
            Err(err) if err.as_decoded_error::<ISequencerInbox::NoSuchKeyset>().is_some() => {
                tracing::debug!(hash = %hash.short_hex(), "ledger reports no such keyset");
                Ok(None)
            }
            Err(err) => Err(LedgerError::Transport(err.to_string())),
        }
    }

    async fn scan_registration_events(
        &self,
        ctx: &RequestContext,
        range: BlockRange,
        hash_filter: &KeysetHash,
    ) -> LedgerResult<EventScan> {
        let filter = self.registration_filter(range, hash_filter);
        let logs = ctx
            .run(self.provider.get_logs(&filter))
            .await?
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        tracing::debug!(
            hash = %hash_filter.short_hex(),
            %range,
            logs = logs.len(),
            "fetched registration logs"
        );
        Ok(EventScan::new(logs.into_iter().map(decode_registration)))
    }
}
