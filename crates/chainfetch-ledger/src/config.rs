use serde::{Deserialize, Serialize};

/// Where to read keyset registrations from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the ledger node.
    pub rpc_url: String,
    /// Address of the sequencer inbox contract, `0x`-prefixed hex.
    pub sequencer_inbox: String,
}

impl LedgerConfig {
    pub fn new(rpc_url: impl Into<String>, sequencer_inbox: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            sequencer_inbox: sequencer_inbox.into(),
        }
    }
}
