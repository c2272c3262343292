use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use chainfetch_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

use crate::cli::ResolveArgs;

pub const DEFAULT_CONFIG_FILE: &str = "chainfetch.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainFetchConfig {
    pub rpc_url: Option<String>,
    pub sequencer_inbox: Option<String>,
    pub store_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for ChainFetchConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            sequencer_inbox: None,
            store_dir: None,
            request_timeout_secs: 30,
        }
    }
}

impl ChainFetchConfig {
    /// Load `path`, or `chainfetch.toml` in the working directory if it
    /// exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Command-line flags take precedence over file values.
    pub fn apply_overrides(&mut self, args: &ResolveArgs) {
        if let Some(url) = &args.rpc_url {
            self.rpc_url = Some(url.clone());
        }
        if let Some(inbox) = &args.inbox {
            self.sequencer_inbox = Some(inbox.clone());
        }
        if let Some(dir) = &args.store_dir {
            self.store_dir = Some(dir.clone());
        }
        if let Some(secs) = args.timeout {
            self.request_timeout_secs = secs;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn ledger_config(&self) -> anyhow::Result<LedgerConfig> {
        let Some(rpc_url) = &self.rpc_url else {
            bail!("no ledger RPC URL configured (use --rpc-url or rpc_url in the config file)");
        };
        let Some(inbox) = &self.sequencer_inbox else {
            bail!("no sequencer inbox configured (use --inbox or sequencer_inbox in the config file)");
        };
        Ok(LedgerConfig::new(rpc_url.clone(), inbox.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ChainFetchConfig::default();
        assert_eq!(c.request_timeout(), Duration::from_secs(30));
        assert!(c.rpc_url.is_none());
        assert!(c.store_dir.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chainfetch.toml");
        std::fs::write(&path, "rpc_url = \"http://node:8545\"\n").unwrap();

        let c = ChainFetchConfig::load(Some(&path)).unwrap();
        assert_eq!(c.rpc_url.as_deref(), Some("http://node:8545"));
        assert_eq!(c.request_timeout_secs, 30);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ChainFetchConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn flags_override_file() {
        let mut c = ChainFetchConfig {
            rpc_url: Some("http://file".into()),
            sequencer_inbox: Some("0x01".into()),
            store_dir: None,
            request_timeout_secs: 10,
        };
        let args = ResolveArgs {
            hash: String::new(),
            rpc_url: Some("http://flag".into()),
            timeout: Some(3),
            store_dir: Some(PathBuf::from("/tmp/keysets")),
            ..ResolveArgs::default()
        };
        c.apply_overrides(&args);
        assert_eq!(c.rpc_url.as_deref(), Some("http://flag"));
        assert_eq!(c.sequencer_inbox.as_deref(), Some("0x01"));
        assert_eq!(c.store_dir, Some(PathBuf::from("/tmp/keysets")));
        assert_eq!(c.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn ledger_config_requires_both_fields() {
        let mut c = ChainFetchConfig::default();
        assert!(c.ledger_config().is_err());
        c.rpc_url = Some("http://node".into());
        assert!(c.ledger_config().is_err());
        c.sequencer_inbox = Some("0xabc".into());
        let ledger = c.ledger_config().unwrap();
        assert_eq!(ledger, LedgerConfig::new("http://node", "0xabc"));
    }

    #[test]
    fn serializes_to_toml() {
        let c = ChainFetchConfig::default();
        let text = toml::to_string(&c).unwrap();
        assert!(text.contains("request_timeout_secs = 30"));
    }
}
