use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chainfetch",
    about = "Resolve keysets by hash from a local store, verified against the ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (defaults to ./chainfetch.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve a keyset by its hash
    Resolve(ResolveArgs),
    /// Print the keyset hash of a file
    Hash(HashArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args, Default)]
pub struct ResolveArgs {
    /// Keyset hash, 64 hex characters with optional 0x prefix
    pub hash: String,
    /// Directory of locally stored keysets
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
    /// Ledger JSON-RPC endpoint
    #[arg(long)]
    pub rpc_url: Option<String>,
    /// Sequencer inbox contract address
    #[arg(long)]
    pub inbox: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Skip the local store and read the ledger directly
    #[arg(long)]
    pub ledger_only: bool,
    /// Write the keyset to this file instead of printing it
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct HashArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ConfigArgs {}
