use std::sync::Arc;

use anyhow::Context;
use chainfetch_crypto::KeysetHasher;
use chainfetch_ledger::SequencerInboxClient;
use chainfetch_resolver::ChainFetchStore;
use chainfetch_store::{DirectoryKeysetStore, InMemoryKeysetStore, KeysetStore, StoreError};
use chainfetch_types::{KeysetHash, RequestContext};
use colored::Colorize;

use crate::cli::*;
use crate::config::ChainFetchConfig;

type DynKeysetStore = dyn KeysetStore<Error = StoreError>;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = ChainFetchConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Resolve(args) => {
            config.apply_overrides(&args);
            cmd_resolve(&config, args, cli.format).await
        }
        Command::Hash(args) => cmd_hash(args, cli.format),
        Command::Config(_) => cmd_config(&config, cli.format),
    }
}

async fn open_store(config: &ChainFetchConfig) -> anyhow::Result<Arc<DynKeysetStore>> {
    match &config.store_dir {
        Some(dir) => {
            let store = DirectoryKeysetStore::open(dir)
                .await
                .with_context(|| format!("opening keyset store {}", dir.display()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryKeysetStore::new())),
    }
}

async fn cmd_resolve(
    config: &ChainFetchConfig,
    args: ResolveArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let hash: KeysetHash = args.hash.parse().context("parsing keyset hash")?;
    let ledger = SequencerInboxClient::connect(&config.ledger_config()?)?;
    let store = open_store(config).await?;
    let resolver = ChainFetchStore::new(store, Arc::new(ledger));

    let (ctx, cancel) = RequestContext::cancellable();
    let ctx = ctx.child_with_timeout(config.request_timeout());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling request");
            cancel.cancel();
        }
    });

    let keyset = if args.ledger_only {
        resolver.resolve_from_ledger(&ctx, &hash).await
    } else {
        resolver.resolve(&ctx, &hash).await
    }
    .with_context(|| format!("resolving keyset {hash}"))?;

    if let Some(out) = &args.out {
        tokio::fs::write(out, &keyset)
            .await
            .with_context(|| format!("writing {}", out.display()))?;
    }

    match format {
        OutputFormat::Json => {
            let mut value = serde_json::json!({
                "hash": format!("0x{hash}"),
                "length": keyset.len(),
            });
            match &args.out {
                Some(out) => value["out"] = out.display().to_string().into(),
                None => value["keyset"] = format!("0x{}", hex::encode(&keyset)).into(),
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => match &args.out {
            Some(out) => println!(
                "{} Keyset {} ({} bytes) written to {}",
                "✓".green().bold(),
                hash.short_hex().yellow(),
                keyset.len(),
                out.display().to_string().bold()
            ),
            None => println!("0x{}", hex::encode(&keyset)),
        },
    }
    Ok(())
}

fn cmd_hash(args: HashArgs, format: OutputFormat) -> anyhow::Result<()> {
    let data = std::fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let hash = KeysetHasher::hash(&data);
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "file": args.file.display().to_string(),
                "hash": format!("0x{hash}"),
                "length": data.len(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => println!("0x{}  {}", hash, args.file.display()),
    }
    Ok(())
}

fn cmd_config(config: &ChainFetchConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", toml::to_string(config)?),
    }
    Ok(())
}
