//! Wallet CLI
//!
//! Command-line access to nonce resolution and transaction re-signing.

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wallet_core::api::{parse_tx_id, IndexerClient, NonceApi, RawTxApi, RpcClient};
use wallet_core::transactions::{RawTxCache, TxPipeline};
use wallet_core::validation::{not_current_address, validate_address, validate_password};
use wallet_core::wallet::{KeyStore, SecureWallet};
use wallet_core::{
    Config, Endpoints, Error, Network, NoncePoller, NonceTracker, RefreshTrigger, Result,
};

/// Environment variable holding the signing key
const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

#[derive(Parser)]
#[command(name = "wallet")]
#[command(about = "Nonce tracking and transaction re-signing for an EVM wallet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Network (mainnet, sepolia, localhost); overrides the config file
    #[arg(short, long, global = true)]
    network: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the next nonce for an account
    NextNonce {
        /// Account address
        address: String,

        /// Read nonce counts from the node instead of the indexer
        #[arg(long)]
        rpc: bool,

        /// Keep refreshing and print every change
        #[arg(short, long)]
        watch: bool,
    },

    /// Print the raw bytes of a transaction
    RawTx {
        /// Transaction hash
        tx_id: String,

        /// Fetch from the node instead of the indexer
        #[arg(long)]
        rpc: bool,
    },

    /// Re-sign a transaction with the key in PRIVATE_KEY
    SignRaw {
        /// Transaction hash
        tx_id: String,

        /// Fee per gas in wei (defaults to the transaction's own fee)
        #[arg(long)]
        fee: Option<u128>,

        /// Fetch from the node instead of the indexer
        #[arg(long)]
        rpc: bool,
    },

    /// Generate a new secret key
    GenerateKey,

    /// Check a recipient address
    ValidateAddress {
        address: String,

        /// Sender address; sending to it is rejected
        #[arg(long)]
        current: Option<String>,
    },

    /// Check password strength (reads the password from stdin)
    CheckPassword,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    let mut config = match cli.config {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    if let Some(name) = cli.network {
        config.network = Network::parse(&name)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown network: {}", name)))?;
    }

    match cli.command {
        Commands::NextNonce {
            address,
            rpc,
            watch,
        } => run_next_nonce(&config, &address, rpc, watch).await?,
        Commands::RawTx { tx_id, rpc } => run_raw_tx(&config, &tx_id, rpc).await?,
        Commands::SignRaw { tx_id, fee, rpc } => run_sign_raw(&config, &tx_id, fee, rpc).await?,
        Commands::GenerateKey => {
            let (wallet, secret) = SecureWallet::generate();
            println!("Address:     {}", wallet.address_string());
            println!("Private key: {}", secret.expose_secret());
            println!("Store the private key safely. It is not shown again.");
        }
        Commands::ValidateAddress { address, current } => {
            let parsed = validate_address(&address)?;
            if let Some(current) = current {
                not_current_address(&address, validate_address(&current)?)?;
            }
            println!("{} is valid", parsed.to_checksum(None));
        }
        Commands::CheckPassword => run_check_password()?,
        Commands::Config => {
            let rendered =
                serde_json::to_string_pretty(&config).map_err(|e| Error::Config(e.to_string()))?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn indexer(config: &Config, endpoints: &Endpoints) -> Result<IndexerClient> {
    IndexerClient::from_endpoints(endpoints, config.request_timeout())
}

fn raw_tx_source(config: &Config, endpoints: &Endpoints, rpc: bool) -> Result<Arc<dyn RawTxApi>> {
    if rpc {
        Ok(Arc::new(RpcClient::new(endpoints.rpc_url.clone())))
    } else {
        Ok(Arc::new(indexer(config, endpoints)?))
    }
}

async fn run_next_nonce(config: &Config, address: &str, rpc: bool, watch: bool) -> Result<()> {
    let address = validate_address(address)?;
    let endpoints = Endpoints::resolve(config)?;
    let mempool = Arc::new(indexer(config, &endpoints)?);

    let nonces: Arc<dyn NonceApi> = if rpc {
        Arc::new(RpcClient::new(endpoints.rpc_url.clone()))
    } else {
        mempool.clone()
    };

    let tracker = Arc::new(NonceTracker::new(address, nonces, mempool));

    if !watch {
        let nonce = tracker.refresh(RefreshTrigger::Manual).await?;
        println!("{}", nonce);
        return Ok(());
    }

    tracing::info!(
        address = %address,
        network = config.network.name(),
        "Watching account nonce"
    );

    let mut updates = tracker.subscribe();
    let poller = NoncePoller::spawn(tracker.clone(), config.nonce_refresh.clone());

    loop {
        tokio::select! {
            update = updates.changed() => match update {
                Some(nonce) => println!("{}", nonce),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.shutdown().await;
    Ok(())
}

async fn run_raw_tx(config: &Config, tx_id: &str, rpc: bool) -> Result<()> {
    let id = parse_tx_id(tx_id)?;
    let endpoints = Endpoints::resolve(config)?;
    let source = raw_tx_source(config, &endpoints, rpc)?;

    let bytes = source.raw_transaction(id).await?;
    println!("{}", bytes);
    Ok(())
}

async fn run_sign_raw(config: &Config, tx_id: &str, fee: Option<u128>, rpc: bool) -> Result<()> {
    let id = parse_tx_id(tx_id)?;
    let endpoints = Endpoints::resolve(config)?;
    let source = raw_tx_source(config, &endpoints, rpc)?;

    let wallet = SecureWallet::from_env(PRIVATE_KEY_ENV)?;
    tracing::info!(address = %wallet.address(), "Loaded wallet from {}", PRIVATE_KEY_ENV);

    let cache = Arc::new(RawTxCache::new(source, config.raw_tx_cache.capacity));
    let pipeline = TxPipeline::new(cache, Arc::new(KeyStore::unlocked(wallet)));
    pipeline.set_raw_tx_id(Some(id));
    pipeline.set_fee(fee);

    let original = pipeline
        .deserialized()
        .await?
        .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))?;
    let signed = pipeline
        .signed()
        .await?
        .ok_or_else(|| Error::Wallet("No active key".to_string()))?;

    if let Some(chain_id) = original.tx.chain_id() {
        if chain_id != config.network.chain_id() {
            tracing::warn!(
                chain_id,
                network = config.network.name(),
                expected = config.network.chain_id(),
                "Transaction targets a different chain than the configured network"
            );
        }
    }

    if original.sender != signed.recover_signer()? {
        tracing::warn!(
            original_sender = %original.sender,
            "Re-signing with a different account; the nonce may not match"
        );
    }

    println!("Nonce:       {}", signed.nonce());
    println!("Fee per gas: {}", signed.fee_per_gas());
    println!("Raw length:  {}", pipeline.byte_length().await?);
    println!("Tx hash:     {}", signed.tx_hash());
    println!("Signed tx:   {}", signed.encoded_hex());
    Ok(())
}

fn run_check_password() -> Result<()> {
    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;

    let result = validate_password(password.trim_end_matches(['\r', '\n']));
    let rendered =
        serde_json::to_string_pretty(&result).map_err(|e| Error::InvalidArgument(e.to_string()))?;
    println!("{}", rendered);

    if !result.meets_all_strength_requirements {
        return Err(Error::InvalidArgument("Password is too weak".to_string()));
    }
    Ok(())
}
