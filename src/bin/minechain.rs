#![forbid(unsafe_code)]
//! MineChain CLI: generate keys and mine blocks into an in-memory chain.

use clap::{Parser, Subcommand};
use crossbeam_channel::{after, bounded, select};
use minechain::blockchain::{validate_mined_chain, validate_signed_chain, Block, Blockchain};
use minechain::config::{load_config, DEFAULT_CONFIG_PATH};
use minechain::crypto::{PrivateKey, Secp256k1Signer, Signer};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generates a private key and prints it with its public key
    Keygen,
    /// Mines blocks into a fresh in-memory chain and validates the result
    Mine {
        /// Hex-encoded private key of the miner (a fresh one if omitted)
        #[arg(long)]
        key: Option<String>,
        /// Number of blocks to mine
        #[arg(long, default_value_t = 1)]
        blocks: usize,
        /// Path to the TOML configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Overrides chain.difficulty
        #[arg(long)]
        difficulty: Option<usize>,
        /// Overrides chain.reward
        #[arg(long)]
        reward: Option<i64>,
        /// Overrides miner.timeout_secs
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Print the mined chain as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Mine {
            key,
            blocks,
            config,
            difficulty,
            reward,
            timeout_secs,
            json,
        } => {
            let mut config = load_config(&config)?;
            if let Some(difficulty) = difficulty {
                config.chain.difficulty = difficulty;
            }
            if let Some(reward) = reward {
                config.chain.reward = reward;
            }
            if timeout_secs.is_some() {
                config.miner.timeout_secs = timeout_secs;
            }

            let key = match key {
                Some(hex) => PrivateKey::from_hex(&hex)?,
                None => PrivateKey::generate(),
            };
            let mut chain = Blockchain::from_config(Secp256k1Signer, &config.chain)?;
            mine(&mut chain, &key, blocks, config.miner.timeout())?;
            report(&chain, &key, json)
        }
    }
}

fn keygen() -> Result<(), Box<dyn std::error::Error>> {
    let key = PrivateKey::generate();
    println!("private key: {}", key.to_hex());
    println!("public key:  {}", Secp256k1Signer.public_key(&key));
    Ok(())
}

fn mine(
    chain: &mut Blockchain,
    key: &PrivateKey,
    blocks: usize,
    timeout: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 0..blocks {
        let start = Instant::now();
        let block = match timeout {
            None => chain.mine(key).clone(),
            Some(timeout) => match mine_with_deadline(chain, key, timeout) {
                Some(block) => block,
                None => {
                    warn!(?timeout, height = chain.height() + 1, "mining deadline exceeded");
                    return Err(format!(
                        "no nonce found for block {} within {:?}",
                        chain.height() + 1,
                        timeout
                    )
                    .into());
                }
            },
        };

        println!(
            "block #{:<4} nonce {:<10} {:>8.3}s  {}",
            chain.height(),
            block.nonce,
            start.elapsed().as_secs_f64(),
            block.hash.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}

/// Mines one block, raising the cancellation flag if `timeout` elapses first.
fn mine_with_deadline(chain: &mut Blockchain, key: &PrivateKey, timeout: Duration) -> Option<Block> {
    let cancel = AtomicBool::new(false);
    let (done_tx, done_rx) = bounded::<()>(1);

    thread::scope(|scope| {
        scope.spawn(|| {
            select! {
                recv(done_rx) -> _ => {}
                recv(after(timeout)) -> _ => cancel.store(true, Ordering::Relaxed),
            }
        });

        let mined = chain.mine_cancellable(key, &cancel).cloned();
        let _ = done_tx.send(());
        mined
    })
}

fn report(chain: &Blockchain, key: &PrivateKey, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let miner = chain.signer().public_key(key);

    println!();
    println!("height:      {}", chain.height());
    println!("difficulty:  {}", chain.difficulty());
    println!("reward:      {}", chain.reward());
    println!("miner:       {}", miner);
    println!("balance:     {}", chain.balance_of(&miner));
    println!("mining:      {}", verdict(validate_mined_chain(chain)));
    println!("integrity:   {}", verdict(validate_signed_chain(chain)));

    if json {
        println!("{}", serde_json::to_string_pretty(chain.blocks())?);
    }
    Ok(())
}

fn verdict<E: std::fmt::Display>(result: Result<(), E>) -> String {
    match result {
        Ok(()) => "valid".to_string(),
        Err(e) => format!("invalid ({})", e),
    }
}
