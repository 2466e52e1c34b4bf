//! trinary: ternary proof of work, signatures and bundle mining from the
//! command line.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use trinary_crypto::SpongeKind;
use trinary_types::SecurityLevel;
use trinary_utils::{init_logging, LogFormat};

use crate::commands::{MineArgs, Report};
use crate::config::EngineConfig;

#[derive(Parser)]
#[command(name = "trinary", version, about = "Ternary proof of work, signatures and bundle mining")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, global = true, env = "TRINARY_CONFIG")]
    config: Option<PathBuf>,

    /// Search threads (0 = all cores).
    #[arg(long, global = true, env = "TRINARY_WORKERS")]
    workers: Option<usize>,

    /// Log filter: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "TRINARY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "TRINARY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find a proof-of-work nonce for one transaction (2673 trytes).
    Pow {
        trytes: String,
        #[arg(long, env = "TRINARY_MWM")]
        mwm: Option<usize>,
    },

    /// Attach a bundle: chain trunk/branch and find every nonce.
    PowBundle {
        /// Transactions in index order.
        #[arg(required = true)]
        trytes: Vec<String>,
        #[arg(long)]
        trunk: String,
        #[arg(long)]
        branch: String,
        #[arg(long, env = "TRINARY_MWM")]
        mwm: Option<usize>,
    },

    /// Derive the address at `index`.
    Address {
        #[arg(env = "TRINARY_SEED", hide_env_values = true)]
        seed: String,
        index: u64,
        #[arg(long)]
        security: Option<u8>,
        /// Key derivation sponge: kerl, curl-p-27 or curl-p-81.
        #[arg(long)]
        sponge: Option<SpongeKind>,
    },

    /// Sign a bundle hash with the key at `index`.
    Sign {
        #[arg(env = "TRINARY_SEED", hide_env_values = true)]
        seed: String,
        index: u64,
        bundle: String,
        #[arg(long)]
        security: Option<u8>,
        #[arg(long)]
        sponge: Option<SpongeKind>,
    },

    /// Curl-P-81 hash of a transaction.
    Digest { trytes: String },

    /// Search the obsolete tag for a bundle hash that exposes fewer key
    /// segments.
    Mine {
        /// Bundle essence trytes (162 per transaction).
        essence: String,
        /// Running maximum of normalized digits already exposed, as 81 trytes.
        #[arg(long)]
        max: Option<String>,
        /// Bundle hashes already signed with this key.
        #[arg(long)]
        signed: Vec<String>,
        #[arg(long)]
        security: Option<u8>,
        #[arg(long)]
        iterations: Option<u64>,
        #[arg(long)]
        threshold: Option<u32>,
        #[arg(long)]
        fully_secure: bool,
    },

    /// Generate a random seed.
    Seed,
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    config.validate()?;
    Ok(config)
}

fn security(flag: Option<u8>, config: &EngineConfig) -> anyhow::Result<SecurityLevel> {
    match flag {
        Some(level) => SecurityLevel::try_from(level).context("--security"),
        None => Ok(config.security),
    }
}

async fn run(command: Command, config: &EngineConfig) -> anyhow::Result<Report> {
    match command {
        Command::Pow { trytes, mwm } => {
            let mwm = mwm.unwrap_or(config.min_weight_magnitude);
            commands::pow(config, &trytes, mwm).await
        }
        Command::PowBundle {
            trytes,
            trunk,
            branch,
            mwm,
        } => {
            let mwm = mwm.unwrap_or(config.min_weight_magnitude);
            commands::pow_bundle(config, &trytes, &trunk, &branch, mwm).await
        }
        Command::Address {
            seed,
            index,
            security: level,
            sponge,
        } => commands::address(
            &seed,
            index,
            security(level, config)?,
            sponge.unwrap_or(config.key_sponge),
        ),
        Command::Sign {
            seed,
            index,
            bundle,
            security: level,
            sponge,
        } => commands::sign(
            &seed,
            index,
            &bundle,
            security(level, config)?,
            sponge.unwrap_or(config.key_sponge),
        ),
        Command::Digest { trytes } => commands::digest(&trytes),
        Command::Mine {
            essence,
            max,
            signed,
            security: level,
            iterations,
            threshold,
            fully_secure,
        } => {
            let args = MineArgs {
                essence: &essence,
                max: max.as_deref(),
                signed: &signed,
                security: security(level, config)?,
                iterations: iterations.unwrap_or(config.mining_iterations),
                threshold: threshold.unwrap_or(config.mining_threshold),
                fully_secure: fully_secure || config.fully_secure,
            };
            commands::mine(config, args).await
        }
        Command::Seed => commands::seed(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level)?;
    tracing::debug!(workers = config.workers, sponge = %config.key_sponge, "configuration loaded");

    let json = cli.json;
    let report = run(cli.command, &config).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report.json)?);
    } else {
        println!("{}", report.text);
    }
    Ok(())
}
