//! Subcommand implementations. Inputs are parsed and validated before any
//! search is spawned; searches run on the blocking pool and are cancelled on
//! Ctrl-C.

use anyhow::{anyhow, Context};
use serde_json::json;
use tracing::{info, warn};

use trinary_crypto::{
    bundle_hash, digest_trytes, generate_seed, normalize, KeyEngine, NormalizedBundle, SpongeKind,
};
use trinary_miner::{apply_index, normalized_max, spawn_mine, MiningRequest};
use trinary_types::{
    trits_from_trytes, tryte_value, trytes_from_trits, SecurityLevel, Seed, Transaction, TritHash,
    SEGMENTS_PER_FRAGMENT,
};
use trinary_utils::SearchHandle;
use trinary_work::PowSearcher;

use crate::config::EngineConfig;

/// What a command prints: plain text by default, JSON with `--json`.
pub struct Report {
    pub text: String,
    pub json: serde_json::Value,
}

impl Report {
    fn new(text: impl Into<String>, json: serde_json::Value) -> Self {
        Self {
            text: text.into(),
            json,
        }
    }
}

/// Await a search, cancelling it if the process is interrupted.
async fn until_interrupted<T, E>(handle: SearchHandle<Result<T, E>>) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let token = handle.token().clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received SIGINT, cancelling search");
            token.cancel();
        }
    });
    let joined = handle.join().await;
    watcher.abort();
    Ok(joined.context("search task failed")??)
}

pub async fn pow(config: &EngineConfig, trytes: &str, mwm: usize) -> anyhow::Result<Report> {
    let transaction = Transaction::from_trytes(trytes)?;
    let searcher = PowSearcher::new(config.workers);
    let nonce = until_interrupted(searcher.spawn(transaction.into_trits(), mwm)).await?;
    let nonce = nonce.to_trytes();
    Ok(Report::new(nonce.clone(), json!({ "nonce": nonce, "mwm": mwm })))
}

pub async fn pow_bundle(
    config: &EngineConfig,
    trytes: &[String],
    trunk: &str,
    branch: &str,
    mwm: usize,
) -> anyhow::Result<Report> {
    let transactions = trytes
        .iter()
        .enumerate()
        .map(|(i, t)| Transaction::from_trytes(t).with_context(|| format!("transaction {i}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let trunk = TritHash::from_trytes(trunk).context("trunk")?;
    let branch = TritHash::from_trytes(branch).context("branch")?;

    let searcher = PowSearcher::new(config.workers);
    let attached =
        until_interrupted(searcher.spawn_bundle(transactions, trunk, branch, mwm)).await?;

    let trytes: Vec<String> = attached
        .iter()
        .map(|a| a.transaction.to_trytes())
        .collect();
    let json = json!(attached
        .iter()
        .map(|a| json!({
            "hash": a.hash.to_trytes(),
            "nonce": a.nonce.to_trytes(),
            "trytes": a.transaction.to_trytes(),
        }))
        .collect::<Vec<_>>());
    Ok(Report::new(trytes.join("\n"), json))
}

pub fn address(
    seed: &str,
    index: u64,
    security: SecurityLevel,
    sponge: SpongeKind,
) -> anyhow::Result<Report> {
    let engine = KeyEngine::new(sponge);
    let address = engine.generate_address_trytes(seed, index, security)?;
    info!(index, %security, sponge = %sponge, "derived address");
    Ok(Report::new(
        address.clone(),
        json!({ "address": address, "index": index, "security": u8::from(security) }),
    ))
}

pub fn sign(
    seed: &str,
    index: u64,
    bundle: &str,
    security: SecurityLevel,
    sponge: SpongeKind,
) -> anyhow::Result<Report> {
    let engine = KeyEngine::new(sponge);
    let signature = engine.generate_signature_trytes(seed, index, security, bundle)?;
    let normalized = normalize(&TritHash::from_trytes(bundle)?);
    let weak = normalized.count_max_digits(security.fragments() * SEGMENTS_PER_FRAGMENT);
    if weak > 0 {
        warn!(weak, "bundle hash exposes unhashed key segments; consider mining it");
    }
    Ok(Report::new(
        signature.clone(),
        json!({ "signature": signature, "weak_digits": weak }),
    ))
}

pub fn digest(trytes: &str) -> anyhow::Result<Report> {
    let hash = digest_trytes(trytes)?;
    Ok(Report::new(hash.clone(), json!({ "hash": hash })))
}

pub fn seed() -> anyhow::Result<Report> {
    let seed: Seed = generate_seed()?;
    let trytes = trytes_from_trits(seed.as_trits())?;
    Ok(Report::new(trytes.clone(), json!({ "seed": trytes })))
}

/// Decode 81 trytes read as normalized digits (`9` = 0, `M` = 13, `N` = -13).
fn parse_normalized(trytes: &str) -> anyhow::Result<NormalizedBundle> {
    let digits = trytes
        .chars()
        .enumerate()
        .map(|(position, ch)| {
            tryte_value(ch).ok_or_else(|| anyhow!("invalid tryte {ch:?} at position {position}"))
        })
        .collect::<anyhow::Result<Vec<i8>>>()?;
    Ok(NormalizedBundle::from_digits(&digits)?)
}

pub struct MineArgs<'a> {
    pub essence: &'a str,
    pub max: Option<&'a str>,
    pub signed: &'a [String],
    pub security: SecurityLevel,
    pub iterations: u64,
    pub threshold: u32,
    pub fully_secure: bool,
}

pub async fn mine(config: &EngineConfig, args: MineArgs<'_>) -> anyhow::Result<Report> {
    let essence = trits_from_trytes(args.essence).context("essence")?;
    let signed = args
        .signed
        .iter()
        .map(|h| TritHash::from_trytes(h))
        .collect::<Result<Vec<_>, _>>()
        .context("signed bundle hash")?;
    let mut max = normalized_max(&signed);
    if let Some(trytes) = args.max {
        max = max.max(&parse_normalized(trytes).context("normalized max")?);
    }

    let request = MiningRequest {
        bundle_normalized_max: max,
        security: args.security,
        essence: essence.clone(),
        iterations: args.iterations,
        workers: config.workers,
        threshold: args.threshold,
        fully_secure: args.fully_secure,
    };
    let outcome = until_interrupted(spawn_mine(request)).await?;

    let mut mined = essence;
    apply_index(&mut mined, outcome.index)?;
    let hash = bundle_hash(&mined)?.to_trytes();
    let text = format!(
        "index {} weak_digits {} exposure {}{}\n{}",
        outcome.index,
        outcome.score.weak_digits,
        outcome.score.exposure,
        if outcome.satisfied { "" } else { " (threshold not met)" },
        hash
    );
    Ok(Report::new(
        text,
        json!({
            "outcome": outcome,
            "bundle_hash": hash,
            "essence": trytes_from_trits(&mined)?,
        }),
    ))
}
