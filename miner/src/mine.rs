//! The parallel candidate search.
//!
//! Candidate `i` is the essence with `i` added into the first transaction's
//! obsolete tag. Workers scan interleaved blocks of indices in increasing
//! order. The outcome depends only on the request, never on the worker
//! count: the lowest satisfying index wins, otherwise the lowest
//! `(score, index)` pair.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use trinary_crypto::{normalize, Kerl, NormalizedBundle, Sponge};
use trinary_types::{
    add_assign_value, layout, validate_trits, SecurityLevel, TernaryError, Trit, ESSENCE_TRITS,
};
use trinary_utils::{
    format_duration, panic_message, per_second, spawn_search, CancelToken, ChildToken,
    SearchHandle,
};

use crate::score::{admissible, score, MiningScore};
use crate::MinerError;

/// Candidates per block handed to a worker between cancellation checks.
const BLOCK: u64 = 64;

/// Everything the miner needs to know about one bundle.
#[derive(Clone, Debug)]
pub struct MiningRequest {
    /// Per-position maximum of the normalized hashes already signed with the
    /// same key (see [`normalized_max`](crate::normalized_max)).
    pub bundle_normalized_max: NormalizedBundle,
    pub security: SecurityLevel,
    /// Bundle essence: 486 trits per transaction.
    pub essence: Vec<Trit>,
    /// Number of candidate indices to try, starting at 0.
    pub iterations: u64,
    /// Worker threads; 0 uses every core.
    pub workers: usize,
    /// Largest acceptable number of weak digits.
    pub threshold: u32,
    pub fully_secure: bool,
}

impl MiningRequest {
    fn validate(&self) -> Result<(), MinerError> {
        if self.essence.is_empty() || self.essence.len() % ESSENCE_TRITS != 0 {
            return Err(TernaryError::multiple_of(ESSENCE_TRITS, self.essence.len()).into());
        }
        validate_trits(&self.essence)?;
        if self.iterations == 0 || self.iterations > i64::MAX as u64 {
            return Err(TernaryError::InvalidParameter(format!(
                "iteration count {} outside 1..={}",
                self.iterations,
                i64::MAX
            ))
            .into());
        }
        Ok(())
    }
}

/// Result of a mining run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningOutcome {
    /// Candidate index to apply with [`apply_index`].
    pub index: u64,
    pub score: MiningScore,
    /// Whether `score.weak_digits` is within the threshold.
    pub satisfied: bool,
    /// Candidates hashed (may exceed the winning index when parallel).
    pub evaluated: u64,
}

impl MiningOutcome {
    /// Treat an unsatisfied outcome as an error.
    pub fn into_result(self) -> Result<Self, MinerError> {
        if self.satisfied {
            Ok(self)
        } else {
            Err(TernaryError::SearchExhausted {
                evaluated: self.evaluated,
            }
            .into())
        }
    }
}

/// Write candidate `index` into the essence (adds into the first
/// transaction's obsolete tag).
pub fn apply_index(essence: &mut [Trit], index: u64) -> Result<(), MinerError> {
    if essence.len() < ESSENCE_TRITS {
        return Err(TernaryError::multiple_of(ESSENCE_TRITS, essence.len()).into());
    }
    let value = i64::try_from(index).map_err(|_| {
        TernaryError::InvalidParameter(format!("candidate index {index} exceeds {}", i64::MAX))
    })?;
    add_assign_value(&mut essence[layout::ESSENCE_OBSOLETE_TAG], value);
    Ok(())
}

#[derive(Default)]
struct WorkerResult {
    best: Option<(MiningScore, u64)>,
    satisfying: Option<(u64, MiningScore)>,
    evaluated: u64,
    error: Option<MinerError>,
}

struct Shared<'a> {
    request: &'a MiningRequest,
    workers: u64,
    first_satisfying: &'a AtomicU64,
    /// Cancelled by the caller, or by a worker that hit an error.
    stop: &'a ChildToken,
}

fn run_worker(shared: &Shared<'_>, worker: u64) -> WorkerResult {
    let request = shared.request;
    let mut essence = request.essence.clone();
    let mut original_tag = [0 as Trit; 81];
    original_tag.copy_from_slice(&request.essence[layout::ESSENCE_OBSOLETE_TAG]);
    let mut kerl = Kerl::new();
    let mut result = WorkerResult::default();

    let mut block = worker;
    'blocks: loop {
        let start = block * BLOCK;
        if start >= request.iterations || shared.stop.is_cancelled() {
            break;
        }
        let end = (start + BLOCK).min(request.iterations);
        for index in start..end {
            if index > shared.first_satisfying.load(Ordering::Acquire) {
                break 'blocks;
            }
            essence[layout::ESSENCE_OBSOLETE_TAG].copy_from_slice(&original_tag);
            add_assign_value(&mut essence[layout::ESSENCE_OBSOLETE_TAG], index as i64);
            let hash = match kerl.hash(&essence) {
                Ok(hash) => hash,
                Err(err) => {
                    result.error = Some(err.into());
                    shared.stop.cancel();
                    break 'blocks;
                }
            };
            result.evaluated += 1;

            let candidate = normalize(&hash);
            if !admissible(&candidate, request.security, request.fully_secure) {
                continue;
            }
            let candidate_score = score(&request.bundle_normalized_max, &candidate, request.security);
            if result.best.map_or(true, |best| (candidate_score, index) < best) {
                result.best = Some((candidate_score, index));
            }
            if candidate_score.weak_digits <= request.threshold {
                shared.first_satisfying.fetch_min(index, Ordering::AcqRel);
                result.satisfying = Some((index, candidate_score));
                break 'blocks;
            }
        }
        block += shared.workers;
    }
    result
}

/// Mine with a caller-supplied cancellation token.
pub fn mine_with_cancel(
    request: &MiningRequest,
    cancel: &CancelToken,
) -> Result<MiningOutcome, MinerError> {
    request.validate()?;
    if cancel.is_cancelled() {
        return Err(MinerError::Cancelled);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(request.workers)
        .thread_name(|i| format!("miner-worker-{i}"))
        .build()
        .map_err(|e| MinerError::Worker(e.to_string()))?;
    let workers = pool.current_num_threads();
    debug!(
        iterations = request.iterations,
        workers,
        threshold = request.threshold,
        fully_secure = request.fully_secure,
        "starting bundle mining"
    );

    let started = Instant::now();
    let first_satisfying = AtomicU64::new(u64::MAX);
    let stop = cancel.child();
    let shared = Shared {
        request,
        workers: workers as u64,
        first_satisfying: &first_satisfying,
        stop: &stop,
    };
    let results: Vec<WorkerResult> = catch_unwind(AssertUnwindSafe(|| {
        pool.install(|| {
            (0..workers as u64)
                .into_par_iter()
                .map(|worker| run_worker(&shared, worker))
                .collect()
        })
    }))
    .map_err(|panic| MinerError::Worker(panic_message(&*panic)))?;

    let elapsed = started.elapsed();
    let outcome = merge(&results, cancel)?;
    let evaluated = outcome.evaluated;

    if outcome.satisfied {
        info!(
            index = outcome.index,
            weak_digits = outcome.score.weak_digits,
            evaluated,
            elapsed = %format_duration(elapsed),
            rate = per_second(evaluated, elapsed) as u64,
            "bundle mining satisfied"
        );
    } else {
        warn!(
            index = outcome.index,
            weak_digits = outcome.score.weak_digits,
            threshold = request.threshold,
            evaluated,
            "bundle mining exhausted without meeting the threshold"
        );
    }
    Ok(outcome)
}

/// Combine per-worker results. A worker error fails the whole run, ahead of
/// cancellation; otherwise the lowest satisfying index beats the best score.
fn merge(results: &[WorkerResult], cancel: &CancelToken) -> Result<MiningOutcome, MinerError> {
    if let Some(err) = results.iter().find_map(|r| r.error.clone()) {
        return Err(err);
    }
    if cancel.is_cancelled() {
        return Err(MinerError::Cancelled);
    }
    let evaluated = results.iter().map(|r| r.evaluated).sum();
    if let Some((index, score)) = results.iter().filter_map(|r| r.satisfying).min() {
        return Ok(MiningOutcome {
            index,
            score,
            satisfied: true,
            evaluated,
        });
    }
    let (score, index) = results
        .iter()
        .filter_map(|r| r.best)
        .min()
        .ok_or(TernaryError::SearchExhausted { evaluated })?;
    Ok(MiningOutcome {
        index,
        score,
        satisfied: false,
        evaluated,
    })
}

/// Search for the candidate index that best hardens the bundle.
pub fn mine(request: &MiningRequest) -> Result<MiningOutcome, MinerError> {
    mine_with_cancel(request, &CancelToken::new())
}

/// Run [`mine`] on the blocking pool behind a cancelable handle.
pub fn spawn_mine(request: MiningRequest) -> SearchHandle<Result<MiningOutcome, MinerError>> {
    spawn_search(CancelToken::new(), move |token| {
        mine_with_cancel(&request, &token)
    })
}
