//! Multi-threaded nonce search.
//!
//! The first 32 chunks of a transaction never change while the nonce is
//! searched, so they are absorbed once into a Curl-P-81 mid-state. Each worker
//! then owns a partition of the nonce space and evaluates 64 candidates per
//! transform with [`SlicedCurl`].
//!
//! Nonce layout:
//! - trits `0..4`: lane index (one candidate per bit lane)
//! - trits `4..27`: worker offset (disjoint partition per worker)
//! - trits `27..81`: batch counter

use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use trinary_crypto::curl::{Curl, CurlRounds};
use trinary_crypto::Sponge;
use trinary_types::{
    increment, layout, trits_from_trytes, trits_from_value, validate_trits, Nonce, TernaryError,
    Trit, HASH_TRITS, NONCE_TRITS, TRANSACTION_TRITS, TRANSACTION_TRYTES,
};
use trinary_utils::{
    format_duration, panic_message, per_second, spawn_search, CancelToken, ChildToken,
    SearchHandle,
};

use crate::sliced::{SlicedCurl, LANES};
use crate::WorkError;

/// Largest accepted minimum weight magnitude.
pub const MAX_MIN_WEIGHT_MAGNITUDE: usize = 81;

const LANE_TRITS: Range<usize> = 0..4;
const OFFSET_TRITS: Range<usize> = 4..27;
const COUNTER_TRITS: Range<usize> = 27..NONCE_TRITS;

/// Start of the last absorbed chunk (tag through nonce).
const TAIL_START: usize = layout::TAG.start;

/// Position of the nonce within the last chunk.
const NONCE_IN_TAIL: usize = layout::NONCE.start - TAIL_START;

pub(crate) fn check_mwm(mwm: usize) -> Result<(), WorkError> {
    if mwm > MAX_MIN_WEIGHT_MAGNITUDE {
        return Err(TernaryError::InvalidParameter(format!(
            "minimum weight magnitude {mwm} exceeds {MAX_MIN_WEIGHT_MAGNITUDE}"
        ))
        .into());
    }
    Ok(())
}

pub(crate) fn check_transaction(transaction: &[Trit]) -> Result<(), WorkError> {
    if transaction.len() != TRANSACTION_TRITS {
        return Err(TernaryError::length(TRANSACTION_TRITS, transaction.len()).into());
    }
    validate_trits(transaction)?;
    Ok(())
}

/// Mid-state with the tail written in and the lane trits of the nonce fixed.
fn sliced_template(transaction: &[Trit]) -> Result<SlicedCurl, WorkError> {
    let mut curl = Curl::new(CurlRounds::P81);
    curl.absorb(&transaction[..TAIL_START])?;

    let mut sliced = SlicedCurl::broadcast(curl.state());
    for (i, &trit) in transaction[TAIL_START..].iter().enumerate() {
        sliced.set(i, trit);
    }

    let mut lane_trits = [0 as Trit; LANE_TRITS.end];
    for lane in 0..LANES {
        trits_from_value(lane_value(lane), &mut lane_trits);
        for (k, &trit) in lane_trits.iter().enumerate() {
            sliced.set_lane(NONCE_IN_TAIL + LANE_TRITS.start + k, lane, trit);
        }
    }
    Ok(sliced)
}

fn lane_value(lane: usize) -> i64 {
    lane as i64 - (LANES as i64 / 2)
}

struct Shared<'a> {
    template: &'a SlicedCurl,
    mwm: usize,
    stop: &'a ChildToken,
    found: &'a OnceLock<Nonce>,
    batches: &'a AtomicU64,
}

fn run_worker(shared: &Shared<'_>, worker: usize) {
    let mut base = shared.template.clone();
    let mut offset = [0 as Trit; OFFSET_TRITS.end - OFFSET_TRITS.start];
    trits_from_value(worker as i64, &mut offset);
    for (k, &trit) in offset.iter().enumerate() {
        base.set(NONCE_IN_TAIL + OFFSET_TRITS.start + k, trit);
    }

    let weight = HASH_TRITS - shared.mwm..HASH_TRITS;
    let mut counter = [0 as Trit; NONCE_TRITS - COUNTER_TRITS.start];
    let mut batches = 0u64;

    while !shared.stop.is_cancelled() && shared.found.get().is_none() {
        for (k, &trit) in counter.iter().enumerate() {
            base.set(NONCE_IN_TAIL + COUNTER_TRITS.start + k, trit);
        }
        let mut state = base.clone();
        state.transform(CurlRounds::P81.count());
        batches += 1;

        let lanes = state.zero_lanes(weight.clone());
        if lanes != 0 {
            let lane = lanes.trailing_zeros() as usize;
            let mut nonce = [0 as Trit; NONCE_TRITS];
            trits_from_value(lane_value(lane), &mut nonce[LANE_TRITS]);
            nonce[OFFSET_TRITS].copy_from_slice(&offset);
            nonce[COUNTER_TRITS].copy_from_slice(&counter);
            // Losing the race to another worker is fine: any valid nonce will do.
            let _ = shared.found.set(Nonce::new(nonce));
            break;
        }
        if increment(&mut counter) {
            break;
        }
    }
    shared.batches.fetch_add(batches, Ordering::Relaxed);
}

/// A found nonce and what it cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowOutcome {
    pub nonce: Nonce,
    /// Candidate nonces hashed across all workers, in whole 64-lane batches.
    pub attempts: u64,
}

/// Searches for nonces that give a transaction hash at least `mwm` trailing
/// zero trits.
///
/// `workers == 0` uses one thread per available core. Cancelling the token
/// stops every in-flight search at its next batch, including spawned ones.
/// Clones share the token.
#[derive(Clone, Debug, Default)]
pub struct PowSearcher {
    workers: usize,
    cancel: CancelToken,
}

impl PowSearcher {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    fn pool(&self) -> Result<rayon::ThreadPool, WorkError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("pow-worker-{i}"))
            .build()
            .map_err(|e| WorkError::Worker(e.to_string()))
    }

    /// Find a nonce for a full 8019-trit transaction.
    ///
    /// With `mwm == 0` the transaction's current nonce is returned unchanged.
    pub fn search(&self, transaction: &[Trit], mwm: usize) -> Result<Nonce, WorkError> {
        self.search_outcome(transaction, mwm).map(|outcome| outcome.nonce)
    }

    /// [`search`](Self::search), also reporting how many nonces were tried.
    pub fn search_outcome(
        &self,
        transaction: &[Trit],
        mwm: usize,
    ) -> Result<PowOutcome, WorkError> {
        self.search_scoped(transaction, mwm, &self.cancel.child())
    }

    /// Search until a nonce is found or `scope` is cancelled.
    pub(crate) fn search_scoped(
        &self,
        transaction: &[Trit],
        mwm: usize,
        scope: &ChildToken,
    ) -> Result<PowOutcome, WorkError> {
        check_transaction(transaction)?;
        check_mwm(mwm)?;
        if mwm == 0 {
            let mut nonce = [0 as Trit; NONCE_TRITS];
            nonce.copy_from_slice(&transaction[layout::NONCE]);
            return Ok(PowOutcome {
                nonce: Nonce::new(nonce),
                attempts: 0,
            });
        }
        if scope.is_cancelled() {
            return Err(WorkError::Cancelled);
        }

        let template = sliced_template(transaction)?;
        let pool = self.pool()?;
        let workers = pool.current_num_threads();
        debug!(mwm, workers, "starting proof-of-work search");

        let started = Instant::now();
        let found = OnceLock::new();
        let batches = AtomicU64::new(0);
        let shared = Shared {
            template: &template,
            mwm,
            stop: scope,
            found: &found,
            batches: &batches,
        };

        catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                (0..workers)
                    .into_par_iter()
                    .for_each(|worker| run_worker(&shared, worker))
            })
        }))
        .map_err(|panic| WorkError::Worker(panic_message(&*panic)))?;

        let elapsed = started.elapsed();
        let attempts = batches.load(Ordering::Relaxed) * LANES as u64;
        match found.into_inner() {
            Some(nonce) => {
                info!(
                    mwm,
                    attempts,
                    elapsed = %format_duration(elapsed),
                    rate = per_second(attempts, elapsed) as u64,
                    "proof-of-work found"
                );
                Ok(PowOutcome { nonce, attempts })
            }
            None if scope.is_cancelled() => {
                debug!(attempts, "proof-of-work search cancelled");
                Err(WorkError::Cancelled)
            }
            None => Err(WorkError::Worker(format!(
                "nonce space exhausted after {attempts} attempts"
            ))),
        }
    }

    /// Tryte front end for [`search`](Self::search): 2673 transaction trytes
    /// in, 27 nonce trytes out.
    pub fn pow_trytes(&self, trytes: &str, mwm: usize) -> Result<String, WorkError> {
        if trytes.len() != TRANSACTION_TRYTES {
            return Err(TernaryError::length(TRANSACTION_TRYTES, trytes.len()).into());
        }
        let trits = trits_from_trytes(trytes)?;
        Ok(self.search(&trits, mwm)?.to_trytes())
    }

    /// Run [`search`](Self::search) on the blocking pool. The handle's
    /// `cancel()` stops this search alone, which then resolves to
    /// `Cancelled`; the searcher and its clones stay usable.
    pub fn spawn(
        self,
        transaction: Vec<Trit>,
        mwm: usize,
    ) -> SearchHandle<Result<Nonce, WorkError>> {
        let scope = self.cancel.child();
        spawn_search(scope.handle(), move |_| {
            self.search_scoped(&transaction, mwm, &scope)
                .map(|outcome| outcome.nonce)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_pow;

    fn transaction(seed: usize) -> Vec<Trit> {
        (0..TRANSACTION_TRITS)
            .map(|i| ((i * 17 + seed * 5) % 3) as Trit - 1)
            .collect()
    }

    fn attach(mut transaction: Vec<Trit>, nonce: &Nonce) -> Vec<Trit> {
        transaction[layout::NONCE].copy_from_slice(nonce.as_trits());
        transaction
    }

    #[test]
    fn found_nonce_meets_weight() {
        let tx = transaction(1);
        let nonce = PowSearcher::new(2).search(&tx, 9).unwrap();
        assert!(validate_pow(&attach(tx, &nonce), 9));
    }

    #[test]
    fn outcome_counts_whole_batches() {
        let tx = transaction(7);
        let outcome = PowSearcher::new(1).search_outcome(&tx, 6).unwrap();
        assert!(outcome.attempts >= LANES as u64);
        assert_eq!(outcome.attempts % LANES as u64, 0);
        assert!(validate_pow(&attach(tx.clone(), &outcome.nonce), 6));

        let unchanged = PowSearcher::new(1).search_outcome(&tx, 0).unwrap();
        assert_eq!(unchanged.attempts, 0);
    }

    #[test]
    fn single_worker_search() {
        let tx = transaction(2);
        let nonce = PowSearcher::new(1).search(&tx, 7).unwrap();
        assert!(validate_pow(&attach(tx, &nonce), 7));
    }

    #[test]
    fn zero_weight_keeps_current_nonce() {
        let tx = transaction(3);
        let nonce = PowSearcher::new(1).search(&tx, 0).unwrap();
        assert_eq!(&nonce.as_trits()[..], &tx[layout::NONCE]);
    }

    #[test]
    fn weight_above_ceiling_is_rejected() {
        let err = PowSearcher::new(1)
            .search(&transaction(0), MAX_MIN_WEIGHT_MAGNITUDE + 1)
            .unwrap_err();
        assert!(matches!(
            err,
            WorkError::Ternary(TernaryError::InvalidParameter(_))
        ));
    }

    #[test]
    fn malformed_transactions_are_rejected() {
        let searcher = PowSearcher::new(1);
        assert!(matches!(
            searcher.search(&[0; 243], 1),
            Err(WorkError::Ternary(TernaryError::InvalidLength { .. }))
        ));
        let mut tx = transaction(0);
        tx[5] = 3;
        assert!(matches!(
            searcher.search(&tx, 1),
            Err(WorkError::Ternary(TernaryError::InvalidTrit { value: 3, .. }))
        ));
    }

    #[test]
    fn pre_cancelled_search_returns_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let searcher = PowSearcher::new(1).with_cancel_token(token);
        assert_eq!(
            searcher.search(&transaction(4), 20),
            Err(WorkError::Cancelled)
        );
    }

    #[test]
    fn lane_values_fit_the_lane_field() {
        let mut trits = [0 as Trit; 4];
        for lane in 0..LANES {
            trits_from_value(lane_value(lane), &mut trits);
            assert_eq!(
                trinary_types::value_from_trits(&trits).unwrap(),
                lane_value(lane)
            );
        }
    }

    #[test]
    fn pow_trytes_returns_27_trytes() {
        let trytes = "9".repeat(TRANSACTION_TRYTES);
        let nonce = PowSearcher::new(2).pow_trytes(&trytes, 5).unwrap();
        assert_eq!(nonce.len(), 27);
        let attached = format!("{}{}", &trytes[..TRANSACTION_TRYTES - 27], nonce);
        assert!(validate_pow(&trits_from_trytes(&attached).unwrap(), 5));
        assert!(PowSearcher::new(1).pow_trytes("ABC", 5).is_err());
    }

    #[tokio::test]
    async fn spawned_search_completes() {
        let tx = transaction(5);
        let handle = PowSearcher::new(2).spawn(tx.clone(), 6);
        let nonce = handle.join().await.unwrap().unwrap();
        assert!(validate_pow(&attach(tx, &nonce), 6));
    }

    #[tokio::test]
    async fn spawned_search_can_be_cancelled() {
        let handle = PowSearcher::new(1).spawn(transaction(6), MAX_MIN_WEIGHT_MAGNITUDE);
        handle.cancel();
        assert_eq!(handle.join().await.unwrap(), Err(WorkError::Cancelled));
    }

    #[tokio::test]
    async fn cancelled_spawn_leaves_the_searcher_usable() {
        let searcher = PowSearcher::new(1);
        let handle = searcher
            .clone()
            .spawn(transaction(8), MAX_MIN_WEIGHT_MAGNITUDE);
        handle.cancel();
        assert_eq!(handle.join().await.unwrap(), Err(WorkError::Cancelled));
        assert!(!searcher.cancel_token().is_cancelled());

        let tx = transaction(8);
        let nonce = searcher.search(&tx, 4).unwrap();
        assert!(validate_pow(&attach(tx, &nonce), 4));
    }

    #[tokio::test]
    async fn searcher_token_stops_spawned_searches() {
        let searcher = PowSearcher::new(1);
        let handle = searcher
            .clone()
            .spawn(transaction(9), MAX_MIN_WEIGHT_MAGNITUDE);
        searcher.cancel_token().cancel();
        assert_eq!(handle.join().await.unwrap(), Err(WorkError::Cancelled));
    }
}
