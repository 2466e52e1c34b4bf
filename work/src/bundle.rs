//! Proof of work for a whole bundle.
//!
//! Transactions are attached from the last index down to index 0 so that each
//! one can reference the hash of its successor as its trunk.

use tracing::debug;

use trinary_crypto::transaction_hash;
use trinary_types::{Nonce, TernaryError, Transaction, TritHash};
use trinary_utils::{spawn_search, ChildToken, SearchHandle};

use crate::generator::{check_mwm, PowSearcher};
use crate::WorkError;

/// A transaction with trunk, branch and nonce filled in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachedTransaction {
    pub transaction: Transaction,
    pub hash: TritHash,
    pub nonce: Nonce,
}

impl PowSearcher {
    /// Attach every transaction of a bundle, given in index order.
    ///
    /// The last transaction references `(trunk, branch)`; every other one
    /// references its successor's hash as trunk and `trunk` as branch. The
    /// result is in the same order as the input.
    pub fn search_bundle(
        &self,
        transactions: &[Transaction],
        trunk: &TritHash,
        branch: &TritHash,
        mwm: usize,
    ) -> Result<Vec<AttachedTransaction>, WorkError> {
        self.search_bundle_scoped(transactions, trunk, branch, mwm, &self.cancel_token().child())
    }

    fn search_bundle_scoped(
        &self,
        transactions: &[Transaction],
        trunk: &TritHash,
        branch: &TritHash,
        mwm: usize,
        scope: &ChildToken,
    ) -> Result<Vec<AttachedTransaction>, WorkError> {
        check_mwm(mwm)?;
        if transactions.is_empty() {
            return Err(TernaryError::InvalidParameter("bundle has no transactions".into()).into());
        }

        let mut attached = Vec::with_capacity(transactions.len());
        let mut successor: Option<TritHash> = None;
        for (index, transaction) in transactions.iter().enumerate().rev() {
            let mut transaction = transaction.clone();
            match &successor {
                None => {
                    transaction.set_trunk(trunk);
                    transaction.set_branch(branch);
                }
                Some(next) => {
                    transaction.set_trunk(next);
                    transaction.set_branch(trunk);
                }
            }
            let nonce = self.search_scoped(transaction.as_trits(), mwm, scope)?.nonce;
            transaction.set_nonce(&nonce);
            let hash = transaction_hash(transaction.as_trits())?;
            debug!(index, hash = %hash, "attached bundle transaction");
            successor = Some(hash);
            attached.push(AttachedTransaction {
                transaction,
                hash,
                nonce,
            });
        }
        attached.reverse();
        Ok(attached)
    }

    /// Tryte front end for [`search_bundle`](Self::search_bundle); returns the
    /// attached transaction trytes in input order.
    pub fn pow_bundle_trytes<S: AsRef<str>>(
        &self,
        transactions: &[S],
        trunk: &str,
        branch: &str,
        mwm: usize,
    ) -> Result<Vec<String>, WorkError> {
        let transactions = transactions
            .iter()
            .map(|trytes| Transaction::from_trytes(trytes.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let trunk = TritHash::from_trytes(trunk)?;
        let branch = TritHash::from_trytes(branch)?;
        Ok(self
            .search_bundle(&transactions, &trunk, &branch, mwm)?
            .into_iter()
            .map(|attached| attached.transaction.to_trytes())
            .collect())
    }

    /// Run [`search_bundle`](Self::search_bundle) on the blocking pool. The
    /// handle cancels this bundle alone.
    pub fn spawn_bundle(
        self,
        transactions: Vec<Transaction>,
        trunk: TritHash,
        branch: TritHash,
        mwm: usize,
    ) -> SearchHandle<Result<Vec<AttachedTransaction>, WorkError>> {
        let scope = self.cancel_token().child();
        spawn_search(scope.handle(), move |_| {
            self.search_bundle_scoped(&transactions, &trunk, &branch, mwm, &scope)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_pow;
    use trinary_types::{layout, Trit, HASH_TRITS, TRANSACTION_TRITS, TRANSACTION_TRYTES};

    fn bundle(len: usize) -> Vec<Transaction> {
        (0..len)
            .map(|n| {
                let trits = (0..TRANSACTION_TRITS)
                    .map(|i| ((i * 7 + n * 13) % 3) as Trit - 1)
                    .collect();
                Transaction::from_trits(trits).unwrap()
            })
            .collect()
    }

    fn hash(fill: Trit) -> TritHash {
        TritHash::new([fill; HASH_TRITS])
    }

    #[test]
    fn bundle_is_chained_from_the_tail() {
        let trunk = hash(1);
        let branch = hash(-1);
        let attached = PowSearcher::new(2)
            .search_bundle(&bundle(3), &trunk, &branch, 5)
            .unwrap();

        assert_eq!(attached.len(), 3);
        assert_eq!(attached[2].transaction.trunk(), trunk);
        assert_eq!(attached[2].transaction.branch(), branch);
        for i in 0..2 {
            assert_eq!(attached[i].transaction.trunk(), attached[i + 1].hash);
            assert_eq!(attached[i].transaction.branch(), trunk);
        }
        for tx in &attached {
            assert!(validate_pow(tx.transaction.as_trits(), 5));
            assert_eq!(tx.transaction.nonce(), tx.nonce);
            assert_eq!(transaction_hash(tx.transaction.as_trits()).unwrap(), tx.hash);
        }
    }

    #[test]
    fn other_fields_are_preserved() {
        let input = bundle(2);
        let attached = PowSearcher::new(1)
            .search_bundle(&input, &hash(0), &hash(1), 3)
            .unwrap();
        for (before, after) in input.iter().zip(&attached) {
            assert_eq!(
                before.field(layout::SIGNATURE.start..layout::TRUNK.start),
                after.transaction.field(layout::SIGNATURE.start..layout::TRUNK.start)
            );
            assert_eq!(
                before.field(layout::TAG.start..layout::NONCE.start),
                after.transaction.field(layout::TAG.start..layout::NONCE.start)
            );
        }
    }

    #[test]
    fn empty_bundle_and_bad_weight_are_rejected() {
        let searcher = PowSearcher::new(1);
        assert!(searcher.search_bundle(&[], &hash(0), &hash(0), 1).is_err());
        assert!(searcher
            .search_bundle(&bundle(1), &hash(0), &hash(0), 82)
            .is_err());
    }

    #[test]
    fn tryte_bundle_round_trip() {
        let trytes = vec!["9".repeat(TRANSACTION_TRYTES); 2];
        let trunk = "A".repeat(81);
        let branch = "B".repeat(81);
        let out = PowSearcher::new(2)
            .pow_bundle_trytes(&trytes, &trunk, &branch, 4)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|t| t.len() == TRANSACTION_TRYTES));
        assert!(PowSearcher::new(1)
            .pow_bundle_trytes(&trytes, "SHORT", &branch, 4)
            .is_err());
    }

    #[tokio::test]
    async fn spawned_bundle_search_completes() {
        let handle = PowSearcher::new(2).spawn_bundle(bundle(2), hash(1), hash(0), 4);
        let attached = handle.join().await.unwrap().unwrap();
        assert_eq!(attached.len(), 2);
    }

    #[tokio::test]
    async fn cancelled_bundle_spawn_leaves_the_searcher_usable() {
        let searcher = PowSearcher::new(1);
        let handle = searcher
            .clone()
            .spawn_bundle(bundle(2), hash(1), hash(0), crate::MAX_MIN_WEIGHT_MAGNITUDE);
        handle.cancel();
        assert_eq!(handle.join().await.unwrap(), Err(WorkError::Cancelled));

        let attached = searcher
            .search_bundle(&bundle(1), &hash(1), &hash(0), 3)
            .unwrap();
        assert!(validate_pow(attached[0].transaction.as_trits(), 3));
    }
}
