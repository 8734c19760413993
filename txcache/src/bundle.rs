use log::debug;
use tangle_hashes::Hash;

use crate::errors::{CacheError, CacheResult};
use crate::stores::hash_state::HashStateStoreReader;
use crate::tx::{Transaction, TxState};
use crate::TransactionCache;

impl TransactionCache {
    /// Collects every stored transaction belonging to `bundle` along with its
    /// tracking entry, index-aligned.
    ///
    /// This is a full scan of the body store, so results come back in
    /// ascending hash order rather than bundle sequence order. A matching
    /// transaction whose hash has no tracking entry fails the whole call;
    /// partial results are never returned.
    pub fn find_transactions_by_bundle(&self, bundle: Hash) -> CacheResult<(Vec<Transaction>, Vec<TxState>)> {
        let mut txs = Vec::new();
        for item in self.transactions.iterator() {
            let (_, tx) = item?;
            if tx.bundle == bundle {
                txs.push(tx);
            }
        }
        debug!("bundle {bundle} matched {} stored transactions", txs.len());

        let states = self.hash_state.get()?;
        let mut matched = Vec::with_capacity(txs.len());
        for tx in &txs {
            // First match wins when the tracked set carries duplicates
            match states.iter().find(|state| state.hash == tx.hash) {
                Some(state) => matched.push(state.clone()),
                None => return Err(CacheError::ConsistencyViolation(tx.hash)),
            }
        }
        Ok((txs, matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::hash_state::HashStateStore;
    use crate::stores::transactions::TransactionStore;
    use tangle_database::create_temp_db;
    use tangle_database::prelude::{ConnBuilder, DbKey, StoreError};
    use tangle_database::registry::DatabaseStorePrefixes;

    const BUNDLE: u64 = 42;
    const OTHER_BUNDLE: u64 = 43;

    fn tx(hash: u64, bundle: u64) -> Transaction {
        Transaction { hash: hash.into(), bundle: bundle.into(), payload: format!("body-{hash}").into_bytes() }
    }

    fn populated_cache() -> (tangle_database::utils::DbLifetime, TransactionCache) {
        let (lifetime, db) = create_temp_db!(ConnBuilder::default().with_files_limit(10));
        let cache = TransactionCache::new(db, 16);
        // H1, H3 belong to the queried bundle; H2, H4, H5 do not
        for (hash, bundle) in [(1u64, BUNDLE), (2, OTHER_BUNDLE), (3, BUNDLE), (4, OTHER_BUNDLE), (5, OTHER_BUNDLE)] {
            cache.transactions().insert(tx(hash, bundle)).unwrap();
        }
        (lifetime, cache)
    }

    #[test]
    fn test_find_returns_matches_in_ascending_hash_order() {
        let (_lifetime, cache) = populated_cache();
        cache
            .hash_state()
            .set(vec![TxState::new(5.into(), false), TxState::new(3.into(), true), TxState::new(1.into(), false)])
            .unwrap();

        let (txs, states) = cache.find_transactions_by_bundle(BUNDLE.into()).unwrap();
        assert_eq!(txs, vec![tx(1, BUNDLE), tx(3, BUNDLE)]);
        assert_eq!(states, vec![TxState::new(1.into(), false), TxState::new(3.into(), true)]);
    }

    #[test]
    fn test_untracked_body_fails_with_consistency_violation() {
        let (_lifetime, cache) = populated_cache();
        // H3's tracking entry is missing
        cache.hash_state().set(vec![TxState::new(1.into(), false), TxState::new(5.into(), false)]).unwrap();

        match cache.find_transactions_by_bundle(BUNDLE.into()) {
            Err(CacheError::ConsistencyViolation(hash)) => assert_eq!(hash, Hash::from(3u64)),
            other => panic!("expected a consistency violation, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_body_aborts_the_whole_lookup() {
        let (_lifetime, db) = create_temp_db!(ConnBuilder::default().with_files_limit(10));
        let cache = TransactionCache::new(db.clone(), 16);
        cache.transactions().insert(tx(1, BUNDLE)).unwrap();
        cache.hash_state().set(vec![TxState::new(1.into(), false), TxState::new(2.into(), false)]).unwrap();
        // Plant garbage under H2's body key; the scan decodes every record
        let key = DbKey::new(DatabaseStorePrefixes::TransactionBodies.as_ref(), Hash::from(2u64));
        db.put(&key, b"not a deflate stream").unwrap();

        let result = cache.find_transactions_by_bundle(BUNDLE.into());
        assert!(matches!(result, Err(CacheError::Store(StoreError::CorruptData(_, _)))));
    }

    #[test]
    fn test_unknown_bundle_matches_nothing() {
        let (_lifetime, cache) = populated_cache();
        cache.hash_state().set(vec![]).unwrap();
        let (txs, states) = cache.find_transactions_by_bundle(7777.into()).unwrap();
        assert!(txs.is_empty());
        assert!(states.is_empty());
    }
}
