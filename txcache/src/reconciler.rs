use itertools::Itertools;
use log::{debug, info};
use rocksdb::WriteBatch;
use tangle_database::prelude::{StoreError, StoreResultExtensions};
use tangle_hashes::Hash;

use crate::api::LedgerApi;
use crate::errors::CacheResult;
use crate::stores::hash_state::HashStateStoreReader;
use crate::stores::transactions::TransactionStoreReader;
use crate::TransactionCache;

impl TransactionCache {
    /// Fetches and stores the bodies of tracked hashes with no local copy yet.
    ///
    /// The remote fetch happens outside any storage transaction; the fetched
    /// bodies are then committed in a single atomic write batch, so either all
    /// of them become durable or none do, including across process crashes.
    /// Remote and store errors propagate unchanged and nothing is written on
    /// failure. Retrying is a caller concern.
    pub fn update_transactions(&self, api: &impl LedgerApi) -> CacheResult<()> {
        let states = self.hash_state.get()?;
        let mut missing = Vec::new();
        for hash in states.iter().map(|state| state.hash).unique() {
            if self.transactions.get(hash).optional()?.is_none() {
                missing.push(hash);
            }
        }
        if missing.is_empty() {
            debug!("transaction cache is up to date ({} tracked hashes)", states.len());
            return Ok(());
        }

        info!("fetching {} missing transaction bodies", missing.len());
        let fetched = api.fetch_transactions(&missing)?;

        let mut batch = WriteBatch::default();
        let mut staged = 0usize;
        for tx in fetched {
            // Bodies are append-only: a body that appeared meanwhile is kept as is
            if self.transactions.has(tx.hash)? {
                continue;
            }
            self.transactions.insert_batch(&mut batch, &tx)?;
            staged += 1;
        }
        self.db.write(batch).map_err(StoreError::from)?;
        info!("stored {staged} fetched transaction bodies");
        Ok(())
    }

    /// Hashes from the tracked set that currently have no stored body, in
    /// first-occurrence order with duplicates collapsed.
    pub fn missing_hashes(&self) -> CacheResult<Vec<Hash>> {
        let states = self.hash_state.get()?;
        let mut missing = Vec::new();
        for hash in states.iter().map(|state| state.hash).unique() {
            if !self.transactions.has(hash)? {
                missing.push(hash);
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::stores::hash_state::HashStateStore;
    use crate::stores::transactions::TransactionStore;
    use crate::tx::{Transaction, TxState};
    use std::cell::Cell;
    use std::collections::HashMap;
    use tangle_database::create_temp_db;
    use tangle_database::prelude::{ConnBuilder, DbKey};
    use tangle_database::registry::DatabaseStorePrefixes;

    struct MockApi {
        txs: HashMap<Hash, Transaction>,
        calls: Cell<usize>,
        fail: bool,
    }

    impl MockApi {
        fn new(txs: impl IntoIterator<Item = Transaction>) -> Self {
            Self { txs: txs.into_iter().map(|tx| (tx.hash, tx)).collect(), calls: Cell::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { txs: HashMap::new(), calls: Cell::new(0), fail: true }
        }
    }

    impl LedgerApi for MockApi {
        fn fetch_transactions(&self, hashes: &[Hash]) -> Result<Vec<Transaction>, ApiError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ApiError::Transport("connection refused".into()));
            }
            hashes
                .iter()
                .map(|hash| self.txs.get(hash).cloned().ok_or_else(|| ApiError::Node(format!("unknown hash {hash}"))))
                .collect()
        }
    }

    fn tx(hash: u64) -> Transaction {
        Transaction { hash: hash.into(), bundle: 99.into(), payload: format!("body-{hash}").into_bytes() }
    }

    fn cache() -> (tangle_database::utils::DbLifetime, TransactionCache) {
        let (lifetime, db) = create_temp_db!(ConnBuilder::default().with_files_limit(10));
        (lifetime, TransactionCache::new(db, 16))
    }

    #[test]
    fn test_update_fetches_all_missing_then_becomes_noop() {
        let (_lifetime, cache) = cache();
        cache.hash_state().set(vec![TxState::new(1.into(), false), TxState::new(2.into(), true)]).unwrap();
        let api = MockApi::new([tx(1), tx(2)]);

        cache.update_transactions(&api).unwrap();
        assert_eq!(api.calls.get(), 1);
        assert_eq!(cache.transactions().get(1.into()).unwrap(), tx(1));
        assert_eq!(cache.transactions().get(2.into()).unwrap(), tx(2));

        // Second run: nothing is missing, so no remote call is made
        cache.update_transactions(&api).unwrap();
        assert_eq!(api.calls.get(), 1);
    }

    #[test]
    fn test_update_skips_already_stored_bodies() {
        let (_lifetime, cache) = cache();
        cache.hash_state().set(vec![TxState::new(1.into(), true), TxState::new(2.into(), false)]).unwrap();
        cache.transactions().insert(tx(1)).unwrap();
        let api = MockApi::new([tx(2)]);

        cache.update_transactions(&api).unwrap();
        assert_eq!(api.calls.get(), 1);
        assert_eq!(cache.transactions().get(2.into()).unwrap(), tx(2));
    }

    #[test]
    fn test_update_with_empty_tracked_set_makes_no_remote_call() {
        let (_lifetime, cache) = cache();
        let api = MockApi::new([]);
        cache.update_transactions(&api).unwrap();
        assert_eq!(api.calls.get(), 0);
    }

    #[test]
    fn test_duplicate_tracked_hashes_are_fetched_once() {
        let (_lifetime, cache) = cache();
        cache.hash_state().set(vec![TxState::new(1.into(), false), TxState::new(1.into(), false)]).unwrap();
        let api = MockApi::new([tx(1)]);
        cache.update_transactions(&api).unwrap();
        assert_eq!(api.calls.get(), 1);
        assert_eq!(cache.transactions().get(1.into()).unwrap(), tx(1));
    }

    #[test]
    fn test_remote_failure_persists_nothing() {
        let (_lifetime, cache) = cache();
        cache.hash_state().set(vec![TxState::new(1.into(), false)]).unwrap();
        let api = MockApi::failing();

        assert!(matches!(cache.update_transactions(&api), Err(crate::errors::CacheError::Api(_))));
        assert!(!cache.transactions().has(1.into()).unwrap());
        assert_eq!(cache.missing_hashes().unwrap(), vec![Hash::from(1u64)]);
    }

    #[test]
    fn test_corrupt_body_aborts_update_before_the_remote_call() {
        let (_lifetime, db) = create_temp_db!(ConnBuilder::default().with_files_limit(10));
        let cache = TransactionCache::new(db.clone(), 16);
        cache.hash_state().set(vec![TxState::new(1.into(), true), TxState::new(2.into(), false)]).unwrap();
        // Plant garbage under H1's body key
        let key = DbKey::new(DatabaseStorePrefixes::TransactionBodies.as_ref(), Hash::from(1u64));
        db.put(&key, b"not a deflate stream").unwrap();
        let api = MockApi::new([tx(2)]);

        let result = cache.update_transactions(&api);
        assert!(matches!(result, Err(crate::errors::CacheError::Store(StoreError::CorruptData(_, _)))));
        // The probe aborted the whole run: nothing was fetched, nothing written
        assert_eq!(api.calls.get(), 0);
        assert!(!cache.transactions().has(2.into()).unwrap());
    }

    #[test]
    fn test_all_missing_bodies_are_retrievable_after_update() {
        let (_lifetime, cache) = cache();
        let tracked: Vec<TxState> = (1u64..=5).map(|i| TxState::new(i.into(), i % 2 == 0)).collect();
        cache.hash_state().set(tracked).unwrap();
        let api = MockApi::new((1u64..=5).map(tx));

        cache.update_transactions(&api).unwrap();
        assert!(cache.missing_hashes().unwrap().is_empty());
        let bodies = cache.transactions().get_many(&(1u64..=5).map(Hash::from).collect::<Vec<_>>()).unwrap();
        assert_eq!(bodies.len(), 5);
    }
}
