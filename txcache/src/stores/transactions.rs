use std::sync::Arc;

use rocksdb::{Direction, IteratorMode, ReadOptions, WriteBatch};
use tangle_database::prelude::{BatchDbWriter, Cache, DbKey, DbWriter, DirectDbWriter, StoreError, StoreResult, DB};
use tangle_database::registry::DatabaseStorePrefixes;
use tangle_hashes::Hash;

use crate::codec;
use crate::tx::Transaction;

/// Reader API for `TransactionStore`.
pub trait TransactionStoreReader {
    fn get(&self, hash: Hash) -> StoreResult<Transaction>;

    /// Order-preserving multi-get. Fails the whole call on the first absent
    /// hash; no partial results.
    fn get_many(&self, hashes: &[Hash]) -> StoreResult<Vec<Transaction>>;

    fn has(&self, hash: Hash) -> StoreResult<bool>;
}

pub trait TransactionStore: TransactionStoreReader {
    /// Compresses and stores the transaction keyed by its hash. Last write
    /// wins if the key already exists.
    fn insert(&self, tx: Transaction) -> StoreResult<()>;
}

/// A DB + cache implementation of `TransactionStore`, one compressed body per
/// transaction hash.
#[derive(Clone)]
pub struct DbTransactionStore {
    db: Arc<DB>,
    cache: Cache<Hash, Transaction>,
    prefix: Vec<u8>,
}

impl DbTransactionStore {
    pub fn new(db: Arc<DB>, cache_size: u64) -> Self {
        Self { db, cache: Cache::new(cache_size), prefix: DatabaseStorePrefixes::TransactionBodies.into() }
    }

    /// Stages an insert into `batch`. Staged writes bypass the in-process
    /// cache; readers fault the entry in from the DB after the batch commits.
    pub fn insert_batch(&self, batch: &mut WriteBatch, tx: &Transaction) -> StoreResult<()> {
        let blob = codec::compress_body(tx)?;
        BatchDbWriter::new(batch).put(DbKey::new(&self.prefix, tx.hash), blob)?;
        Ok(())
    }

    /// Lazily iterates all stored transactions in ascending key (hash) byte
    /// order. Each call starts a fresh scan.
    pub fn iterator(&self) -> impl Iterator<Item = StoreResult<(Hash, Transaction)>> + '_ {
        let prefix_key = DbKey::prefix_only(&self.prefix);
        let mut read_opts = ReadOptions::default();
        read_opts.set_iterate_range(rocksdb::PrefixRange(prefix_key.as_ref()));
        self.db.iterator_opt(IteratorMode::From(prefix_key.as_ref(), Direction::Forward), read_opts).map(move |iter_result| {
            let (key_bytes, blob) = iter_result.map_err(StoreError::from)?;
            let hash = Hash::try_from(&key_bytes[prefix_key.prefix_len()..])
                .map_err(|err| StoreError::CorruptData(DbKey::prefix_only(&key_bytes), err.to_string()))?;
            let db_key = DbKey::new(&self.prefix, hash);
            Ok((hash, codec::decompress_body(&db_key, &blob)?))
        })
    }
}

impl TransactionStoreReader for DbTransactionStore {
    fn get(&self, hash: Hash) -> StoreResult<Transaction> {
        if let Some(tx) = self.cache.get(&hash) {
            return Ok(tx);
        }
        let db_key = DbKey::new(&self.prefix, hash);
        if let Some(slice) = self.db.get_pinned(&db_key)? {
            let tx = codec::decompress_body(&db_key, &slice)?;
            self.cache.insert(hash, tx.clone());
            Ok(tx)
        } else {
            Err(StoreError::KeyNotFound(db_key))
        }
    }

    fn get_many(&self, hashes: &[Hash]) -> StoreResult<Vec<Transaction>> {
        hashes.iter().map(|hash| self.get(*hash)).collect()
    }

    fn has(&self, hash: Hash) -> StoreResult<bool> {
        Ok(self.cache.contains_key(&hash) || self.db.get_pinned(DbKey::new(&self.prefix, hash))?.is_some())
    }
}

impl TransactionStore for DbTransactionStore {
    fn insert(&self, tx: Transaction) -> StoreResult<()> {
        let blob = codec::compress_body(&tx)?;
        DirectDbWriter::new(&self.db).put(DbKey::new(&self.prefix, tx.hash), blob)?;
        self.cache.insert(tx.hash, tx);
        Ok(())
    }
}
