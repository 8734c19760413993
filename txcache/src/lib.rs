//! A local persistent cache of ledger transactions sitting in front of a
//! remote node. Tracks which transaction hashes are of interest and whether
//! each is confirmed, stores compressed transaction bodies once retrieved,
//! reconciles gaps by batch-fetching missing bodies, and reassembles bundles
//! with cross-validation against the tracked set.

use std::sync::Arc;

use tangle_database::prelude::DB;

use crate::stores::hash_state::DbHashStateStore;
use crate::stores::transactions::DbTransactionStore;

mod bundle;
mod codec;
mod reconciler;

pub mod api;
pub mod errors;
pub mod stores;
pub mod tx;

pub use crate::api::{ApiError, LedgerApi};
pub use crate::errors::{CacheError, CacheResult};
pub use crate::tx::{Transaction, TxState};

/// The cache facade owning the DB handle and both stores. Reconciliation and
/// bundle lookup are implemented on this type; callers that maintain the
/// tracked set do so through `hash_state()` with explicit read-modify-write.
pub struct TransactionCache {
    db: Arc<DB>,
    hash_state: DbHashStateStore,
    transactions: DbTransactionStore,
}

impl TransactionCache {
    pub fn new(db: Arc<DB>, cache_size: u64) -> Self {
        Self { hash_state: DbHashStateStore::new(db.clone()), transactions: DbTransactionStore::new(db.clone(), cache_size), db }
    }

    pub fn hash_state(&self) -> &DbHashStateStore {
        &self.hash_state
    }

    pub fn transactions(&self) -> &DbTransactionStore {
        &self.transactions
    }
}
