use std::sync::Arc;

use parking_lot::RwLock;
use tangle_database::prelude::{DbKey, DbWriter, DirectDbWriter, StoreResult, DB};
use tangle_database::registry::DatabaseStorePrefixes;

use crate::codec;
use crate::tx::TxState;

/// Reader API for `HashStateStore`.
pub trait HashStateStoreReader {
    /// Returns the full tracked set. An absent record reads as the empty set,
    /// never as an error.
    fn get(&self) -> StoreResult<Arc<Vec<TxState>>>;
}

pub trait HashStateStore: HashStateStoreReader {
    /// Atomically replaces the whole record. This is a full overwrite, not a
    /// merge; callers that want to preserve existing entries must
    /// read-modify-write.
    fn set(&self, states: Vec<TxState>) -> StoreResult<()>;
}

/// A DB + cache implementation of `HashStateStore`. The entire tracked set is
/// one versioned record under one fixed key.
#[derive(Clone)]
pub struct DbHashStateStore {
    db: Arc<DB>,
    key: DbKey,
    cached: Arc<RwLock<Option<Arc<Vec<TxState>>>>>,
}

impl DbHashStateStore {
    pub fn new(db: Arc<DB>) -> Self {
        Self { db, key: DbKey::prefix_only(DatabaseStorePrefixes::HashStates.as_ref()), cached: Arc::new(RwLock::new(None)) }
    }
}

impl HashStateStoreReader for DbHashStateStore {
    fn get(&self) -> StoreResult<Arc<Vec<TxState>>> {
        if let Some(states) = self.cached.read().clone() {
            return Ok(states);
        }
        // Fault in under the write guard so a concurrent `set` cannot slip in
        // between the DB read and the cache store
        let mut guard = self.cached.write();
        if let Some(states) = guard.clone() {
            return Ok(states);
        }
        let slice = self.db.get_pinned(&self.key)?;
        let states = Arc::new(codec::decode_hash_state(slice.as_deref())?);
        *guard = Some(states.clone());
        Ok(states)
    }
}

impl HashStateStore for DbHashStateStore {
    fn set(&self, states: Vec<TxState>) -> StoreResult<()> {
        let bin = codec::encode_hash_state(&states)?;
        let states = Arc::new(states);
        let mut guard = self.cached.write();
        DirectDbWriter::new(&self.db).put(&self.key, bin)?;
        *guard = Some(states);
        Ok(())
    }
}
