use tangle_database::prelude::StoreError;
use tangle_hashes::Hash;
use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum CacheError {
    /// A stored transaction body has no matching hash-state entry
    #[error("transaction body {0} has no hash-state entry")]
    ConsistencyViolation(Hash),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;
