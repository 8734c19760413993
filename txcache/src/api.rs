use tangle_hashes::Hash;
use thiserror::Error;

use crate::tx::Transaction;

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("node error: {0}")]
    Node(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Client contract for the remote ledger node.
pub trait LedgerApi {
    /// Fetches the bodies of `hashes` in one batch, one transaction per
    /// requested hash, in request order. Implementations must not return
    /// partial data on failure.
    fn fetch_transactions(&self, hashes: &[Hash]) -> Result<Vec<Transaction>, ApiError>;
}
