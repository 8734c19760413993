use serde::{Deserialize, Serialize};
use tangle_hashes::Hash;

/// A ledger transaction as cached locally. Immutable once stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The transaction's own identifier, also its storage key
    pub hash: Hash,
    /// Identifier of the bundle this transaction belongs to
    pub bundle: Hash,
    /// The raw transaction body as returned by the remote node
    pub payload: Vec<u8>,
}

/// Tracking entry for a transaction hash of interest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxState {
    pub hash: Hash,
    /// Whether the remote ledger has finalized the transaction. Confirmation
    /// semantics themselves are a caller concern.
    pub confirmed: bool,
}

impl TxState {
    pub fn new(hash: Hash, confirmed: bool) -> Self {
        Self { hash, confirmed }
    }
}
