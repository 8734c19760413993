use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use tangle_database::prelude::{DbKey, StoreError, StoreResult};

use crate::tx::{Transaction, TxState};

/// Compresses a transaction body for storage: a bincode envelope deflated at
/// maximum compression. Deterministic for a given compressor version only.
pub fn compress_body(tx: &Transaction) -> StoreResult<Vec<u8>> {
    let envelope = bincode::serialize(tx)?;
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(envelope.len() / 2), Compression::best());
    encoder.write_all(&envelope)?;
    Ok(encoder.finish()?)
}

/// Inflates and decodes a stored transaction body. Truncated or malformed
/// blobs surface as `CorruptData` naming the offending key.
pub fn decompress_body(key: &DbKey, blob: &[u8]) -> StoreResult<Transaction> {
    let mut envelope = Vec::new();
    DeflateDecoder::new(blob).read_to_end(&mut envelope).map_err(|err| StoreError::CorruptData(key.clone(), err.to_string()))?;
    bincode::deserialize(&envelope).map_err(|err| StoreError::CorruptData(key.clone(), err.to_string()))
}

/// Encodes the hash-state set as a JSON document, preserving order.
pub fn encode_hash_state(states: &[TxState]) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(states)?)
}

/// Decodes the hash-state set. An absent or empty value decodes to the empty
/// set rather than an error.
pub fn decode_hash_state(raw: Option<&[u8]>) -> StoreResult<Vec<TxState>> {
    match raw {
        Some(bytes) if !bytes.is_empty() => Ok(serde_json::from_slice(bytes)?),
        _ => Ok(Vec::new()),
    }
}
