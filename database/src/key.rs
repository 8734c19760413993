use std::fmt::{Display, Formatter};

/// A concatenated DB key composed of a bucket prefix and the entry key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbKey {
    path: Vec<u8>,
    prefix_len: usize,
}

impl DbKey {
    pub fn new(prefix: &[u8], key: impl AsRef<[u8]>) -> Self {
        Self { path: prefix.iter().chain(key.as_ref().iter()).copied().collect(), prefix_len: prefix.len() }
    }

    /// A key holding the bucket prefix alone, used for bucket-wide iteration
    /// and for single-record buckets.
    pub fn prefix_only(prefix: &[u8]) -> Self {
        Self::new(prefix, [])
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }
}

impl AsRef<[u8]> for DbKey {
    fn as_ref(&self) -> &[u8] {
        &self.path
    }
}

impl Display for DbKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (prefix, key) = self.path.split_at(self.prefix_len);
        write!(f, "{}/{}", hex::encode(prefix), hex::encode(key))
    }
}
