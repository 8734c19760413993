use enum_primitive_derive::Primitive;

/// We use `u8::MAX` as a reserved separator value and make sure through the
/// [`DatabaseStorePrefixes`] enum that it is never used as a bucket prefix.
pub const SEPARATOR: u8 = u8::MAX;

#[derive(Primitive, Debug, Clone, Copy)]
#[repr(u8)]
pub enum DatabaseStorePrefixes {
    /// The single hash-state record (tracked hashes + confirmation flags)
    HashStates = 1,
    /// Compressed transaction bodies keyed by raw hash bytes
    TransactionBodies = 2,

    /// Reserved as a separator
    Separator = SEPARATOR,
}

impl From<DatabaseStorePrefixes> for Vec<u8> {
    fn from(value: DatabaseStorePrefixes) -> Self {
        [value as u8].to_vec()
    }
}

impl From<DatabaseStorePrefixes> for u8 {
    fn from(value: DatabaseStorePrefixes) -> Self {
        value as u8
    }
}

impl AsRef<[u8]> for DatabaseStorePrefixes {
    fn as_ref(&self) -> &[u8] {
        // SAFETY: enum has repr(u8)
        std::slice::from_ref(unsafe { &*(self as *const Self as *const u8) })
    }
}
