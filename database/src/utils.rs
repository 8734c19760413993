use tempfile::TempDir;

/// Test helper tying a temp directory's lifetime to the DB opened inside it.
/// Dropping the lifetime removes the directory and everything under it.
pub struct DbLifetime {
    _tempdir: TempDir,
}

impl DbLifetime {
    pub fn new(tempdir: TempDir) -> Self {
        Self { _tempdir: tempdir }
    }
}

pub fn create_tempdir() -> TempDir {
    tempfile::tempdir().expect("tempdir creation failed")
}

/// Creates a temp DB for testing from the given `ConnBuilder`, returning the
/// DB along with a lifetime guard that removes it when dropped.
#[macro_export]
macro_rules! create_temp_db {
    ($conn_builder:expr) => {{
        let tempdir = $crate::utils::create_tempdir();
        let db = $conn_builder.with_db_path(tempdir.path().to_owned()).build().expect("failed to open temp db");
        ($crate::utils::DbLifetime::new(tempdir), db)
    }};
}
