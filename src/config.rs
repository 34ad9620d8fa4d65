use std::path::PathBuf;

/// Database file used when none is given.
pub const DEFAULT_DATABASE: &str = "pocketbook.db";

/// Largest snapshot the store accepts, in bytes (5 MiB).
pub const DEFAULT_STORAGE_QUOTA: usize = 5 * 1024 * 1024;

/// Runtime settings for opening a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite database file holding the ledger snapshot
    pub database: PathBuf,
    /// Maximum size of the serialized snapshot. `None` disables the limit.
    pub storage_quota: Option<usize>,
}

impl Config {
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_storage_quota(mut self, quota: Option<usize>) -> Self {
        self.storage_quota = quota;
        self
    }

    /// Connection URL for sqlx. The file is created if missing.
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database.display())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            storage_quota: Some(DEFAULT_STORAGE_QUOTA),
        }
    }
}
