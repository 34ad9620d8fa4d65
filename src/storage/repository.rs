use anyhow::{Context, Result, bail};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::domain::Transaction;

use super::{MIGRATION_001_INITIAL, TRANSACTIONS_KEY};

/// Persists snapshots as text values under string keys in SQLite.
pub struct Repository {
    pool: SqlitePool,
    quota: Option<usize>,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, quota: None }
    }

    /// Limit the size in bytes of any single stored value.
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run on an already migrated database.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Connect and migrate.
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Raw snapshots
    // ========================

    /// Store `value` under `key`, replacing whatever was there.
    pub async fn save_snapshot(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                bail!(
                    "Storage quota exceeded: snapshot is {} bytes, limit is {} bytes",
                    value.len(),
                    quota
                );
            }
        }

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save snapshot '{}'", key))?;
        Ok(())
    }

    /// Read the value stored under `key`, if any.
    pub async fn load_snapshot(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load snapshot '{}'", key))?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    // ========================
    // Transactions
    // ========================

    /// Serialize the whole transaction list and store it as one snapshot.
    pub async fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        let json =
            serde_json::to_string(transactions).context("Failed to serialize transactions")?;
        self.save_snapshot(TRANSACTIONS_KEY, &json).await?;
        tracing::debug!(
            count = transactions.len(),
            bytes = json.len(),
            "saved transaction snapshot"
        );
        Ok(())
    }

    /// Load the stored transaction list. A missing snapshot is an empty list.
    pub async fn load_transactions(&self) -> Result<Vec<Transaction>> {
        let Some(json) = self.load_snapshot(TRANSACTIONS_KEY).await? else {
            tracing::debug!("no transaction snapshot stored yet");
            return Ok(Vec::new());
        };

        let transactions: Vec<Transaction> =
            serde_json::from_str(&json).context("Stored transaction snapshot is corrupt")?;
        tracing::debug!(count = transactions.len(), "loaded transaction snapshot");
        Ok(transactions)
    }
}
