use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::LedgerSnapshot;

use super::{MIGRATION_001_INITIAL, SNAPSHOT_KEY};

/// A stored value together with the time it was written.
#[derive(Debug, Clone)]
pub struct StoredValue {
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository persisting the ledger as a single JSON blob in a key-value table.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Open (creating if needed) and migrate the database.
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Key-value operations
    // ========================

    /// Read the raw value stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        let row = sqlx::query("SELECT value, updated_at FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read key '{}'", key))?;

        match row {
            Some(row) => {
                let updated_at_str: String = row.get("updated_at");
                Ok(Some(StoredValue {
                    value: row.get("value"),
                    updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                        .context("Invalid updated_at timestamp")?
                        .with_timezone(&Utc),
                }))
            }
            None => Ok(None),
        }
    }

    /// Write `value` under `key`, replacing whatever was there.
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
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
        .with_context(|| format!("Failed to write key '{}'", key))?;
        Ok(())
    }

    /// Remove `key`. Returns true if a value was removed.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove key '{}'", key))?;
        Ok(result.rows_affected() > 0)
    }

    // ========================
    // Snapshot operations
    // ========================

    /// Load the ledger snapshot, if one was ever saved.
    pub async fn load_snapshot(&self) -> Result<Option<LedgerSnapshot>> {
        let Some(stored) = self.get(SNAPSHOT_KEY).await? else {
            return Ok(None);
        };
        let snapshot: LedgerSnapshot =
            serde_json::from_str(&stored.value).context("Stored ledger snapshot is corrupt")?;
        tracing::debug!(
            entries = snapshot.entries.len(),
            updated_at = %stored.updated_at,
            "loaded ledger snapshot"
        );
        Ok(Some(snapshot))
    }

    /// Overwrite the ledger snapshot.
    pub async fn save_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
        self.put(SNAPSHOT_KEY, &json).await?;
        tracing::debug!(entries = snapshot.entries.len(), "saved ledger snapshot");
        Ok(())
    }

    /// When the snapshot was last written.
    pub async fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.get(SNAPSHOT_KEY).await?.map(|stored| stored.updated_at))
    }
}
