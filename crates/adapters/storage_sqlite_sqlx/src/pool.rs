//! Readings database: connection pool and embedded migrations.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::StorageError;

/// The recorder writes one row per sample period and the admin API reads
/// recent rows; a handful of connections is plenty.
const MAX_CONNECTIONS: u32 = 4;

/// How long a writer waits for the recorder's prune to release the lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the readings history lives.
pub struct Config {
    /// `SQLite` connection URL, e.g. `sqlite:duskhub.db?mode=rwc` or
    /// `sqlite::memory:` for tests.
    pub database_url: String,
}

impl Config {
    /// Open the readings database, creating the file and the `readings`
    /// table when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] for a malformed URL, an unreachable file or a
    /// failed migration.
    pub async fn build(self) -> Result<Database, StorageError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Database { pool })
    }
}

/// Migrated pool shared by the reading repository.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_create_readings_table_in_memory_db() {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|row| row.0.as_str()).collect();
        assert_eq!(names, vec!["readings"]);
    }

    #[tokio::test]
    async fn should_index_readings_by_recorded_time() {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();

        let indexes: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'readings' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = indexes.iter().map(|row| row.0.as_str()).collect();
        assert_eq!(names, vec!["idx_readings_recorded_at"]);
    }

    #[tokio::test]
    async fn should_reject_non_sqlite_url() {
        let config = Config {
            database_url: "postgres://nope".to_string(),
        };
        assert!(config.build().await.is_err());
    }
}
