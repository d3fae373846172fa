//! `SQLite` implementation of [`ReadingRepository`].

use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use duskhub_app::ports::ReadingRepository;
use duskhub_domain::error::DuskHubError;
use duskhub_domain::id::ReadingId;
use duskhub_domain::reading::{RecordedReading, SensorReading};
use duskhub_domain::time::Timestamp;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(RecordedReading);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let recorded_at: String = row.try_get("recorded_at")?;
        let recorded_at = chrono::DateTime::parse_from_rfc3339(&recorded_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(RecordedReading {
            id: ReadingId::from_uuid(id),
            recorded_at,
            reading: SensorReading {
                temperature: row.try_get("temperature")?,
                humidity: row.try_get("humidity")?,
                pressure: row.try_get("pressure")?,
            },
        }))
    }
}

/// Fixed-width UTC text, so that string order in SQL is time order.
fn encode_time(at: Timestamp) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

const INSERT: &str = r"
    INSERT INTO readings (id, recorded_at, temperature, humidity, pressure)
    VALUES (?, ?, ?, ?, ?)
";

const SELECT_RECENT: &str = "SELECT * FROM readings ORDER BY recorded_at DESC LIMIT ?";

const DELETE_BEFORE: &str = "DELETE FROM readings WHERE recorded_at < ?";

/// `SQLite`-backed reading history.
pub struct SqliteReadingRepository {
    pool: SqlitePool,
}

impl SqliteReadingRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReadingRepository for SqliteReadingRepository {
    async fn append(&self, reading: RecordedReading) -> Result<RecordedReading, DuskHubError> {
        sqlx::query(INSERT)
            .bind(reading.id.as_uuid())
            .bind(encode_time(reading.recorded_at))
            .bind(reading.reading.temperature)
            .bind(reading.reading.humidity)
            .bind(reading.reading.pressure)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(reading)
    }

    async fn prune_older_than(&self, cutoff: Timestamp) -> Result<usize, DuskHubError> {
        let result = sqlx::query(DELETE_BEFORE)
            .bind(encode_time(cutoff))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<RecordedReading>, DuskHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
