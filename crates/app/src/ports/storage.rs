//! Storage port — persistence for historical sensor readings.

use std::future::Future;

use duskhub_domain::error::DuskHubError;
use duskhub_domain::reading::RecordedReading;
use duskhub_domain::time::Timestamp;

/// Repository for persisting and querying [`RecordedReading`]s.
pub trait ReadingRepository {
    /// Append a reading.
    fn append(
        &self,
        reading: RecordedReading,
    ) -> impl Future<Output = Result<RecordedReading, DuskHubError>> + Send;

    /// Delete every reading recorded strictly before `cutoff`, returning how
    /// many rows were removed.
    fn prune_older_than(
        &self,
        cutoff: Timestamp,
    ) -> impl Future<Output = Result<usize, DuskHubError>> + Send;

    /// The most recent readings, ordered newest-first.
    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<RecordedReading>, DuskHubError>> + Send;
}

impl<T: ReadingRepository + Send + Sync> ReadingRepository for std::sync::Arc<T> {
    fn append(
        &self,
        reading: RecordedReading,
    ) -> impl Future<Output = Result<RecordedReading, DuskHubError>> + Send {
        (**self).append(reading)
    }

    fn prune_older_than(
        &self,
        cutoff: Timestamp,
    ) -> impl Future<Output = Result<usize, DuskHubError>> + Send {
        (**self).prune_older_than(cutoff)
    }

    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<RecordedReading>, DuskHubError>> + Send {
        (**self).get_recent(limit)
    }
}
