//! Reading recorder — periodically persists the latest sensor snapshot.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use duskhub_domain::error::DuskHubError;
use duskhub_domain::reading::{RecordedReading, SensorReading};
use duskhub_domain::time::{self, Timestamp};

use crate::ports::ReadingRepository;

/// Last-known environmental values across all sensors.
#[derive(Debug, Default)]
pub struct SensorSnapshot {
    current: Mutex<SensorReading>,
}

impl SensorSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay the fields present in `reading`.
    pub fn update(&self, reading: &SensorReading) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(reading);
    }

    #[must_use]
    pub fn get(&self) -> SensorReading {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sampling cadence and retention of the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderSettings {
    pub period: Duration,
    pub initial_delay: Duration,
    pub retention: chrono::Duration,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(180),
            initial_delay: Duration::from_secs(10),
            retention: chrono::Duration::days(365),
        }
    }
}

/// What a single sampling pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Nothing has been reported yet.
    Skipped,
    Stored { pruned: usize },
}

/// Persists [`SensorSnapshot`] samples and prunes old ones.
pub struct Recorder<R> {
    repo: R,
    snapshot: Arc<SensorSnapshot>,
    settings: RecorderSettings,
}

impl<R: ReadingRepository> Recorder<R> {
    pub fn new(repo: R, snapshot: Arc<SensorSnapshot>, settings: RecorderSettings) -> Self {
        Self {
            repo,
            snapshot,
            settings,
        }
    }

    /// Store the current snapshot, then drop readings past the retention
    /// window.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn sample(&self, now: Timestamp) -> Result<SampleOutcome, DuskHubError> {
        let reading = self.snapshot.get();
        if reading.is_empty() {
            tracing::debug!("no sensor data to store");
            return Ok(SampleOutcome::Skipped);
        }
        self.repo.append(RecordedReading::new(reading, now)).await?;
        let pruned = self
            .repo
            .prune_older_than(now - self.settings.retention)
            .await?;
        tracing::debug!(
            temperature = ?reading.temperature,
            humidity = ?reading.humidity,
            pressure = ?reading.pressure,
            pruned,
            "reading stored"
        );
        Ok(SampleOutcome::Stored { pruned })
    }

    /// Sample forever. Failures are logged and the next period retried.
    pub async fn run(self) {
        tokio::time::sleep(self.settings.initial_delay).await;
        let mut interval = tokio::time::interval(self.settings.period);
        loop {
            interval.tick().await;
            if let Err(err) = self.sample(time::now()).await {
                tracing::error!(error = %err, "failed to record sensor reading");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scheduling_engine::tests::utc;
    use std::future::Future;

    #[derive(Default)]
    pub(crate) struct InMemoryReadingRepo {
        pub(crate) rows: Mutex<Vec<RecordedReading>>,
    }

    impl ReadingRepository for InMemoryReadingRepo {
        fn append(
            &self,
            reading: RecordedReading,
        ) -> impl Future<Output = Result<RecordedReading, DuskHubError>> + Send {
            self.rows.lock().unwrap().push(reading.clone());
            async { Ok(reading) }
        }

        fn prune_older_than(
            &self,
            cutoff: Timestamp,
        ) -> impl Future<Output = Result<usize, DuskHubError>> + Send {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.recorded_at >= cutoff);
            let pruned = before - rows.len();
            async move { Ok(pruned) }
        }

        fn get_recent(
            &self,
            limit: usize,
        ) -> impl Future<Output = Result<Vec<RecordedReading>, DuskHubError>> + Send {
            let rows = self.rows.lock().unwrap();
            let result: Vec<_> = rows.iter().rev().take(limit).cloned().collect();
            async { Ok(result) }
        }
    }

    fn recorder() -> Recorder<Arc<InMemoryReadingRepo>> {
        Recorder::new(
            Arc::new(InMemoryReadingRepo::default()),
            Arc::new(SensorSnapshot::new()),
            RecorderSettings::default(),
        )
    }

    #[tokio::test]
    async fn should_skip_when_nothing_was_reported() {
        let recorder = recorder();
        let outcome = recorder.sample(utc(1, 12, 0)).await.unwrap();
        assert_eq!(outcome, SampleOutcome::Skipped);
        assert!(recorder.repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_store_partial_snapshot() {
        let recorder = recorder();
        recorder.snapshot.update(&SensorReading {
            humidity: Some(60.0),
            ..SensorReading::default()
        });

        recorder.sample(utc(1, 12, 0)).await.unwrap();

        let rows = recorder.repo.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reading.humidity, Some(60.0));
        assert_eq!(rows[0].reading.temperature, None);
    }

    #[tokio::test]
    async fn should_prune_readings_past_retention() {
        let recorder = recorder();
        recorder.snapshot.update(&SensorReading {
            temperature: Some(21.0),
            ..SensorReading::default()
        });
        let old = RecordedReading::new(recorder.snapshot.get(), utc(1, 12, 0) - chrono::Duration::days(400));
        recorder.repo.rows.lock().unwrap().push(old);

        let outcome = recorder.sample(utc(1, 12, 0)).await.unwrap();

        assert_eq!(outcome, SampleOutcome::Stored { pruned: 1 });
        assert_eq!(recorder.repo.rows.lock().unwrap().len(), 1);
    }

    #[test]
    fn should_merge_snapshot_updates() {
        let snapshot = SensorSnapshot::new();
        snapshot.update(&SensorReading {
            temperature: Some(20.0),
            ..SensorReading::default()
        });
        snapshot.update(&SensorReading {
            pressure: Some(1012.0),
            ..SensorReading::default()
        });
        let current = snapshot.get();
        assert_eq!(current.temperature, Some(20.0));
        assert_eq!(current.pressure, Some(1012.0));
    }
}
