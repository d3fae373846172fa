//! Sensor service — ingestion of inbound sensor payloads.

use std::future::Future;
use std::sync::Arc;

use duskhub_domain::alarm::{AlarmKey, Notification};
use duskhub_domain::reading::{SensorPayload, SensorReading};

use crate::alarm_engine::AlarmEngine;
use crate::ports::{NotificationSink, SensorInbox};
use crate::recorder::SensorSnapshot;

/// Updates the shared snapshot and runs the alarm engine for every payload.
pub struct SensorService<N> {
    snapshot: Arc<SensorSnapshot>,
    alarms: AlarmEngine<N>,
}

impl<N: NotificationSink> SensorService<N> {
    pub fn new(snapshot: Arc<SensorSnapshot>, alarms: AlarmEngine<N>) -> Self {
        Self { snapshot, alarms }
    }

    /// Handle one payload reported by `source`.
    #[tracing::instrument(skip(self, payload))]
    pub async fn handle_payload(&self, source: &str, payload: &SensorPayload) -> Vec<Notification> {
        let reading = payload.reading();
        if !reading.is_empty() {
            self.snapshot.update(&reading);
        }
        self.alarms.process(source, payload).await
    }

    /// Latest known environmental values.
    #[must_use]
    pub fn snapshot(&self) -> SensorReading {
        self.snapshot.get()
    }

    #[must_use]
    pub fn active_alarms(&self) -> Vec<AlarmKey> {
        self.alarms.active_alarms()
    }

    /// Explicitly clear a latched alarm.
    pub fn acknowledge(&self, key: &AlarmKey) -> bool {
        self.alarms.acknowledge(key)
    }
}

impl<N> SensorInbox for SensorService<N>
where
    N: NotificationSink + Send + Sync,
{
    fn deliver(&self, source: &str, payload: SensorPayload) -> impl Future<Output = ()> + Send {
        let source = source.to_string();
        async move {
            self.handle_payload(&source, &payload).await;
        }
    }
}
