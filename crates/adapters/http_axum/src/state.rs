//! Shared application state for axum handlers.

use std::sync::Arc;

use duskhub_app::ports::{Almanac, CommandPublisher, NotificationSink, ReadingRepository};
use duskhub_app::services::group_service::GroupService;
use duskhub_app::services::sensor_service::SensorService;

/// Application state shared across all axum handlers.
///
/// Generic over the almanac, command publisher, notification sink and reading
/// repository to avoid dynamic dispatch. `Clone` is implemented manually so
/// the underlying types themselves do not need to be `Clone`.
pub struct AppState<A, P, N, R> {
    /// Device groups and their scheduling engines.
    pub groups: Arc<GroupService<A, P>>,
    /// Sensor snapshot and alarm latches.
    pub sensors: Arc<SensorService<N>>,
    /// Recorded reading history.
    pub readings: Arc<R>,
}

impl<A, P, N, R> Clone for AppState<A, P, N, R> {
    fn clone(&self) -> Self {
        Self {
            groups: Arc::clone(&self.groups),
            sensors: Arc::clone(&self.sensors),
            readings: Arc::clone(&self.readings),
        }
    }
}

impl<A, P, N, R> AppState<A, P, N, R>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// The services are shared with the scheduler, the MQTT listener and the
    /// recorder, which is why they arrive already wrapped.
    pub fn from_arcs(
        groups: Arc<GroupService<A, P>>,
        sensors: Arc<SensorService<N>>,
        readings: Arc<R>,
    ) -> Self {
        Self {
            groups,
            sensors,
            readings,
        }
    }
}
