//! Sensor inbox port — where transports hand over inbound sensor payloads.

use std::future::Future;

use duskhub_domain::reading::SensorPayload;

/// Receives parsed status payloads from sensors.
///
/// This is a **driving** port: transport adapters call it for every message
/// and the application decides what to do with it.
pub trait SensorInbox: Send + Sync {
    /// Deliver a payload reported by the sensor named `source`.
    fn deliver(&self, source: &str, payload: SensorPayload) -> impl Future<Output = ()> + Send;
}

impl<T: SensorInbox> SensorInbox for std::sync::Arc<T> {
    fn deliver(&self, source: &str, payload: SensorPayload) -> impl Future<Output = ()> + Send {
        (**self).deliver(source, payload)
    }
}
