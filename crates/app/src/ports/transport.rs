//! Transport port — commands sent to switchable devices.

use std::future::Future;

use duskhub_domain::error::DuskHubError;
use duskhub_domain::group::SwitchState;

/// Publishes on/off commands to individual devices.
///
/// Delivery is at-most-once and unacknowledged: `Ok` means the command was
/// handed to the transport, not that the device switched.
pub trait CommandPublisher {
    /// Command `device` to `state`.
    fn publish(
        &self,
        device: &str,
        state: SwitchState,
    ) -> impl Future<Output = Result<(), DuskHubError>> + Send;
}

impl<T: CommandPublisher + Send + Sync> CommandPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        device: &str,
        state: SwitchState,
    ) -> impl Future<Output = Result<(), DuskHubError>> + Send {
        (**self).publish(device, state)
    }
}
