//! Device controller — fans a group's desired state out to its devices.

use duskhub_domain::error::DuskHubError;
use duskhub_domain::group::{DeviceGroup, SwitchState};

use crate::ports::CommandPublisher;

/// Result of commanding a single device.
#[derive(Debug)]
pub struct DeviceOutcome {
    pub device: String,
    pub result: Result<(), DuskHubError>,
}

/// Sends on/off commands to every device of a group.
pub struct DeviceController<P> {
    publisher: P,
}

impl<P: CommandPublisher> DeviceController<P> {
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    /// Command every device of `group` to `desired`, in declaration order.
    ///
    /// A failing device is logged and does not stop the remaining ones. The
    /// group's recorded state becomes `desired` whatever the per-device
    /// outcomes were, since devices never acknowledge commands anyway.
    pub async fn command_all(
        &self,
        group: &mut DeviceGroup,
        desired: SwitchState,
    ) -> Vec<DeviceOutcome> {
        let mut outcomes = Vec::with_capacity(group.devices.len());
        for device in &group.devices {
            let result = self.publisher.publish(device, desired).await;
            match &result {
                Ok(()) => tracing::debug!(group = %group.name, %device, state = %desired, "device commanded"),
                Err(err) => tracing::error!(
                    group = %group.name,
                    %device,
                    state = %desired,
                    error = %err,
                    "failed to command device"
                ),
            }
            outcomes.push(DeviceOutcome {
                device: device.clone(),
                result,
            });
        }
        group.state = desired;
        tracing::info!(group = %group.name, devices = %group, state = %desired, "group switched");
        outcomes
    }
}
