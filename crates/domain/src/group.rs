//! Device group — a named set of switchable devices sharing one schedule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DuskHubError, ValidationError};
use crate::schedule::{ClockTime, TimeMode};

/// Commanded on/off state of a group or device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    On,
    #[default]
    Off,
}

impl SwitchState {
    /// Payload understood by the device firmware (`ON` / `OFF`).
    #[must_use]
    pub fn as_command(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// A named set of devices switched together on one schedule.
///
/// `state` is the last *requested* state, not a confirmed one: the devices
/// do not acknowledge commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub name: String,
    pub devices: Vec<String>,
    pub state: SwitchState,
    pub on_mode: TimeMode,
    pub off_mode: TimeMode,
    pub on_time: ClockTime,
    pub off_time: ClockTime,
    pub timer_enabled: bool,
}

impl DeviceGroup {
    /// Create a builder for constructing a [`DeviceGroup`].
    #[must_use]
    pub fn builder() -> DeviceGroupBuilder {
        DeviceGroupBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `devices` is empty ([`ValidationError::NoDevices`])
    /// - a device id is blank ([`ValidationError::EmptyDeviceId`])
    pub fn validate(&self) -> Result<(), DuskHubError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.devices.is_empty() {
            return Err(ValidationError::NoDevices.into());
        }
        if self.devices.iter().any(|d| d.trim().is_empty()) {
            return Err(ValidationError::EmptyDeviceId.into());
        }
        Ok(())
    }
}

impl fmt::Display for DeviceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.devices.join(", "))
    }
}

/// Step-by-step builder for [`DeviceGroup`].
///
/// Defaults: on at dusk, off at a fixed 23:00 (fixed on time 18:00),
/// timer disabled, commanded state off.
#[derive(Debug, Default)]
pub struct DeviceGroupBuilder {
    name: Option<String>,
    devices: Vec<String>,
    on_mode: Option<TimeMode>,
    off_mode: Option<TimeMode>,
    on_time: Option<ClockTime>,
    off_time: Option<ClockTime>,
    timer_enabled: bool,
}

impl DeviceGroupBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a device id; duplicates are ignored, first position wins.
    #[must_use]
    pub fn device(mut self, device: impl Into<String>) -> Self {
        let device = device.into();
        if !self.devices.contains(&device) {
            self.devices.push(device);
        }
        self
    }

    #[must_use]
    pub fn devices<I, S>(self, devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        devices
            .into_iter()
            .fold(self, |builder, device| builder.device(device))
    }

    #[must_use]
    pub fn on_mode(mut self, mode: TimeMode) -> Self {
        self.on_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn off_mode(mut self, mode: TimeMode) -> Self {
        self.off_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn on_time(mut self, time: ClockTime) -> Self {
        self.on_time = Some(time);
        self
    }

    #[must_use]
    pub fn off_time(mut self, time: ClockTime) -> Self {
        self.off_time = Some(time);
        self
    }

    #[must_use]
    pub fn timer_enabled(mut self, enabled: bool) -> Self {
        self.timer_enabled = enabled;
        self
    }

    /// Consume the builder, validate, and return a [`DeviceGroup`].
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<DeviceGroup, DuskHubError> {
        let group = DeviceGroup {
            name: self.name.unwrap_or_default(),
            devices: self.devices,
            state: SwitchState::Off,
            on_mode: self.on_mode.unwrap_or(TimeMode::Dusk),
            off_mode: self.off_mode.unwrap_or(TimeMode::Fixed),
            on_time: self.on_time.map_or_else(|| ClockTime::new(18, 0), Ok)?,
            off_time: self.off_time.map_or_else(|| ClockTime::new(23, 0), Ok)?,
            timer_enabled: self.timer_enabled,
        };
        group.validate()?;
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_group_with_default_schedule() {
        let group = DeviceGroup::builder()
            .name("outlets")
            .device("plug_1")
            .build()
            .unwrap();
        assert_eq!(group.state, SwitchState::Off);
        assert_eq!(group.on_mode, TimeMode::Dusk);
        assert_eq!(group.off_mode, TimeMode::Fixed);
        assert_eq!(group.on_time.to_string(), "18:00");
        assert_eq!(group.off_time.to_string(), "23:00");
        assert!(!group.timer_enabled);
    }

    #[test]
    fn should_reject_group_without_devices() {
        let result = DeviceGroup::builder().name("empty").build();
        assert!(matches!(
            result,
            Err(DuskHubError::Validation(ValidationError::NoDevices))
        ));
    }

    #[test]
    fn should_reject_group_without_name() {
        let result = DeviceGroup::builder().device("a").build();
        assert!(matches!(
            result,
            Err(DuskHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_reject_blank_device_id() {
        let result = DeviceGroup::builder().name("g").device("  ").build();
        assert!(matches!(
            result,
            Err(DuskHubError::Validation(ValidationError::EmptyDeviceId))
        ));
    }

    #[test]
    fn should_keep_device_order_and_drop_duplicates() {
        let group = DeviceGroup::builder()
            .name("lights")
            .devices(["b", "a", "b", "c"])
            .build()
            .unwrap();
        assert_eq!(group.devices, vec!["b", "a", "c"]);
        assert_eq!(group.to_string(), "b, a, c");
    }

    #[test]
    fn should_render_switch_state_as_device_command() {
        assert_eq!(SwitchState::On.as_command(), "ON");
        assert_eq!(SwitchState::Off.as_command(), "OFF");
    }
}
