//! Schedule — time modes, wall-clock times and scheduled transition events.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::group::SwitchState;
use crate::id::EventId;
use crate::time::Timestamp;

/// How the next on/off instant of a group is resolved.
///
/// The set is closed: configuration or admin input naming any other mode is
/// rejected before it reaches the scheduling engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    /// A configured wall-clock hour and minute.
    Fixed,
    /// Civil dusk at the configured location.
    Dusk,
    /// Civil dawn at the configured location.
    Dawn,
}

impl fmt::Display for TimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => f.write_str("fixed"),
            Self::Dusk => f.write_str("dusk"),
            Self::Dawn => f.write_str("dawn"),
        }
    }
}

impl FromStr for TimeMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "dusk" => Ok(Self::Dusk),
            "dawn" => Ok(Self::Dawn),
            _ => Err(ValidationError::UnknownTimeMode(s.to_string())),
        }
    }
}

/// A validated wall-clock hour and minute (seconds are always zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Build a clock time.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHour`] or
    /// [`ValidationError::InvalidMinute`] when out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        if hour > 23 {
            return Err(ValidationError::InvalidHour(hour));
        }
        if minute > 59 {
            return Err(ValidationError::InvalidMinute(minute));
        }
        Ok(Self { hour, minute })
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.minute
    }

    /// The time of day at second zero.
    #[must_use]
    pub fn as_naive(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidClockTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse().map_err(|_| invalid())?;
        let minute = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// What a scheduled event does when it fires.
///
/// The derived ordering puts [`FireOff`](Self::FireOff) before
/// [`FireOn`](Self::FireOn): when both resolve to the same instant the OFF
/// transition is processed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    FireOff,
    FireOn,
}

impl Action {
    /// The commanded state this action drives the group to.
    #[must_use]
    pub fn target_state(self) -> SwitchState {
        match self {
            Self::FireOn => SwitchState::On,
            Self::FireOff => SwitchState::Off,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FireOn => f.write_str("fire_on"),
            Self::FireOff => f.write_str("fire_off"),
        }
    }
}

/// A pending transition for one device group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: EventId,
    pub at: Timestamp,
    pub action: Action,
    pub group: String,
}

impl ScheduledEvent {
    /// Create a new event with a fresh id.
    #[must_use]
    pub fn new(group: impl Into<String>, action: Action, at: Timestamp) -> Self {
        Self {
            id: EventId::new(),
            at,
            action,
            group: group.into(),
        }
    }

    /// Whether the event should fire at `now`.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn should_parse_time_mode_case_insensitively() {
        assert_eq!("Dusk".parse::<TimeMode>(), Ok(TimeMode::Dusk));
        assert_eq!(" fixed ".parse::<TimeMode>(), Ok(TimeMode::Fixed));
    }

    #[test]
    fn should_reject_unknown_time_mode() {
        assert_eq!(
            "noon".parse::<TimeMode>(),
            Err(ValidationError::UnknownTimeMode("noon".to_string()))
        );
    }

    #[test]
    fn should_reject_unknown_time_mode_when_deserializing() {
        let result: Result<TimeMode, _> = serde_json::from_str("\"sunset\"");
        assert!(result.is_err());
    }

    #[test]
    fn should_parse_clock_time() {
        let t: ClockTime = "23:05".parse().unwrap();
        assert_eq!(t.hour(), 23);
        assert_eq!(t.minute(), 5);
        assert_eq!(t.to_string(), "23:05");
    }

    #[test]
    fn should_reject_out_of_range_clock_time() {
        assert_eq!(ClockTime::new(24, 0), Err(ValidationError::InvalidHour(24)));
        assert_eq!(
            ClockTime::new(7, 60),
            Err(ValidationError::InvalidMinute(60))
        );
        assert!("7h30".parse::<ClockTime>().is_err());
    }

    #[test]
    fn should_order_fire_off_before_fire_on() {
        assert!(Action::FireOff < Action::FireOn);
    }

    #[test]
    fn should_map_action_to_target_state() {
        assert_eq!(Action::FireOn.target_state(), SwitchState::On);
        assert_eq!(Action::FireOff.target_state(), SwitchState::Off);
    }

    #[test]
    fn should_be_due_at_or_after_trigger_instant() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 19, 45, 0).unwrap();
        let event = ScheduledEvent::new("porch", Action::FireOn, at);
        assert!(!event.is_due(at - chrono::Duration::seconds(1)));
        assert!(event.is_due(at));
        assert!(event.is_due(at + chrono::Duration::seconds(1)));
    }
}
