//! Alarms — hysteresis thresholds, alarm keys and the latched alarm set.
//!
//! An alarm is a latch: it is raised when a reading crosses the enter
//! threshold and stays raised until the reading crosses the (separate)
//! clear threshold. Readings inside the band between the two thresholds
//! never change the latch.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifies one latchable alarm.
///
/// Environmental alarms are global; water-leak and low-battery alarms are
/// latched per reporting sensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum AlarmKey {
    LowTemperature,
    Freezing,
    HighHumidity,
    WaterLeak(String),
    LowBattery(String),
}

impl AlarmKey {
    /// Human-readable condition name used in notification subjects.
    #[must_use]
    pub fn condition(&self) -> &'static str {
        match self {
            Self::LowTemperature => "Low temperature",
            Self::Freezing => "Freezing temperature",
            Self::HighHumidity => "High humidity",
            Self::WaterLeak(_) => "Water leak",
            Self::LowBattery(_) => "Low battery",
        }
    }

    /// The reporting sensor for per-source alarms.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::WaterLeak(source) | Self::LowBattery(source) => Some(source),
            Self::LowTemperature | Self::Freezing | Self::HighHumidity => None,
        }
    }
}

impl fmt::Display for AlarmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source() {
            Some(source) => write!(f, "{} ({source})", self.condition()),
            None => f.write_str(self.condition()),
        }
    }
}

/// Direction of a latch change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Raised,
    Cleared,
}

/// Evaluate an alarm that is raised by *low* values.
///
/// Raises when `value < enter_below`, clears when `value > clear_above`;
/// anything in between keeps the current latch.
#[must_use]
pub fn low_band(value: f64, enter_below: f64, clear_above: f64, latched: bool) -> Option<Transition> {
    if !latched && value < enter_below {
        Some(Transition::Raised)
    } else if latched && value > clear_above {
        Some(Transition::Cleared)
    } else {
        None
    }
}

/// Evaluate an alarm that is raised by *high* values.
///
/// Raises when `value > enter_above`, clears when `value < clear_below`.
#[must_use]
pub fn high_band(
    value: f64,
    enter_above: f64,
    clear_below: f64,
    latched: bool,
) -> Option<Transition> {
    if !latched && value > enter_above {
        Some(Transition::Raised)
    } else if latched && value < clear_below {
        Some(Transition::Cleared)
    } else {
        None
    }
}

/// Thresholds and hysteresis widths for the environmental alarms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmThresholds {
    /// Low-temperature alarm enters below this value (°C).
    pub low_temperature: f64,
    /// High-humidity alarm enters above this value (%).
    pub high_humidity: f64,
    /// Width of the temperature clear band (°C).
    pub temperature_hysteresis: f64,
    /// Width of the humidity clear band (%).
    pub humidity_hysteresis: f64,
}

impl Default for AlarmThresholds {
    fn default() -> Self {
        Self {
            low_temperature: 10.0,
            high_humidity: 85.0,
            temperature_hysteresis: 1.0,
            humidity_hysteresis: 2.0,
        }
    }
}

impl AlarmThresholds {
    /// Freezing point the freezing alarm is measured against (°C).
    pub const FREEZING: f64 = 0.0;

    /// Check that both hysteresis widths are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHysteresis`] otherwise.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for width in [self.temperature_hysteresis, self.humidity_hysteresis] {
            if !width.is_finite() || width < 0.0 {
                return Err(ValidationError::InvalidHysteresis(width));
            }
        }
        Ok(())
    }
}

/// The set of currently latched alarms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmSet {
    latched: BTreeSet<AlarmKey>,
}

impl AlarmSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_latched(&self, key: &AlarmKey) -> bool {
        self.latched.contains(key)
    }

    /// Apply a transition, returning whether the latch actually changed.
    pub fn apply(&mut self, key: &AlarmKey, transition: Transition) -> bool {
        match transition {
            Transition::Raised => self.latched.insert(key.clone()),
            Transition::Cleared => self.latched.remove(key),
        }
    }

    /// Latched keys in stable order.
    pub fn iter(&self) -> impl Iterator<Item = &AlarmKey> {
        self.latched.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.latched.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latched.is_empty()
    }
}

/// An outbound message produced by an alarm transition or a sensor report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Notification for a latch transition: `"<condition> detected"` or
    /// `"<condition> resolved"`, suffixed with the source for per-source alarms.
    #[must_use]
    pub fn for_transition(key: &AlarmKey, transition: Transition, body: impl Into<String>) -> Self {
        let verb = match transition {
            Transition::Raised => "detected",
            Transition::Cleared => "resolved",
        };
        let subject = match key.source() {
            Some(source) => format!("{} {verb} for {source}", key.condition()),
            None => format!("{} {verb}", key.condition()),
        };
        Self {
            subject,
            body: body.into(),
        }
    }
}
