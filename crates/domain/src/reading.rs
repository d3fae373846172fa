//! Sensor readings — sparse environmental values and the raw status payload.

use serde::{Deserialize, Serialize};

use crate::id::ReadingId;
use crate::time::Timestamp;

/// Environmental values from one reporting cycle.
///
/// Every field is independently optional: `None` means "no new value this
/// cycle", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// Air pressure in hPa.
    pub pressure: Option<f64>,
}

impl SensorReading {
    /// Whether the reading carries no value at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.humidity.is_none() && self.pressure.is_none()
    }

    /// Overlay the values present in `newer` on top of `self`.
    pub fn merge(&mut self, newer: &SensorReading) {
        if newer.temperature.is_some() {
            self.temperature = newer.temperature;
        }
        if newer.humidity.is_some() {
            self.humidity = newer.humidity;
        }
        if newer.pressure.is_some() {
            self.pressure = newer.pressure;
        }
    }
}

/// A reading persisted at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedReading {
    pub id: ReadingId,
    pub recorded_at: Timestamp,
    #[serde(flatten)]
    pub reading: SensorReading,
}

impl RecordedReading {
    #[must_use]
    pub fn new(reading: SensorReading, recorded_at: Timestamp) -> Self {
        Self {
            id: ReadingId::new(),
            recorded_at,
            reading,
        }
    }
}

/// Status object published by a sensor.
///
/// Sensors report sparse JSON objects such as
/// `{"battery":100,"humidity":69.72,"linkquality":180,"temperature":25.93}`;
/// unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorPayload {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub water_leak: Option<bool>,
    pub battery_low: Option<bool>,
    pub battery: Option<f64>,
    pub linkquality: Option<f64>,
    pub action: Option<String>,
}

impl SensorPayload {
    /// Parse a JSON status object.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when the payload is not a
    /// JSON object of the expected shape.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// The environmental part of the payload.
    #[must_use]
    pub fn reading(&self) -> SensorReading {
        SensorReading {
            temperature: self.temperature,
            humidity: self.humidity,
            pressure: self.pressure,
        }
    }
}
