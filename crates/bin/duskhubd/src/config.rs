//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `duskhub.toml` in the working directory, or the file named by
//! `DUSKHUB_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use duskhub_adapter_mail::MailConfig;
use duskhub_adapter_mqtt::MqttConfig;
use duskhub_adapter_solar::Location;
use duskhub_app::recorder::RecorderSettings;
use duskhub_domain::alarm::AlarmThresholds;
use duskhub_domain::error::DuskHubError;
use duskhub_domain::group::DeviceGroup;
use duskhub_domain::schedule::{ClockTime, TimeMode};
use duskhub_domain::time;

/// Default configuration file name.
const DEFAULT_PATH: &str = "duskhub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Time zone and location of the installation.
    pub site: SiteConfig,
    /// MQTT broker settings.
    pub mqtt: MqttConfig,
    /// Alarm thresholds.
    pub alarms: AlarmsConfig,
    /// Reading recorder cadence.
    pub recorder: RecorderConfig,
    /// Notification mail settings.
    pub mail: MailConfig,
    /// Scheduled device groups.
    pub groups: Vec<GroupConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Installation site.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// IANA time zone name. Fixed times and the dusk/dawn date are local to it.
    pub timezone: String,
    /// Place name used to look up coordinates.
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Alarm thresholds, in the units the sensors report.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AlarmsConfig {
    pub low_temp_threshold: f64,
    pub high_humidity_threshold: f64,
    pub temperature_hysteresis: f64,
    pub humidity_hysteresis: f64,
}

/// Reading recorder cadence and retention.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub sample_period_secs: u64,
    pub initial_delay_secs: u64,
    pub retention_days: u32,
}

/// One `[[groups]]` entry. Omitted schedule fields keep the group defaults:
/// on at dusk, off at a fixed 23:00.
#[derive(Debug, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub devices: Vec<String>,
    pub on_mode: Option<TimeMode>,
    pub off_mode: Option<TimeMode>,
    pub on_time: Option<ClockTime>,
    pub off_time: Option<ClockTime>,
    #[serde(default)]
    pub timer_enabled: bool,
}

impl Config {
    /// Load configuration from `duskhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails [validation](Self::validate).
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("DUSKHUB_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DUSKHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("DUSKHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("DUSKHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("DUSKHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.recorder.sample_period_secs == 0 {
            return Err(ConfigError::Validation(
                "recorder sample period must be non-zero".to_string(),
            ));
        }
        self.site.time_zone()?;
        self.alarms
            .thresholds()
            .validate()
            .map_err(DuskHubError::from)?;
        self.device_groups()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Build the configured device groups.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Domain`] for an invalid group and
    /// [`ConfigError::Validation`] for a duplicated group name.
    pub fn device_groups(&self) -> Result<Vec<DeviceGroup>, ConfigError> {
        let mut seen = BTreeSet::new();
        let mut groups = Vec::with_capacity(self.groups.len());
        for entry in &self.groups {
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "group {:?} is defined twice",
                    entry.name
                )));
            }
            groups.push(entry.to_group()?);
        }
        Ok(groups)
    }
}

impl SiteConfig {
    /// Parse the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Domain`] for a name missing from the time zone
    /// database.
    pub fn time_zone(&self) -> Result<Tz, ConfigError> {
        time::parse_time_zone(&self.timezone).map_err(|err| ConfigError::Domain(err.into()))
    }

    #[must_use]
    pub fn location(&self) -> Location {
        Location {
            name: self.location.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl AlarmsConfig {
    #[must_use]
    pub fn thresholds(&self) -> AlarmThresholds {
        AlarmThresholds {
            low_temperature: self.low_temp_threshold,
            high_humidity: self.high_humidity_threshold,
            temperature_hysteresis: self.temperature_hysteresis,
            humidity_hysteresis: self.humidity_hysteresis,
        }
    }
}

impl RecorderConfig {
    #[must_use]
    pub fn settings(&self) -> RecorderSettings {
        RecorderSettings {
            period: Duration::from_secs(self.sample_period_secs),
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            retention: chrono::Duration::days(i64::from(self.retention_days)),
        }
    }
}

impl GroupConfig {
    fn to_group(&self) -> Result<DeviceGroup, ConfigError> {
        let mut builder = DeviceGroup::builder()
            .name(&self.name)
            .devices(&self.devices)
            .timer_enabled(self.timer_enabled);
        if let Some(mode) = self.on_mode {
            builder = builder.on_mode(mode);
        }
        if let Some(mode) = self.off_mode {
            builder = builder.off_mode(mode);
        }
        if let Some(time) = self.on_time {
            builder = builder.on_time(time);
        }
        if let Some(time) = self.off_time {
            builder = builder.off_time(time);
        }
        Ok(builder.build()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:duskhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "duskhubd=info,duskhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        let location = Location::default();
        Self {
            timezone: "America/Toronto".to_string(),
            location: location.name,
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

impl Default for AlarmsConfig {
    fn default() -> Self {
        let thresholds = AlarmThresholds::default();
        Self {
            low_temp_threshold: thresholds.low_temperature,
            high_humidity_threshold: thresholds.high_humidity,
            temperature_hysteresis: thresholds.temperature_hysteresis,
            humidity_hysteresis: thresholds.humidity_hysteresis,
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_period_secs: 180,
            initial_delay_secs: 10,
            retention_days: 365,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure, including unknown modes and malformed `HH:MM`.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A value rejected by the domain model.
    #[error("invalid configuration")]
    Domain(#[from] DuskHubError),
}
