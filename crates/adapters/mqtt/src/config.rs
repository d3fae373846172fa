//! MQTT integration configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the MQTT integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Topic prefix of the zigbee bridge (`<base_topic>/<device>`).
    pub base_topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Sensors whose status topics are subscribed to.
    pub sensors: Vec<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "duskhub".to_string(),
            base_topic: "zigbee2mqtt".to_string(),
            keep_alive_secs: 30,
            sensors: Vec::new(),
        }
    }
}

impl MqttConfig {
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(u64::from(self.keep_alive_secs))
    }
}
