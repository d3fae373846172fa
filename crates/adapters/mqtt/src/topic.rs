//! Topic layout of the zigbee bridge.
//!
//! Sensors publish their status on `<base>/<sensor>`; devices are commanded
//! on `<base>/<device>/set/state`.

/// Topic a device listens on for `ON`/`OFF`.
#[must_use]
pub fn command_topic(base: &str, device: &str) -> String {
    format!("{base}/{device}/set/state")
}

/// Status topic of a sensor.
#[must_use]
pub fn status_topic(base: &str, sensor: &str) -> String {
    format!("{base}/{sensor}")
}

/// The sensor name of a status topic, if `topic` is one.
///
/// Sub-topics (`<base>/<name>/set`, `<base>/bridge/...`) are not status
/// topics.
#[must_use]
pub fn sensor_name<'a>(base: &str, topic: &'a str) -> Option<&'a str> {
    let name = topic.strip_prefix(base)?.strip_prefix('/')?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_command_topic() {
        assert_eq!(
            command_topic("zigbee2mqtt", "porch_plug"),
            "zigbee2mqtt/porch_plug/set/state"
        );
    }

    #[test]
    fn should_extract_sensor_from_status_topic() {
        assert_eq!(sensor_name("zigbee2mqtt", "zigbee2mqtt/living"), Some("living"));
    }

    #[test]
    fn should_reject_sub_topics_and_foreign_prefixes() {
        assert_eq!(sensor_name("zigbee2mqtt", "zigbee2mqtt/living/set"), None);
        assert_eq!(sensor_name("zigbee2mqtt", "zigbee2mqtt/"), None);
        assert_eq!(sensor_name("zigbee2mqtt", "zigbee2mqttx/living"), None);
        assert_eq!(sensor_name("zigbee2mqtt", "other/living"), None);
    }
}
