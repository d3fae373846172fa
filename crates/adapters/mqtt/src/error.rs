//! MQTT adapter error types.

use duskhub_domain::error::DuskHubError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client rejected a request: its queue is full or closed.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// Failed to parse an incoming MQTT payload as a sensor status object.
    #[error("failed to parse MQTT payload")]
    PayloadParse(#[source] serde_json::Error),

    /// A message arrived on a topic that does not name a sensor.
    #[error("unexpected topic {0:?}")]
    UnexpectedTopic(String),
}

impl From<MqttError> for DuskHubError {
    fn from(err: MqttError) -> Self {
        DuskHubError::Transport(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unexpected_topic() {
        let err = MqttError::UnexpectedTopic("other/x".to_string());
        assert_eq!(err.to_string(), "unexpected topic \"other/x\"");
    }

    #[test]
    fn should_convert_into_transport_error() {
        let err: DuskHubError = MqttError::UnexpectedTopic("x".to_string()).into();
        assert!(matches!(err, DuskHubError::Transport(_)));
    }

    #[test]
    fn should_display_payload_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad").unwrap_err();
        let err = MqttError::PayloadParse(json_err);
        assert_eq!(err.to_string(), "failed to parse MQTT payload");
    }
}
