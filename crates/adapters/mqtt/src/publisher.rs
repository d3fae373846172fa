//! [`CommandPublisher`] over MQTT.

use std::future::Future;

use rumqttc::{AsyncClient, QoS};

use duskhub_app::ports::CommandPublisher;
use duskhub_domain::error::DuskHubError;
use duskhub_domain::group::SwitchState;

use crate::error::MqttError;
use crate::topic;

/// Publishes `ON`/`OFF` on `<base_topic>/<device>/set/state`.
///
/// Commands are sent with QoS 0 and are not retained: a device that is
/// offline when the command goes out simply misses it. Publishing never
/// waits on the request channel; a full channel (broker down, event loop
/// behind) fails the command instead.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    base_topic: String,
}

impl MqttPublisher {
    #[must_use]
    pub fn new(client: AsyncClient, base_topic: impl Into<String>) -> Self {
        Self {
            client,
            base_topic: base_topic.into(),
        }
    }
}

impl CommandPublisher for MqttPublisher {
    fn publish(
        &self,
        device: &str,
        state: SwitchState,
    ) -> impl Future<Output = Result<(), DuskHubError>> + Send {
        let topic = topic::command_topic(&self.base_topic, device);
        tracing::debug!(%topic, command = state.as_command(), "publishing device command");
        let result = self
            .client
            .try_publish(topic, QoS::AtMostOnce, false, state.as_command())
            .map_err(|err| DuskHubError::from(MqttError::Client(err)));
        async move { result }
    }
}
