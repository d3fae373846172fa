//! Broker event loop: (re)subscribes to sensor topics and forwards status
//! payloads to a [`SensorInbox`].

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};

use duskhub_app::ports::SensorInbox;
use duskhub_domain::reading::SensorPayload;

use crate::config::MqttConfig;
use crate::error::MqttError;
use crate::topic;

/// Pause before polling again after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Owns the rumqttc event loop. Run it on its own task.
pub struct MqttListener<I> {
    client: AsyncClient,
    // Wrapped so the listener is `Sync` (EventLoop is only `Send`); accessed
    // via `get_mut`, never locked.
    eventloop: tokio::sync::Mutex<EventLoop>,
    base_topic: String,
    sensors: Vec<String>,
    inbox: I,
}

impl<I: SensorInbox> MqttListener<I> {
    #[must_use]
    pub fn new(client: AsyncClient, eventloop: EventLoop, config: &MqttConfig, inbox: I) -> Self {
        Self {
            client,
            eventloop: tokio::sync::Mutex::new(eventloop),
            base_topic: config.base_topic.clone(),
            sensors: config.sensors.clone(),
            inbox,
        }
    }

    /// Poll the broker forever. Connection errors are logged and rumqttc
    /// reconnects on the next poll.
    pub async fn run(mut self) {
        loop {
            match self.eventloop.get_mut().poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if let Err(err) = self.handle_message(&publish.topic, &publish.payload).await {
                        tracing::warn!(topic = %publish.topic, error = %err, "ignoring MQTT message");
                    }
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("MQTT connected");
                    self.subscribe_all().await;
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    tracing::warn!("MQTT disconnected");
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(error = %err, "MQTT connection error");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    /// Subscriptions are re-issued on every connection acknowledgement since
    /// the broker may have dropped the session.
    async fn subscribe_all(&self) {
        for sensor in &self.sensors {
            let status = topic::status_topic(&self.base_topic, sensor);
            match self.client.subscribe(&status, QoS::AtMostOnce).await {
                Ok(()) => tracing::debug!(topic = %status, "subscribed"),
                Err(err) => tracing::error!(topic = %status, error = %err, "subscribe failed"),
            }
        }
    }

    /// Parse one status message and hand it to the inbox.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::UnexpectedTopic`] when the topic is not a sensor
    /// status topic, or [`MqttError::PayloadParse`] for a malformed payload.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) -> Result<(), MqttError> {
        let source = topic::sensor_name(&self.base_topic, topic)
            .ok_or_else(|| MqttError::UnexpectedTopic(topic.to_string()))?;
        let payload = SensorPayload::from_json(payload).map_err(MqttError::PayloadParse)?;
        tracing::debug!(%source, "sensor message received");
        self.inbox.deliver(source, payload).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::MqttOptions;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use duskhub_app::alarm_engine::AlarmEngine;
    use duskhub_app::notification_queue::NotificationQueue;
    use duskhub_app::ports::NotificationSink;
    use duskhub_app::recorder::SensorSnapshot;
    use duskhub_app::services::sensor_service::SensorService;
    use duskhub_domain::alarm::{AlarmKey, AlarmThresholds, Notification};

    #[derive(Default)]
    struct RecordingInbox {
        received: Mutex<Vec<(String, SensorPayload)>>,
    }

    impl SensorInbox for RecordingInbox {
        fn deliver(&self, source: &str, payload: SensorPayload) -> impl Future<Output = ()> + Send {
            self.received
                .lock()
                .unwrap()
                .push((source.to_string(), payload));
            async {}
        }
    }

    fn listener() -> MqttListener<RecordingInbox> {
        let (client, eventloop) =
            AsyncClient::new(MqttOptions::new("test-listener", "127.0.0.1", 1883), 10);
        let config = MqttConfig {
            sensors: vec!["living".to_string()],
            ..MqttConfig::default()
        };
        MqttListener::new(client, eventloop, &config, RecordingInbox::default())
    }

    #[tokio::test]
    async fn should_deliver_parsed_status_payload() {
        let listener = listener();

        listener
            .handle_message("zigbee2mqtt/living", br#"{"temperature":21.5,"linkquality":120}"#)
            .await
            .unwrap();

        let received = listener.inbox.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "living");
        assert_eq!(received[0].1.temperature, Some(21.5));
    }

    #[tokio::test]
    async fn should_reject_non_status_topic() {
        let listener = listener();
        let err = listener
            .handle_message("zigbee2mqtt/bridge/state", b"online")
            .await
            .unwrap_err();
        assert!(matches!(err, MqttError::UnexpectedTopic(_)));
        assert!(listener.inbox.received.lock().unwrap().is_empty());
    }

    /// A mail relay that never answers.
    struct StalledSink;

    impl NotificationSink for StalledSink {
        fn send(&self, _notification: Notification) -> impl Future<Output = ()> + Send {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn should_return_promptly_while_mail_relay_is_stalled() {
        let (queue, worker) = NotificationQueue::new(StalledSink);
        tokio::spawn(worker.run());
        let sensors = Arc::new(SensorService::new(
            Arc::new(SensorSnapshot::new()),
            AlarmEngine::new(AlarmThresholds::default(), queue),
        ));
        let (client, eventloop) =
            AsyncClient::new(MqttOptions::new("test-listener", "127.0.0.1", 1883), 10);
        let config = MqttConfig {
            sensors: vec!["basement".to_string()],
            ..MqttConfig::default()
        };
        let listener = MqttListener::new(client, eventloop, &config, Arc::clone(&sensors));

        tokio::time::timeout(
            Duration::from_secs(1),
            listener.handle_message("zigbee2mqtt/basement", br#"{"water_leak":true}"#),
        )
        .await
        .expect("message handling must not wait on mail delivery")
        .unwrap();

        assert_eq!(
            sensors.active_alarms(),
            vec![AlarmKey::WaterLeak("basement".to_string())]
        );
    }

    #[tokio::test]
    async fn should_reject_malformed_payload() {
        let listener = listener();
        let err = listener
            .handle_message("zigbee2mqtt/living", b"not json")
            .await
            .unwrap_err();
        assert!(matches!(err, MqttError::PayloadParse(_)));
    }
}
