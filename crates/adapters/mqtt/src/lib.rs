//! # duskhub-adapter-mqtt
//!
//! MQTT adapter — talks to a zigbee2mqtt bridge through [rumqttc](https://docs.rs/rumqttc).
//!
//! ## Responsibilities
//! - Connect to the MQTT broker
//! - Publish device commands (`<base>/<device>/set/state` ← `ON`/`OFF`)
//! - Subscribe to sensor status topics and forward parsed payloads to a
//!   [`SensorInbox`](duskhub_app::ports::SensorInbox)
//!
//! ## Dependency rule
//! Same as other adapters: depends on `duskhub-app` and `duskhub-domain`.

pub mod config;
pub mod error;
pub mod listener;
pub mod publisher;
pub mod topic;

use rumqttc::{AsyncClient, MqttOptions};

use duskhub_app::ports::SensorInbox;

pub use config::MqttConfig;
pub use error::MqttError;
pub use listener::MqttListener;
pub use publisher::MqttPublisher;

/// Capacity of the rumqttc request channel.
const REQUEST_CAPACITY: usize = 20;

/// Create the client pair. Nothing touches the network until
/// [`MqttListener::run`] polls the event loop.
pub fn connect<I: SensorInbox>(config: &MqttConfig, inbox: I) -> (MqttPublisher, MqttListener<I>) {
    let mut options = MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
    options.set_keep_alive(config.keep_alive());
    let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
    let publisher = MqttPublisher::new(client.clone(), config.base_topic.clone());
    let listener = MqttListener::new(client, eventloop, config, inbox);
    (publisher, listener)
}
