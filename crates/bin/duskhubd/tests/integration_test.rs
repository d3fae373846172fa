//! End-to-end smoke tests for the full duskhubd stack.
//!
//! Each test wires the complete application (in-memory `SQLite`, real
//! recorder, real alarm engine and mail queue behind the MQTT listener, real sunrise almanac,
//! real axum router) and exercises it via `tower::ServiceExt::oneshot`. No
//! TCP port is bound and no broker is contacted: sensor messages are handed
//! straight to the listener and device commands land in a recorder.

use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use duskhub_adapter_http_axum::router;
use duskhub_adapter_http_axum::state::AppState;
use duskhub_adapter_mail::{MailConfig, SmtpNotifier};
use duskhub_adapter_mqtt::{MqttConfig, MqttListener};
use duskhub_adapter_solar::{Location, SunriseCalculator};
use duskhub_adapter_storage_sqlite_sqlx::{Config, SqliteReadingRepository};
use duskhub_app::alarm_engine::AlarmEngine;
use duskhub_app::almanac::AlmanacOracle;
use duskhub_app::notification_queue::NotificationQueue;
use duskhub_app::ports::CommandPublisher;
use duskhub_app::recorder::{Recorder, RecorderSettings, SampleOutcome, SensorSnapshot};
use duskhub_app::schedule_queue::ScheduleQueue;
use duskhub_app::services::group_service::GroupService;
use duskhub_app::services::sensor_service::SensorService;
use duskhub_domain::alarm::AlarmThresholds;
use duskhub_domain::error::DuskHubError;
use duskhub_domain::group::{DeviceGroup, SwitchState};
use duskhub_domain::time;

#[derive(Default)]
struct RecordingPublisher {
    sent: Mutex<Vec<(String, SwitchState)>>,
}

impl CommandPublisher for RecordingPublisher {
    fn publish(
        &self,
        device: &str,
        state: SwitchState,
    ) -> impl Future<Output = Result<(), DuskHubError>> + Send {
        self.sent.lock().unwrap().push((device.to_string(), state));
        async { Ok(()) }
    }
}

type Sensors = Arc<SensorService<NotificationQueue>>;

struct Harness {
    app: axum::Router,
    mqtt: MqttListener<Sensors>,
    recorder: Recorder<Arc<SqliteReadingRepository>>,
    groups: Arc<GroupService<Arc<AlmanacOracle<SunriseCalculator>>, Arc<RecordingPublisher>>>,
    publisher: Arc<RecordingPublisher>,
}

/// Build a fully-wired stack backed by an in-memory `SQLite` database.
async fn harness() -> Harness {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");
    let readings = Arc::new(SqliteReadingRepository::new(db.pool().clone()));

    let snapshot = Arc::new(SensorSnapshot::new());
    let notifier = SmtpNotifier::new(MailConfig::default()).unwrap();
    let (notifications, mail_worker) = NotificationQueue::new(notifier);
    tokio::spawn(mail_worker.run());
    let sensors = Arc::new(SensorService::new(
        Arc::clone(&snapshot),
        AlarmEngine::new(AlarmThresholds::default(), notifications),
    ));

    let mqtt_config = MqttConfig {
        sensors: vec!["living".to_string(), "basement".to_string()],
        ..MqttConfig::default()
    };
    let (_, mqtt) = duskhub_adapter_mqtt::connect(&mqtt_config, Arc::clone(&sensors));

    let tz = chrono_tz::America::Toronto;
    let almanac = Arc::new(AlmanacOracle::new(
        SunriseCalculator::new(&Location::default()),
        tz,
    ));
    let publisher = Arc::new(RecordingPublisher::default());
    let porch = DeviceGroup::builder()
        .name("porch")
        .devices(["porch_light", "porch_plug"])
        .build()
        .unwrap();
    let groups = Arc::new(
        GroupService::new(
            vec![porch],
            Arc::new(ScheduleQueue::new()),
            almanac,
            Arc::clone(&publisher),
            tz,
        )
        .unwrap(),
    );

    let recorder = Recorder::new(
        Arc::clone(&readings),
        snapshot,
        RecorderSettings::default(),
    );
    let app = router::build(AppState::from_arcs(Arc::clone(&groups), sensors, readings));

    Harness {
        app,
        mqtt,
        recorder,
        groups,
        publisher,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let h = harness().await;
    let resp = h.app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Device groups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_expose_configured_group() {
    let h = harness().await;
    let resp = h.app.oneshot(get("/api/groups/porch")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "porch");
    assert_eq!(body["on_mode"], "dusk");
    assert_eq!(body["off_mode"], "fixed");
    assert_eq!(body["off_time"], "23:00");
    assert_eq!(body["state"], "off");
}

#[tokio::test]
async fn should_arm_exactly_one_event_when_timer_enabled() {
    let h = harness().await;
    let resp = h
        .app
        .clone()
        .oneshot(put_json("/api/groups/porch/timer", r#"{"enabled":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["timer_enabled"], true);
    let action = body["next_event"]["action"].as_str().unwrap();
    assert!(action == "fire_on" || action == "fire_off");
    assert_eq!(h.groups.queue().pending_for("porch").len(), 1);

    // enabling applies the implied state right away
    let sent = h.publisher.sent.lock().unwrap().clone();
    let devices: Vec<_> = sent.iter().map(|(device, _)| device.as_str()).collect();
    assert_eq!(devices, vec!["porch_light", "porch_plug"]);
}

#[tokio::test]
async fn should_leave_no_pending_event_after_enable_then_disable() {
    let h = harness().await;
    h.app
        .clone()
        .oneshot(put_json("/api/groups/porch/timer", r#"{"enabled":true}"#))
        .await
        .unwrap();
    let resp = h
        .app
        .oneshot(put_json("/api/groups/porch/timer", r#"{"enabled":false}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(h.groups.queue().is_empty());
}

#[tokio::test]
async fn should_reschedule_when_off_time_changes() {
    let h = harness().await;
    h.groups.set_timer("porch", true, time::now()).await.unwrap();
    let resp = h
        .app
        .oneshot(put_json(
            "/api/groups/porch/off_time",
            r#"{"hour":22,"minute":15}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["off_time"], "22:15");
    assert_eq!(h.groups.queue().pending_for("porch").len(), 1);
}

// ---------------------------------------------------------------------------
// Sensors and alarms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_raise_water_leak_alarm_from_mqtt_message() {
    let h = harness().await;
    h.mqtt
        .handle_message("zigbee2mqtt/basement", br#"{"water_leak":true,"battery":97}"#)
        .await
        .unwrap();

    let resp = h.app.oneshot(get("/api/alarms")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        serde_json::json!([{"kind": "water_leak", "source": "basement"}])
    );
}

#[tokio::test]
async fn should_acknowledge_low_battery_through_api() {
    let h = harness().await;
    h.mqtt
        .handle_message("zigbee2mqtt/living", br#"{"battery_low":true,"battery":3}"#)
        .await
        .unwrap();

    let resp = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/alarms/battery/living")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = h.app.oneshot(get("/api/alarms")).await.unwrap();
    assert_eq!(body_json(resp).await, serde_json::json!([]));
}

#[tokio::test]
async fn should_record_and_serve_sensor_readings() {
    let h = harness().await;
    h.mqtt
        .handle_message(
            "zigbee2mqtt/living",
            br#"{"temperature":21.4,"humidity":48.5,"linkquality":120}"#,
        )
        .await
        .unwrap();

    let outcome = h.recorder.sample(time::now()).await.unwrap();
    assert_eq!(outcome, SampleOutcome::Stored { pruned: 0 });

    let resp = h.app.clone().oneshot(get("/api/sensors")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["temperature"], 21.4);
    assert_eq!(body["humidity"], 48.5);

    let resp = h.app.oneshot(get("/api/readings")).await.unwrap();
    let body = body_json(resp).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["temperature"], 21.4);
}

#[tokio::test]
async fn should_reject_message_on_foreign_topic() {
    let h = harness().await;
    let result = h
        .mqtt
        .handle_message("homeassistant/status", b"online")
        .await;
    assert!(result.is_err());
}
