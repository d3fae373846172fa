//! # duskhubd — duskhub daemon
//!
//! Composition root that wires all adapters together and starts the daemon.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct adapters (MQTT, mail, solar calculator) and inject them into
//!   the application services via port traits
//! - Arm the enabled device groups
//! - Spawn the mail worker, the MQTT listener, the scheduler and the recorder
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use duskhub_adapter_http_axum::router;
use duskhub_adapter_http_axum::state::AppState;
use duskhub_adapter_mail::SmtpNotifier;
use duskhub_adapter_solar::SunriseCalculator;
use duskhub_adapter_storage_sqlite_sqlx::{Config as StorageConfig, SqliteReadingRepository};
use duskhub_app::alarm_engine::AlarmEngine;
use duskhub_app::almanac::AlmanacOracle;
use duskhub_app::notification_queue::NotificationQueue;
use duskhub_app::recorder::{Recorder, SensorSnapshot};
use duskhub_app::schedule_queue::ScheduleQueue;
use duskhub_app::scheduler::Scheduler;
use duskhub_app::services::group_service::GroupService;
use duskhub_app::services::sensor_service::SensorService;
use duskhub_domain::time;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    init_tracing(&config.logging.filter);
    let tz = config.site.time_zone()?;

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("opening database")?;
    let readings = Arc::new(SqliteReadingRepository::new(db.pool().clone()));

    // Sensors and alarms
    let notifier = SmtpNotifier::new(config.mail.clone()).context("configuring mail relay")?;
    let (notifications, mail_worker) = NotificationQueue::new(notifier);
    let snapshot = Arc::new(SensorSnapshot::new());
    let sensors = Arc::new(SensorService::new(
        Arc::clone(&snapshot),
        AlarmEngine::new(config.alarms.thresholds(), notifications),
    ));
    tokio::spawn(mail_worker.run());

    // MQTT, polled before any group is armed so commands drain
    let (publisher, mqtt_listener) =
        duskhub_adapter_mqtt::connect(&config.mqtt, Arc::clone(&sensors));
    tokio::spawn(mqtt_listener.run());

    // Scheduling
    let almanac = Arc::new(AlmanacOracle::new(
        SunriseCalculator::new(&config.site.location()),
        tz,
    ));
    let groups = Arc::new(GroupService::new(
        config.device_groups()?,
        Arc::new(ScheduleQueue::new()),
        almanac,
        publisher,
        tz,
    )?);
    groups.initialize_all(time::now()).await;

    // Background tasks
    let recorder = Recorder::new(
        Arc::clone(&readings),
        snapshot,
        config.recorder.settings(),
    );
    tokio::spawn(Scheduler::new(Arc::clone(&groups)).run());
    tokio::spawn(recorder.run());

    // HTTP
    let app = router::build(AppState::from_arcs(groups, sensors, readings));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, "duskhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("duskhubd stopped");
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?}: {err}, falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
