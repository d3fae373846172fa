//! # duskhub-app
//!
//! Application layer — the scheduling and alarm engines plus **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SolarCalculator` — civil dusk/dawn for a date at the configured location
//!   - `CommandPublisher` — send an on/off command to one device
//!   - `NotificationSink` — deliver an alert, best effort
//!   - `ReadingRepository` — append & prune historical readings
//! - Define **driving/inbound ports**:
//!   - `SensorInbox` — entry point for parsed sensor payloads
//! - Provide the core engines:
//!   - `AlmanacOracle` — next dusk/dawn with rollover and a soft fallback
//!   - `ScheduleQueue` — the shared, time-ordered queue of pending transitions
//!   - `SchedulingEngine` — one per device group; arms, fires and re-arms
//!   - `DeviceController` — best-effort fan-out of commands to a group
//!   - `AlarmEngine` — hysteresis latches turning readings into notifications
//!   - `NotificationQueue` — hands notifications to the sink off the receive path
//!   - `Scheduler` — the loop draining the queue
//!   - `Recorder` — periodic persistence of the latest readings
//!
//! ## Dependency rule
//! Depends on `duskhub-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod alarm_engine;
pub mod almanac;
pub mod device_controller;
pub mod notification_queue;
pub mod ports;
pub mod recorder;
pub mod schedule_queue;
pub mod scheduler;
pub mod scheduling_engine;
pub mod services;
