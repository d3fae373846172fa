//! Alarm engine — turns the sensor payload stream into debounced alerts.
//!
//! Every field is evaluated independently and only when present in the
//! payload. Latch changes are computed under the alarm-set lock; the
//! resulting notifications are sent after it is released, so a failing mail
//! relay never undoes a latch update. The daemon puts a
//! [`NotificationQueue`](crate::notification_queue::NotificationQueue) in
//! front of the relay so sending never waits on it either.

use std::sync::{Mutex, MutexGuard, PoisonError};

use duskhub_domain::alarm::{
    AlarmKey, AlarmSet, AlarmThresholds, Notification, Transition, high_band, low_band,
};
use duskhub_domain::reading::SensorPayload;

use crate::ports::NotificationSink;

/// Hysteresis state machine over the latched [`AlarmSet`].
pub struct AlarmEngine<N> {
    thresholds: AlarmThresholds,
    alarms: Mutex<AlarmSet>,
    sink: N,
}

impl<N: NotificationSink> AlarmEngine<N> {
    pub fn new(thresholds: AlarmThresholds, sink: N) -> Self {
        Self {
            thresholds,
            alarms: Mutex::new(AlarmSet::new()),
            sink,
        }
    }

    #[must_use]
    pub fn thresholds(&self) -> AlarmThresholds {
        self.thresholds
    }

    fn lock(&self) -> MutexGuard<'_, AlarmSet> {
        self.alarms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Evaluate one payload from `source` and send the resulting
    /// notifications, returning them.
    #[tracing::instrument(skip(self, payload))]
    pub async fn process(&self, source: &str, payload: &SensorPayload) -> Vec<Notification> {
        let notifications = {
            let mut alarms = self.lock();
            self.evaluate(&mut alarms, source, payload)
        };
        for notification in &notifications {
            tracing::info!(subject = %notification.subject, "alarm notification");
            self.sink.send(notification.clone()).await;
        }
        notifications
    }

    /// Clear a latched alarm without notifying, e.g. a replaced battery.
    ///
    /// Returns whether the alarm was latched.
    pub fn acknowledge(&self, key: &AlarmKey) -> bool {
        let cleared = self.lock().apply(key, Transition::Cleared);
        if cleared {
            tracing::info!(alarm = %key, "alarm acknowledged");
        }
        cleared
    }

    /// Currently latched alarms.
    #[must_use]
    pub fn active_alarms(&self) -> Vec<AlarmKey> {
        self.lock().iter().cloned().collect()
    }

    fn evaluate(
        &self,
        alarms: &mut AlarmSet,
        source: &str,
        payload: &SensorPayload,
    ) -> Vec<Notification> {
        let mut out = Vec::new();
        let t = &self.thresholds;

        if let Some(leak) = payload.water_leak {
            let key = AlarmKey::WaterLeak(source.to_string());
            let transition = if leak {
                Transition::Raised
            } else {
                Transition::Cleared
            };
            if alarms.apply(&key, transition) {
                let body = match transition {
                    Transition::Raised => format!("{source} reports a water leak!"),
                    Transition::Cleared => format!("{source} no longer reports a water leak."),
                };
                out.push(Notification::for_transition(&key, transition, body));
            }
        }

        if payload.battery_low == Some(true) {
            let key = AlarmKey::LowBattery(source.to_string());
            if alarms.apply(&key, Transition::Raised) {
                let body = match payload.battery {
                    Some(level) => format!("{source} battery is low ({level}%)."),
                    None => format!("{source} battery is low."),
                };
                out.push(Notification::for_transition(&key, Transition::Raised, body));
            }
        }

        if let Some(temperature) = payload.temperature {
            let bands = [
                (AlarmKey::LowTemperature, t.low_temperature),
                (AlarmKey::Freezing, AlarmThresholds::FREEZING),
            ];
            for (key, enter_below) in bands {
                let clear_above = enter_below + t.temperature_hysteresis;
                let latched = alarms.is_latched(&key);
                if let Some(transition) = low_band(temperature, enter_below, clear_above, latched) {
                    alarms.apply(&key, transition);
                    let body = match transition {
                        Transition::Raised => {
                            format!("The temperature has fallen to {temperature} °C!")
                        }
                        Transition::Cleared => {
                            format!("The temperature has risen to {temperature} °C.")
                        }
                    };
                    out.push(Notification::for_transition(&key, transition, body));
                }
            }
        }

        if let Some(humidity) = payload.humidity {
            let key = AlarmKey::HighHumidity;
            let clear_below = t.high_humidity - t.humidity_hysteresis;
            let latched = alarms.is_latched(&key);
            if let Some(transition) = high_band(humidity, t.high_humidity, clear_below, latched) {
                alarms.apply(&key, transition);
                let body = match transition {
                    Transition::Raised => format!("The humidity has risen to {humidity}%!"),
                    Transition::Cleared => format!("The humidity has fallen to {humidity}%."),
                };
                out.push(Notification::for_transition(&key, transition, body));
            }
        }

        if let Some(action) = payload.action.as_deref() {
            out.push(Notification {
                subject: format!("{action} notification"),
                body: format!("{source} reporting: {action}!"),
            });
        }

        out
    }
}
