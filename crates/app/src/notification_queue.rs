//! Notification queue — decouples alarm evaluation from delivery.
//!
//! The alarm engine runs on the transport's receive path, so it must never
//! wait on a mail relay. [`NotificationQueue`] accepts notifications without
//! waiting and a [`NotificationWorker`] hands them to the real sink, one at a
//! time and in order, on its own task.

use std::future::Future;

use tokio::sync::mpsc;

use duskhub_domain::alarm::Notification;

use crate::ports::NotificationSink;

/// Enqueuing side. Implements [`NotificationSink`] and returns immediately.
#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::UnboundedSender<Notification>,
}

/// Delivering side. Run it on its own task.
pub struct NotificationWorker<N> {
    receiver: mpsc::UnboundedReceiver<Notification>,
    sink: N,
}

impl NotificationQueue {
    /// Create a queue in front of `sink`.
    #[must_use]
    pub fn new<N: NotificationSink>(sink: N) -> (Self, NotificationWorker<N>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, NotificationWorker { receiver, sink })
    }
}

impl NotificationSink for NotificationQueue {
    fn send(&self, notification: Notification) -> impl Future<Output = ()> + Send {
        if let Err(err) = self.sender.send(notification) {
            tracing::error!(subject = %err.0.subject, "notification worker is gone, dropping notification");
        }
        async {}
    }
}

impl<N: NotificationSink> NotificationWorker<N> {
    /// Deliver queued notifications until every [`NotificationQueue`] handle
    /// has been dropped.
    pub async fn run(mut self) {
        while let Some(notification) = self.receiver.recv().await {
            self.sink.send(notification).await;
        }
        tracing::debug!("notification queue closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use duskhub_domain::alarm::{AlarmKey, AlarmThresholds};
    use duskhub_domain::reading::SensorPayload;

    use crate::alarm_engine::AlarmEngine;
    use crate::alarm_engine::tests::RecordingSink;

    /// A relay that never answers.
    struct StalledSink;

    impl NotificationSink for StalledSink {
        fn send(&self, _notification: Notification) -> impl Future<Output = ()> + Send {
            std::future::pending()
        }
    }

    fn notification(subject: &str) -> Notification {
        Notification {
            subject: subject.to_string(),
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn should_latch_alarm_without_waiting_for_stalled_sink() {
        let (queue, worker) = NotificationQueue::new(StalledSink);
        tokio::spawn(worker.run());
        let engine = AlarmEngine::new(AlarmThresholds::default(), queue);
        let leak = SensorPayload {
            water_leak: Some(true),
            ..SensorPayload::default()
        };

        let sent = tokio::time::timeout(Duration::from_secs(1), engine.process("basement", &leak))
            .await
            .expect("alarm evaluation must not wait on notification delivery");

        assert_eq!(sent.len(), 1);
        assert_eq!(
            engine.active_alarms(),
            vec![AlarmKey::WaterLeak("basement".to_string())]
        );
    }

    #[tokio::test]
    async fn should_deliver_queued_notifications_in_order() {
        let sink = Arc::new(RecordingSink::default());
        let (queue, worker) = NotificationQueue::new(Arc::clone(&sink));

        queue.send(notification("first")).await;
        queue.clone().send(notification("second")).await;
        drop(queue);
        worker.run().await;

        assert_eq!(sink.subjects(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn should_drop_notification_once_worker_is_gone() {
        let (queue, worker) = NotificationQueue::new(RecordingSink::default());
        drop(worker);

        queue.send(notification("lost")).await;
    }
}
