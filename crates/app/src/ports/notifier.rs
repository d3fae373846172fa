//! Notification port — outbound alerts.

use std::future::Future;

use duskhub_domain::alarm::Notification;

/// Delivers notifications to a human.
///
/// Best effort: implementations log their own failures and never report them
/// to the caller, so an unsent message can never hold back an alarm latch.
pub trait NotificationSink {
    /// Send one notification.
    fn send(&self, notification: Notification) -> impl Future<Output = ()> + Send;
}

impl<T: NotificationSink + Send + Sync> NotificationSink for std::sync::Arc<T> {
    fn send(&self, notification: Notification) -> impl Future<Output = ()> + Send {
        (**self).send(notification)
    }
}
