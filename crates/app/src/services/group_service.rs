//! Group service — use-cases for the configured device groups.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono_tz::Tz;

use duskhub_domain::error::{DuskHubError, NotFoundError, ValidationError};
use duskhub_domain::group::DeviceGroup;
use duskhub_domain::schedule::{ScheduledEvent, TimeMode};
use duskhub_domain::time::Timestamp;

use crate::device_controller::DeviceController;
use crate::ports::{Almanac, CommandPublisher};
use crate::schedule_queue::ScheduleQueue;
use crate::scheduling_engine::{GroupStatus, SchedulingEngine};

/// Registry of one [`SchedulingEngine`] per device group, keyed by name.
pub struct GroupService<A, P> {
    engines: BTreeMap<String, Arc<SchedulingEngine<A, P>>>,
    queue: Arc<ScheduleQueue>,
}

impl<A, P> GroupService<A, P>
where
    A: Almanac + Clone,
    P: CommandPublisher + Clone,
{
    /// Build one engine per group, all sharing `queue`.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::Validation`] if a group fails validation or
    /// two groups share a name.
    pub fn new(
        groups: Vec<DeviceGroup>,
        queue: Arc<ScheduleQueue>,
        almanac: A,
        publisher: P,
        tz: Tz,
    ) -> Result<Self, DuskHubError> {
        let mut engines = BTreeMap::new();
        for group in groups {
            group.validate()?;
            if engines.contains_key(&group.name) {
                return Err(ValidationError::DuplicateName(group.name).into());
            }
            let engine = SchedulingEngine::new(
                group,
                Arc::clone(&queue),
                almanac.clone(),
                DeviceController::new(publisher.clone()),
                tz,
            );
            engines.insert(engine.name().to_string(), Arc::new(engine));
        }
        Ok(Self { engines, queue })
    }
}

impl<A, P> GroupService<A, P>
where
    A: Almanac,
    P: CommandPublisher,
{
    /// The queue shared by every engine.
    #[must_use]
    pub fn queue(&self) -> &Arc<ScheduleQueue> {
        &self.queue
    }

    /// Look up the engine of a group.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::NotFound`] when no group is called `name`.
    pub fn get(&self, name: &str) -> Result<&Arc<SchedulingEngine<A, P>>, DuskHubError> {
        self.engines.get(name).ok_or_else(|| {
            NotFoundError {
                entity: "DeviceGroup",
                id: name.to_string(),
            }
            .into()
        })
    }

    /// Arm every group whose timer is configured as enabled.
    #[tracing::instrument(skip(self))]
    pub async fn initialize_all(&self, now: Timestamp) {
        for engine in self.engines.values() {
            engine.initialize(now).await;
        }
    }

    /// Status of every group, ordered by name.
    pub async fn list(&self) -> Vec<GroupStatus> {
        let mut statuses = Vec::with_capacity(self.engines.len());
        for engine in self.engines.values() {
            statuses.push(engine.status().await);
        }
        statuses
    }

    /// Status of one group.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::NotFound`] for an unknown group.
    pub async fn status(&self, name: &str) -> Result<GroupStatus, DuskHubError> {
        Ok(self.get(name)?.status().await)
    }

    /// Enable or disable a group's timer.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::NotFound`] for an unknown group.
    pub async fn set_timer(
        &self,
        name: &str,
        enabled: bool,
        now: Timestamp,
    ) -> Result<GroupStatus, DuskHubError> {
        let engine = self.get(name)?;
        if enabled {
            engine.enable_timer(now).await;
        } else {
            engine.disable_timer().await;
        }
        Ok(engine.status().await)
    }

    /// Change a group's fixed on time.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::NotFound`] for an unknown group or
    /// [`DuskHubError::Validation`] for an out-of-range time.
    pub async fn set_on_time(
        &self,
        name: &str,
        hour: u32,
        minute: u32,
        now: Timestamp,
    ) -> Result<GroupStatus, DuskHubError> {
        let engine = self.get(name)?;
        engine.set_on_time(hour, minute, now).await?;
        Ok(engine.status().await)
    }

    /// Change a group's fixed off time.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::NotFound`] for an unknown group or
    /// [`DuskHubError::Validation`] for an out-of-range time.
    pub async fn set_off_time(
        &self,
        name: &str,
        hour: u32,
        minute: u32,
        now: Timestamp,
    ) -> Result<GroupStatus, DuskHubError> {
        let engine = self.get(name)?;
        engine.set_off_time(hour, minute, now).await?;
        Ok(engine.status().await)
    }

    /// Change a group's on mode.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::NotFound`] for an unknown group.
    pub async fn set_on_mode(
        &self,
        name: &str,
        mode: TimeMode,
        now: Timestamp,
    ) -> Result<GroupStatus, DuskHubError> {
        let engine = self.get(name)?;
        engine.set_on_mode(mode, now).await;
        Ok(engine.status().await)
    }

    /// Change a group's off mode.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::NotFound`] for an unknown group.
    pub async fn set_off_mode(
        &self,
        name: &str,
        mode: TimeMode,
        now: Timestamp,
    ) -> Result<GroupStatus, DuskHubError> {
        let engine = self.get(name)?;
        engine.set_off_mode(mode, now).await;
        Ok(engine.status().await)
    }

    /// Hand a drained event to its group's engine.
    ///
    /// Returns whether the event actually fired.
    pub async fn fire(&self, event: &ScheduledEvent, now: Timestamp) -> bool {
        match self.engines.get(&event.group) {
            Some(engine) => engine.fire(event, now).await,
            None => {
                tracing::warn!(group = %event.group, "event for unknown group dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_controller::tests::RecordingPublisher;
    use crate::scheduling_engine::tests::{StubAlmanac, group, utc};
    use duskhub_domain::group::SwitchState;
    use duskhub_domain::schedule::Action;

    type TestService = GroupService<StubAlmanac, Arc<RecordingPublisher>>;

    fn make_service(groups: Vec<DeviceGroup>) -> (TestService, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let service = GroupService::new(
            groups,
            Arc::new(ScheduleQueue::new()),
            StubAlmanac,
            Arc::clone(&publisher),
            Tz::UTC,
        )
        .unwrap();
        (service, publisher)
    }

    #[test]
    fn should_reject_duplicate_group_names() {
        let result = GroupService::new(
            vec![group("porch", &["A"], false), group("porch", &["B"], false)],
            Arc::new(ScheduleQueue::new()),
            StubAlmanac,
            Arc::new(RecordingPublisher::default()),
            Tz::UTC,
        );
        assert!(matches!(
            result,
            Err(DuskHubError::Validation(ValidationError::DuplicateName(name))) if name == "porch"
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_group() {
        let (svc, _) = make_service(vec![group("porch", &["A"], false)]);
        let err = svc.set_timer("attic", true, utc(1, 12, 0)).await.unwrap_err();
        assert!(matches!(err, DuskHubError::NotFound(_)));
    }

    #[tokio::test]
    async fn should_initialize_only_enabled_groups() {
        let (svc, _) = make_service(vec![
            group("porch", &["A"], true),
            group("garden", &["G"], false),
        ]);

        svc.initialize_all(utc(1, 12, 0)).await;

        assert_eq!(svc.queue().pending_for("porch").len(), 1);
        assert!(svc.queue().pending_for("garden").is_empty());
    }

    #[tokio::test]
    async fn should_list_groups_in_name_order() {
        let (svc, _) = make_service(vec![
            group("porch", &["A"], false),
            group("garden", &["G"], false),
        ]);
        let names: Vec<_> = svc.list().await.into_iter().map(|s| s.group.name).collect();
        assert_eq!(names, vec!["garden", "porch"]);
    }

    #[tokio::test]
    async fn should_dispatch_fired_event_to_owning_group() {
        let (svc, publisher) = make_service(vec![group("porch", &["A"], true)]);
        svc.initialize_all(utc(1, 12, 0)).await;
        let due = svc.queue().drain_due(utc(1, 19, 45));

        assert!(svc.fire(&due[0], utc(1, 19, 45)).await);

        assert_eq!(publisher.sent().last(), Some(&("A".to_string(), SwitchState::On)));
        let status = svc.status("porch").await.unwrap();
        assert_eq!(status.next_event.map(|e| e.action), Some(Action::FireOff));
    }

    #[tokio::test]
    async fn should_drop_event_for_unknown_group() {
        let (svc, _) = make_service(vec![group("porch", &["A"], true)]);
        let event = ScheduledEvent::new("attic", Action::FireOn, utc(1, 12, 0));
        assert!(!svc.fire(&event, utc(1, 12, 0)).await);
    }

    #[tokio::test]
    async fn should_report_status_after_timer_toggle() {
        let (svc, _) = make_service(vec![group("porch", &["A"], false)]);

        let status = svc.set_timer("porch", true, utc(1, 12, 0)).await.unwrap();
        assert!(status.group.timer_enabled);
        assert!(status.next_event.is_some());

        let status = svc.set_timer("porch", false, utc(1, 12, 5)).await.unwrap();
        assert!(!status.group.timer_enabled);
        assert!(status.next_event.is_none());
    }

    #[tokio::test]
    async fn should_surface_validation_error_for_bad_minute() {
        let (svc, _) = make_service(vec![group("porch", &["A"], false)]);
        let err = svc
            .set_on_time("porch", 18, 75, utc(1, 12, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DuskHubError::Validation(ValidationError::InvalidMinute(75))
        ));
    }
}
