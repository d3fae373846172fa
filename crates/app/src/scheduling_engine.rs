//! Scheduling engine — owns one device group and keeps its ON/OFF chain armed.
//!
//! Each engine keeps exactly one pending event for its group in the shared
//! [`ScheduleQueue`]. Every firing schedules the complementary event, so the
//! chain perpetuates itself until the timer is disabled.
//!
//! Operations on one group are serialized by the engine's own async lock,
//! which is held across device commands. The queue lock is only ever taken
//! for a single insert or cancel under it. An event that was drained by the
//! scheduling loop but cancelled before it could fire is recognised by its
//! id no longer matching the pending one and is dropped.

use std::sync::Arc;

use chrono_tz::Tz;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use duskhub_domain::error::DuskHubError;
use duskhub_domain::group::{DeviceGroup, SwitchState};
use duskhub_domain::schedule::{Action, ClockTime, ScheduledEvent, TimeMode};
use duskhub_domain::time::{self, Timestamp};

use crate::device_controller::DeviceController;
use crate::ports::{Almanac, CommandPublisher};
use crate::schedule_queue::ScheduleQueue;

/// Snapshot of a group and its pending transition.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatus {
    #[serde(flatten)]
    pub group: DeviceGroup,
    pub next_event: Option<ScheduledEvent>,
}

struct GroupSlot {
    group: DeviceGroup,
    pending: Option<ScheduledEvent>,
}

/// Per-group state machine (`DISABLED` / `ARMED`) driving a [`DeviceGroup`].
pub struct SchedulingEngine<A, P> {
    name: String,
    slot: Mutex<GroupSlot>,
    queue: Arc<ScheduleQueue>,
    almanac: A,
    controller: DeviceController<P>,
    tz: Tz,
}

impl<A, P> SchedulingEngine<A, P>
where
    A: Almanac,
    P: CommandPublisher,
{
    /// Create an engine for an already validated group.
    ///
    /// Nothing is scheduled until [`initialize`](Self::initialize) or
    /// another operation runs.
    pub fn new(
        group: DeviceGroup,
        queue: Arc<ScheduleQueue>,
        almanac: A,
        controller: DeviceController<P>,
        tz: Tz,
    ) -> Self {
        Self {
            name: group.name.clone(),
            slot: Mutex::new(GroupSlot {
                group,
                pending: None,
            }),
            queue,
            almanac,
            controller,
            tz,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arm the group at startup when its timer is configured as enabled.
    #[tracing::instrument(skip(self), fields(group = %self.name))]
    pub async fn initialize(&self, now: Timestamp) {
        let mut slot = self.slot.lock().await;
        if slot.group.timer_enabled {
            self.arm(&mut slot, now).await;
        } else {
            tracing::info!("timer disabled, nothing scheduled");
        }
    }

    /// `DISABLED → ARMED`: apply the state the schedule implies right now and
    /// arm whichever transition comes first.
    #[tracing::instrument(skip(self), fields(group = %self.name))]
    pub async fn enable_timer(&self, now: Timestamp) {
        let mut slot = self.slot.lock().await;
        slot.group.timer_enabled = true;
        self.arm(&mut slot, now).await;
    }

    /// `ARMED → DISABLED`: cancel every pending event. The commanded state is
    /// left untouched.
    #[tracing::instrument(skip(self), fields(group = %self.name))]
    pub async fn disable_timer(&self) {
        let mut slot = self.slot.lock().await;
        slot.group.timer_enabled = false;
        self.cancel(&mut slot);
    }

    /// Change the fixed on time and realign the group with the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::Validation`] when the hour or minute is out
    /// of range; the group is left unchanged.
    #[tracing::instrument(skip(self), fields(group = %self.name))]
    pub async fn set_on_time(
        &self,
        hour: u32,
        minute: u32,
        now: Timestamp,
    ) -> Result<(), DuskHubError> {
        let time = ClockTime::new(hour, minute)?;
        let mut slot = self.slot.lock().await;
        slot.group.on_time = time;
        self.realign(&mut slot, now).await;
        Ok(())
    }

    /// Change the fixed off time and realign the group with the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`DuskHubError::Validation`] when the hour or minute is out
    /// of range; the group is left unchanged.
    #[tracing::instrument(skip(self), fields(group = %self.name))]
    pub async fn set_off_time(
        &self,
        hour: u32,
        minute: u32,
        now: Timestamp,
    ) -> Result<(), DuskHubError> {
        let time = ClockTime::new(hour, minute)?;
        let mut slot = self.slot.lock().await;
        slot.group.off_time = time;
        self.realign(&mut slot, now).await;
        Ok(())
    }

    /// Change how the next ON instant is resolved.
    #[tracing::instrument(skip(self), fields(group = %self.name))]
    pub async fn set_on_mode(&self, mode: TimeMode, now: Timestamp) {
        let mut slot = self.slot.lock().await;
        slot.group.on_mode = mode;
        self.rearm_if_enabled(&mut slot, now).await;
    }

    /// Change how the next OFF instant is resolved.
    #[tracing::instrument(skip(self), fields(group = %self.name))]
    pub async fn set_off_mode(&self, mode: TimeMode, now: Timestamp) {
        let mut slot = self.slot.lock().await;
        slot.group.off_mode = mode;
        self.rearm_if_enabled(&mut slot, now).await;
    }

    /// Run a due event drained from the queue.
    ///
    /// Returns `false` when the event is no longer the group's pending one
    /// (it was cancelled or replaced after being drained) and was ignored.
    #[tracing::instrument(skip(self, event), fields(group = %self.name, event_id = %event.id, action = %event.action))]
    pub async fn fire(&self, event: &ScheduledEvent, now: Timestamp) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.pending.as_ref().map(|pending| pending.id) != Some(event.id) {
            tracing::debug!("stale event ignored");
            return false;
        }
        slot.pending = None;
        match event.action {
            Action::FireOn => self.on_path(&mut slot, now).await,
            Action::FireOff => self.off_path(&mut slot, now).await,
        }
        true
    }

    /// Current group configuration, commanded state and pending event.
    pub async fn status(&self) -> GroupStatus {
        let slot = self.slot.lock().await;
        GroupStatus {
            group: slot.group.clone(),
            next_event: slot.pending.clone(),
        }
    }

    /// Next instant the group should switch on.
    pub async fn next_on_time(&self, now: Timestamp) -> Timestamp {
        let slot = self.slot.lock().await;
        self.resolve(slot.group.on_mode, slot.group.on_time, now)
    }

    /// Next instant the group should switch off.
    pub async fn next_off_time(&self, now: Timestamp) -> Timestamp {
        let slot = self.slot.lock().await;
        self.resolve(slot.group.off_mode, slot.group.off_time, now)
    }

    fn resolve(&self, mode: TimeMode, fixed: ClockTime, now: Timestamp) -> Timestamp {
        match mode {
            TimeMode::Fixed => time::next_local(now, self.tz, fixed.as_naive()),
            TimeMode::Dusk => self.almanac.next_dusk(now),
            TimeMode::Dawn => self.almanac.next_dawn(now),
        }
    }

    /// Enter the phase the schedule implies at `now`: if the next ON comes
    /// before the next OFF the group is currently in its OFF phase. Ties run
    /// the ON path, which arms the OFF transition.
    async fn arm(&self, slot: &mut MutexGuard<'_, GroupSlot>, now: Timestamp) {
        let next_on = self.resolve(slot.group.on_mode, slot.group.on_time, now);
        let next_off = self.resolve(slot.group.off_mode, slot.group.off_time, now);
        if next_on < next_off {
            self.off_path(slot, now).await;
        } else {
            self.on_path(slot, now).await;
        }
    }

    /// Used after fixed time changes, whether or not the timer is enabled:
    /// the group is ON when the next OFF lies strictly between now and the
    /// next dusk.
    async fn realign(&self, slot: &mut MutexGuard<'_, GroupSlot>, now: Timestamp) {
        self.cancel(slot);
        let next_off = self.resolve(slot.group.off_mode, slot.group.off_time, now);
        let next_dusk = self.almanac.next_dusk(now);
        if now < next_off && next_off < next_dusk {
            self.on_path(slot, now).await;
        } else {
            self.off_path(slot, now).await;
        }
    }

    async fn rearm_if_enabled(&self, slot: &mut MutexGuard<'_, GroupSlot>, now: Timestamp) {
        self.cancel(slot);
        if slot.group.timer_enabled {
            self.arm(slot, now).await;
        }
    }

    async fn on_path(&self, slot: &mut MutexGuard<'_, GroupSlot>, now: Timestamp) {
        self.switch(slot, SwitchState::On).await;
        let at = self.resolve(slot.group.off_mode, slot.group.off_time, now);
        self.schedule(slot, Action::FireOff, at);
    }

    async fn off_path(&self, slot: &mut MutexGuard<'_, GroupSlot>, now: Timestamp) {
        self.switch(slot, SwitchState::Off).await;
        let at = self.resolve(slot.group.on_mode, slot.group.on_time, now);
        self.schedule(slot, Action::FireOn, at);
    }

    async fn switch(&self, slot: &mut MutexGuard<'_, GroupSlot>, desired: SwitchState) {
        if slot.group.timer_enabled {
            self.controller.command_all(&mut slot.group, desired).await;
        }
    }

    fn schedule(&self, slot: &mut MutexGuard<'_, GroupSlot>, action: Action, at: Timestamp) {
        self.queue.cancel_all_for(&self.name);
        let event = ScheduledEvent::new(self.name.clone(), action, at);
        tracing::info!(%action, %at, "next transition scheduled");
        self.queue.insert(event.clone());
        slot.pending = Some(event);
    }

    fn cancel(&self, slot: &mut MutexGuard<'_, GroupSlot>) {
        let cancelled = self.queue.cancel_all_for(&self.name);
        if cancelled > 0 {
            tracing::debug!(cancelled, "pending events cancelled");
        }
        slot.pending = None;
    }
}
