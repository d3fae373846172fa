//! Scheduling loop — drains due events and fires them one at a time.

use std::sync::Arc;
use std::time::Duration;

use duskhub_domain::time::{self, Timestamp};

use crate::ports::{Almanac, CommandPublisher};
use crate::services::group_service::GroupService;

/// Longest the loop sleeps between two queue polls.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Single cooperative loop over the shared schedule queue.
pub struct Scheduler<A, P> {
    groups: Arc<GroupService<A, P>>,
}

impl<A, P> Scheduler<A, P>
where
    A: Almanac,
    P: CommandPublisher,
{
    pub fn new(groups: Arc<GroupService<A, P>>) -> Self {
        Self { groups }
    }

    /// Fire every event due at `now` in trigger order, returning how many
    /// actually fired.
    ///
    /// The queue lock is released before the first event runs.
    pub async fn tick(&self, now: Timestamp) -> usize {
        let due = self.groups.queue().drain_due(now);
        let mut fired = 0;
        for event in &due {
            if self.groups.fire(event, now).await {
                fired += 1;
            }
        }
        fired
    }

    /// How long to sleep before the next poll.
    #[must_use]
    pub fn poll_delay(&self, now: Timestamp) -> Duration {
        self.groups
            .queue()
            .next_instant()
            .map_or(MAX_POLL_INTERVAL, |at| {
                (at - now)
                    .to_std()
                    .unwrap_or(Duration::ZERO)
                    .min(MAX_POLL_INTERVAL)
            })
    }

    /// Poll forever.
    pub async fn run(self) {
        tracing::info!("scheduler started");
        loop {
            self.tick(time::now()).await;
            tokio::time::sleep(self.poll_delay(time::now())).await;
        }
    }
}
