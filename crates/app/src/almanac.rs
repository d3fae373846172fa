//! Almanac oracle — next dusk/dawn with day rollover and a soft fallback.

use chrono::NaiveTime;
use chrono_tz::Tz;

use duskhub_domain::time::{self, Timestamp};

use crate::ports::{Almanac, SolarCalculator, SolarEvent};

/// Local wall-clock time used when no solar event can be computed (17:00).
#[must_use]
pub fn fallback_time() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// [`Almanac`] backed by a [`SolarCalculator`].
///
/// Today's event (in the installation's local calendar) is used when it lies
/// strictly after `now`, otherwise tomorrow's. When the calculator fails the
/// error is logged and 17:00 local time is returned instead, following the
/// same today-or-tomorrow rule.
pub struct AlmanacOracle<S> {
    solar: S,
    tz: Tz,
}

impl<S: SolarCalculator> AlmanacOracle<S> {
    /// Create an oracle for the installation time zone `tz`.
    pub fn new(solar: S, tz: Tz) -> Self {
        Self { solar, tz }
    }

    /// The time zone used for "today" and for the fallback.
    #[must_use]
    pub fn time_zone(&self) -> Tz {
        self.tz
    }

    fn next_event(&self, event: SolarEvent, now: Timestamp) -> Timestamp {
        let today = time::local_date(now, self.tz);
        for date in [today, time::next_day(today)] {
            match self.solar.event_on(event, date) {
                Ok(at) if at > now => return at,
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(%event, error = %err, "almanac lookup failed, using 17:00 fallback");
                    return self.fallback(now);
                }
            }
        }
        tracing::error!(%event, "no upcoming solar event found, using 17:00 fallback");
        self.fallback(now)
    }

    fn fallback(&self, now: Timestamp) -> Timestamp {
        time::next_local(now, self.tz, fallback_time())
    }
}

impl<S: SolarCalculator> Almanac for AlmanacOracle<S> {
    fn next_dusk(&self, now: Timestamp) -> Timestamp {
        self.next_event(SolarEvent::Dusk, now)
    }

    fn next_dawn(&self, now: Timestamp) -> Timestamp {
        self.next_event(SolarEvent::Dawn, now)
    }
}
