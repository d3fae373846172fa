//! Almanac ports — solar event computation for the configured location.

use chrono::NaiveDate;

use duskhub_domain::time::Timestamp;

/// The two solar events the scheduler can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarEvent {
    /// Civil dawn: the sun 6° below the horizon, rising.
    Dawn,
    /// Civil dusk: the sun 6° below the horizon, setting.
    Dusk,
}

impl std::fmt::Display for SolarEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dawn => f.write_str("dawn"),
            Self::Dusk => f.write_str("dusk"),
        }
    }
}

/// Why a solar event could not be computed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlmanacError {
    /// The configured place name could not be resolved to coordinates.
    #[error("unrecognized location {0:?}")]
    UnknownLocation(String),

    /// The sun does not reach the civil twilight angle on that date
    /// (polar day or night).
    #[error("no {event} on {date} at this latitude")]
    NoEvent { event: SolarEvent, date: NaiveDate },
}

/// Computes solar events for a fixed location.
///
/// Implementations are pure: the same date always yields the same instant.
pub trait SolarCalculator {
    /// Instant of `event` on the local calendar `date`.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError`] when the location is unresolvable or the event
    /// does not happen on that date.
    fn event_on(&self, event: SolarEvent, date: NaiveDate) -> Result<Timestamp, AlmanacError>;
}

impl<T: SolarCalculator + ?Sized> SolarCalculator for std::sync::Arc<T> {
    fn event_on(&self, event: SolarEvent, date: NaiveDate) -> Result<Timestamp, AlmanacError> {
        (**self).event_on(event, date)
    }
}

/// Next dusk/dawn lookups used by the scheduling engine.
///
/// Infallible by contract: an implementation that cannot compute the event
/// must fall back to a fixed instant rather than block scheduling.
pub trait Almanac {
    /// The next civil dusk strictly after `now`.
    fn next_dusk(&self, now: Timestamp) -> Timestamp;

    /// The next civil dawn strictly after `now`.
    fn next_dawn(&self, now: Timestamp) -> Timestamp;
}

impl<T: Almanac + ?Sized> Almanac for std::sync::Arc<T> {
    fn next_dusk(&self, now: Timestamp) -> Timestamp {
        (**self).next_dusk(now)
    }

    fn next_dawn(&self, now: Timestamp) -> Timestamp {
        (**self).next_dawn(now)
    }
}
