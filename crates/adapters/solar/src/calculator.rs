//! [`SolarCalculator`] backed by the `sunrise` crate.

use chrono::NaiveDate;
use sunrise::{Coordinates, DawnType, SolarDay};

use duskhub_app::ports::{AlmanacError, SolarCalculator, SolarEvent};
use duskhub_domain::time::Timestamp;

use crate::location::Location;

/// Civil dusk/dawn for a fixed location.
#[derive(Debug, Clone)]
pub struct SunriseCalculator {
    place: String,
    coordinates: Option<(f64, f64)>,
}

impl SunriseCalculator {
    /// Resolve `location`. An unknown place is logged here and reported by
    /// every later lookup.
    #[must_use]
    pub fn new(location: &Location) -> Self {
        let coordinates = location
            .coordinates()
            .filter(|&(lat, lon)| Coordinates::new(lat, lon).is_some());
        match coordinates {
            Some(_) => tracing::info!(place = %location.name, "almanac location resolved"),
            None => tracing::error!(place = %location.name, "unrecognized almanac location"),
        }
        Self {
            place: location.name.clone(),
            coordinates,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.coordinates.is_some()
    }
}

impl SolarCalculator for SunriseCalculator {
    fn event_on(&self, event: SolarEvent, date: NaiveDate) -> Result<Timestamp, AlmanacError> {
        let coordinates = self
            .coordinates
            .and_then(|(lat, lon)| Coordinates::new(lat, lon))
            .ok_or_else(|| AlmanacError::UnknownLocation(self.place.clone()))?;
        let solar_event = match event {
            SolarEvent::Dawn => sunrise::SolarEvent::Dawn(DawnType::Civil),
            SolarEvent::Dusk => sunrise::SolarEvent::Dusk(DawnType::Civil),
        };
        let at = SolarDay::new(coordinates, date).event_time(solar_event);
        // Without a civil twilight the computation lands far from `date`.
        if (at.date_naive() - date).num_days().abs() > 1 {
            return Err(AlmanacError::NoEvent { event, date });
        }
        Ok(at)
    }
}
