//! # duskhub-adapter-solar
//!
//! Almanac adapter — computes civil dusk and dawn with the
//! [sunrise](https://docs.rs/sunrise) crate.
//!
//! ## Responsibilities
//! - Resolve the configured place name to coordinates (built-in table), or
//!   use explicit coordinates when given
//! - Implement [`SolarCalculator`](duskhub_app::ports::SolarCalculator)
//!
//! An unresolvable place is not an error at construction: the calculator
//! reports it on every lookup and the almanac oracle falls back to 17:00.

mod calculator;
mod location;
mod places;

pub use calculator::SunriseCalculator;
pub use location::Location;
