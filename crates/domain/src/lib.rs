//! # duskhub-domain
//!
//! Pure domain model for the duskhub lighting scheduler and sensor monitor.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Device groups** (named sets of switchable devices sharing a schedule)
//! - Define **Schedules** (time modes, fixed clock times, scheduled transition events)
//! - Define **Readings** (sparse sensor readings and the raw sensor status payload)
//! - Define **Alarms** (hysteresis thresholds, alarm keys, the latched alarm set)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod alarm;
pub mod group;
pub mod reading;
pub mod schedule;
