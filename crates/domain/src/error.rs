//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`DuskHubError`]
//! via `From`, so ports only ever surface this one type.

/// Top-level error shared by every port boundary.
#[derive(Debug, thiserror::Error)]
pub enum DuskHubError {
    /// A domain invariant was violated by caller input.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced object does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The device/broker transport failed.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("device group must contain at least one device")]
    NoDevices,

    #[error("device id must not be empty")]
    EmptyDeviceId,

    #[error("hour {0} is out of range (0-23)")]
    InvalidHour(u32),

    #[error("minute {0} is out of range (0-59)")]
    InvalidMinute(u32),

    #[error("invalid clock time {0:?}, expected HH:MM")]
    InvalidClockTime(String),

    #[error("unknown time mode {0:?}, expected fixed, dusk or dawn")]
    UnknownTimeMode(String),

    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),

    #[error("hysteresis must be a non-negative number, got {0}")]
    InvalidHysteresis(f64),

    #[error("duplicate name {0:?}")]
    DuplicateName(String),
}

/// A lookup by name or id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_domain_error() {
        let err: DuskHubError = ValidationError::NoDevices.into();
        assert!(matches!(
            err,
            DuskHubError::Validation(ValidationError::NoDevices)
        ));
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "DeviceGroup",
            id: "porch".to_string(),
        };
        assert_eq!(err.to_string(), "DeviceGroup porch not found");
    }

    #[test]
    fn should_display_hour_out_of_range() {
        assert_eq!(
            ValidationError::InvalidHour(24).to_string(),
            "hour 24 is out of range (0-23)"
        );
    }
}
