//! Identifiers for armed events and stored readings.
//!
//! An [`EventId`] is what lets a group tell its current pending event apart
//! from one that was cancelled after the scheduler had already drained it.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Fresh random (v4) identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Identity of one arming of a [`ScheduledEvent`](crate::schedule::ScheduledEvent).
    EventId
);

uuid_id!(
    /// Primary key of a stored reading row.
    ReadingId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_give_every_arming_its_own_id() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn should_keep_uuid_of_stored_row() {
        let uuid = uuid::Uuid::new_v4();
        assert_eq!(ReadingId::from_uuid(uuid).as_uuid(), uuid);
    }

    #[test]
    fn should_serialize_as_plain_uuid_string() {
        let uuid = uuid::Uuid::new_v4();
        let json = serde_json::to_string(&EventId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
