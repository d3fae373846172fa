//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod almanac;
pub mod notifier;
pub mod sensor_inbox;
pub mod storage;
pub mod transport;

pub use almanac::{Almanac, AlmanacError, SolarCalculator, SolarEvent};
pub use notifier::NotificationSink;
pub use sensor_inbox::SensorInbox;
pub use storage::ReadingRepository;
pub use transport::CommandPublisher;
