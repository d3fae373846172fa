//! # duskhub-adapter-mail
//!
//! Notification sink that sends plain-text mail through an SMTP relay using
//! [lettre](https://docs.rs/lettre).
//!
//! Delivery is best effort: an unconfigured sink logs at debug level and
//! drops the message, a failing relay is logged and the error swallowed.

mod config;
mod error;
mod notifier;

pub use config::MailConfig;
pub use error::MailError;
pub use notifier::SmtpNotifier;
