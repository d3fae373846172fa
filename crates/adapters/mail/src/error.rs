//! Mail adapter error types.

/// Errors raised while building or delivering a message.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid SMTP server {0:?}")]
    InvalidServer(String),

    #[error("invalid mail address")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
