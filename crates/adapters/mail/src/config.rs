//! Mail configuration.

use serde::Deserialize;

use crate::error::MailError;

/// Default SMTP port when `smtp_server` does not name one.
const DEFAULT_SMTP_PORT: u16 = 25;

/// Where notifications are sent from and to.
///
/// Leaving `recipient` or `smtp_server` empty disables mail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub sender: String,
    pub recipient: String,
    /// Relay as `host` or `host:port`.
    pub smtp_server: String,
}

impl MailConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.recipient.trim().is_empty() && !self.smtp_server.trim().is_empty()
    }

    /// Split `smtp_server` into host and port.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::InvalidServer`] when the port is not a number.
    pub fn relay(&self) -> Result<(String, u16), MailError> {
        let server = self.smtp_server.trim();
        match server.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse()
                    .map_err(|_| MailError::InvalidServer(server.to_string()))?;
                Ok((host.to_string(), port))
            }
            None => Ok((server.to_string(), DEFAULT_SMTP_PORT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_be_unconfigured_by_default() {
        assert!(!MailConfig::default().is_configured());
    }

    #[test]
    fn should_require_recipient_and_server() {
        let config = MailConfig {
            sender: "hub@example.com".to_string(),
            recipient: String::new(),
            smtp_server: "localhost".to_string(),
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn should_default_to_port_25() {
        let config: MailConfig = toml::from_str(
            r#"
            recipient = "me@example.com"
            smtp_server = "localhost"
        "#,
        )
        .unwrap();
        assert!(config.is_configured());
        assert_eq!(config.relay().unwrap(), ("localhost".to_string(), 25));
    }

    #[test]
    fn should_parse_explicit_port() {
        let config = MailConfig {
            smtp_server: "mail.example.com:2525".to_string(),
            ..MailConfig::default()
        };
        assert_eq!(
            config.relay().unwrap(),
            ("mail.example.com".to_string(), 2525)
        );
    }

    #[test]
    fn should_reject_non_numeric_port() {
        let config = MailConfig {
            smtp_server: "mail.example.com:smtp".to_string(),
            ..MailConfig::default()
        };
        assert!(matches!(config.relay(), Err(MailError::InvalidServer(_))));
    }
}
