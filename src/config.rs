//! Gateway configuration.

use crate::error::{Error, Result};
use crate::http::Status;
use crate::writer::StatusLine;

use std::path::Path;

use serde::Deserialize;

/// Settings of a [`Gateway`](crate::Gateway).
///
/// Every field has a default, so a TOML file only lists what it changes:
///
/// ```toml
/// origin_server = true
/// error_body = "something went wrong\n"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Environment variable signalling a secure transport. The scheme is
    /// `https` when it is `on` or `1`.
    pub secure_indicator: String,

    /// Write `HTTP/<version> <status>` instead of the `Status:` header.
    pub origin_server: bool,

    /// Version written in origin-server mode.
    pub http_version: String,

    /// Send an error response when the application fails before any byte
    /// of its response was written.
    pub error_response: bool,

    pub error_status: String,

    pub error_body: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secure_indicator: "HTTPS".to_owned(),
            origin_server: false,
            http_version: "1.0".to_owned(),
            error_response: true,
            error_status: "500 Internal Server Error".to_owned(),
            error_body: "A server error occurred. Please contact the administrator.".to_owned(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Config> {
        let config: Config = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Config::from_toml_str(&s)
    }

    fn validate(&self) -> Result<()> {
        if self.secure_indicator.is_empty() {
            return Err(Error::Config("secure_indicator must not be empty".into()));
        }

        if self.http_version.is_empty() || self.http_version.contains(char::is_whitespace) {
            return Err(Error::Config(format!(
                "invalid http_version {:?}",
                self.http_version
            )));
        }

        self.error_status()?;
        Ok(())
    }

    pub(crate) fn error_status(&self) -> Result<Status> {
        Status::parse(&self.error_status).map_err(|e| Error::Config(e.to_string()))
    }

    pub(crate) fn status_line(&self) -> StatusLine {
        if self.origin_server {
            StatusLine::Origin {
                version: self.http_version.clone(),
            }
        } else {
            StatusLine::Cgi
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.status_line(), StatusLine::Cgi);
    }

    #[test]
    fn partial() {
        let config = Config::from_toml_str(
            r#"
            origin_server = true
            http_version = "1.1"
            error_response = false
            "#,
        )
        .unwrap();

        assert_eq!(config.secure_indicator, "HTTPS");
        assert!(!config.error_response);
        assert_eq!(
            config.status_line(),
            StatusLine::Origin {
                version: "1.1".into()
            }
        );
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            Config::from_toml_str(r#"error_status = "oops""#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("origin_server = 3"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::load("/nonexistent/ferry.toml"),
            Err(Error::Config(_))
        ));
    }
}
