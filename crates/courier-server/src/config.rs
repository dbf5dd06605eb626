//! Server configuration
//!
//! Loaded from a TOML file. Every key has a default, and a missing file
//! yields the default configuration.

use std::path::{Path, PathBuf};

use courier_types::DeliveryConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            output: LogOutput::default(),
        }
    }
}

impl LoggingConfig {
    /// The configured level, or `None` if it does not name one
    pub fn level_filter(&self) -> Option<LevelFilter> {
        let level = self.level.trim();
        [
            ("trace", LevelFilter::TRACE),
            ("debug", LevelFilter::DEBUG),
            ("info", LevelFilter::INFO),
            ("warn", LevelFilter::WARN),
            ("error", LevelFilter::ERROR),
        ]
        .into_iter()
        .find(|(name, _)| level.eq_ignore_ascii_case(name))
        .map(|(_, filter)| filter)
    }
}

impl Config {
    /// Load from `path`, falling back to defaults if the file does not exist
    pub fn load(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok((Self::default(), ConfigSource::Defaults));
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_toml_str(&raw)?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.delivery.conduit_capacity == 0 {
            return Err(ConfigError::Invalid(
                "delivery.conduit_capacity must be at least 1".to_string(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host is empty".to_string()));
        }
        Ok(())
    }

    /// Host and port to listen on, in a form `TcpListener::bind` resolves
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.server.host.trim(), self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_types::OverflowPolicy;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.bind_addr(), ("127.0.0.1", 8080));
        assert_eq!(config.logging.format, LogFormat::Console);
        assert_eq!(config.logging.output, LogOutput::Stdout);
        assert_eq!(config.logging.level_filter(), Some(LevelFilter::INFO));
        assert_eq!(config.delivery.conduit_capacity, 256);
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [logging]
            level = "debug"
            format = "json"
            output = "stderr"

            [delivery]
            conduit_capacity = 16
            overflow = "drop-newest"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr(), ("0.0.0.0", 9000));
        assert_eq!(config.logging.level_filter(), Some(LevelFilter::DEBUG));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.output, LogOutput::Stderr);
        assert_eq!(config.delivery.conduit_capacity, 16);
        assert_eq!(config.delivery.overflow, OverflowPolicy::DropNewest);
    }

    #[test]
    fn test_partial_sections() {
        let config =
            Config::from_toml_str("[server]\nport = 7000\n[delivery]\noverflow = \"drop-oldest\"")
                .unwrap();
        assert_eq!(config.bind_addr(), ("127.0.0.1", 7000));
        assert_eq!(config.delivery.conduit_capacity, 256);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("[delivery]\nconduit_capacity = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[logging]\noutput = \"kafka\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[logging]\nformat = \"xml\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_level_has_no_filter() {
        let config = Config::from_toml_str("[logging]\nlevel = \"verbose\"").unwrap();
        assert_eq!(config.logging.level_filter(), None);
    }

    #[test]
    fn test_only_named_levels_accepted() {
        let filter = |level: &str| {
            LoggingConfig {
                level: level.to_string(),
                ..Default::default()
            }
            .level_filter()
        };

        assert_eq!(filter("WARN"), Some(LevelFilter::WARN));
        assert_eq!(filter(" Trace "), Some(LevelFilter::TRACE));
        assert_eq!(filter("error"), Some(LevelFilter::ERROR));
        assert_eq!(filter("off"), None);
        assert_eq!(filter("3"), None);
        assert_eq!(filter(""), None);
    }

    #[tokio::test]
    async fn test_bind_addr_accepts_ipv6_host() {
        let config = Config::from_toml_str("[server]\nhost = \"::1\"\nport = 0").unwrap();
        assert_eq!(config.bind_addr(), ("::1", 0));

        // Resolves without parsing a "host:port" string
        let addrs: Vec<_> = tokio::net::lookup_host(config.bind_addr())
            .await
            .unwrap()
            .collect();
        assert!(addrs.iter().all(|addr| addr.is_ipv6()));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let (config, source) = Config::load(Path::new("/nonexistent/courier.toml")).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.server.port, 8080);
    }
}
