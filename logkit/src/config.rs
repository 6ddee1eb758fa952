//! Logger configuration.
//!
//! A [`LogConfig`] is usually built in code, but it can also be loaded
//! hierarchically:
//! 1. Default values (`info`, `stdout`, `console`)
//! 2. `config/logging.yaml`, if present
//! 3. `LOGKIT_*` environment variables (`LOGKIT_LEVEL`, `LOGKIT_OUTPUT`, `LOGKIT_FORMAT`)

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ConfigError;
use crate::validation;

pub const CONFIG_FILE: &str = "config/logging.yaml";
pub const ENV_PREFIX: &str = "LOGKIT_";

/// Options a [`Logger`](crate::Logger) is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum severity: debug, info, warn, error or fatal.
    #[validate(custom(function = validation::validate_level))]
    pub level: String,

    /// `"stdout"`, `"stderr"` or a file path.
    #[validate(length(min = 1))]
    pub output: String,

    /// Encoder name: `json` or `console`.
    #[validate(custom(function = validation::validate_format))]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            output: "stdout".into(),
            format: "console".into(),
        }
    }
}

impl LogConfig {
    pub fn new(
        level: impl Into<String>,
        output: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            level: level.into(),
            output: output.into(),
            format: format.into(),
        }
    }

    /// Load configuration from the default file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(LogConfig::default()));

        if Path::new(CONFIG_FILE).exists() {
            figment = figment.merge(Yaml::file(CONFIG_FILE));
        } else {
            tracing::debug!(file = CONFIG_FILE, "config file not found, using defaults");
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load configuration from a specific file, with environment overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        Self::extract(
            Figment::from(Serialized::defaults(LogConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config_validates() {
        let config = LogConfig::default();
        config.validate().expect("Default config should validate");
        assert_eq!(config, LogConfig::new("info", "stdout", "console"));
    }

    #[test]
    fn test_invalid_fields_reported() {
        let config = LogConfig::new("loud", "", "xml");
        let errors = config.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("level"));
        assert!(fields.contains_key("output"));
        assert!(fields.contains_key("format"));
    }

    #[test]
    fn test_load_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = LogConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config, LogConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_environment_override() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(CONFIG_FILE, "level: debug\nformat: json\n")?;
            jail.set_env("LOGKIT_OUTPUT", "app.log");

            let config = LogConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config, LogConfig::new("debug", "app.log", "json"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_level_in_file_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("logging.yaml", "level: chatty\n")?;
            match LogConfig::load_from_path("logging.yaml") {
                Err(ConfigError::Validation(errors)) => {
                    assert!(errors.field_errors().contains_key("level"));
                }
                other => panic!("expected validation error, got {:?}", other),
            }
            Ok(())
        });
    }

    #[test]
    fn test_missing_file() {
        let err = LogConfig::load_from_path("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
