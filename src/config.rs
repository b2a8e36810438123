use std::{path::PathBuf, str::FromStr};

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::Level;

use crate::error::AppError;

/// Service settings. Loaded from defaults, an optional `color_summarizer.*`
/// file, then unprefixed environment variables (`DB_PATH`, `PORT`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    pub csv_path: PathBuf,
    pub bind_host: String,
    pub port: u16,
    pub history_limit: u32,
    pub max_upload_bytes: usize,
    pub max_concurrent_requests: usize,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("assets/results.db"),
            csv_path: PathBuf::from("assets/results.csv"),
            bind_host: "0.0.0.0".to_string(),
            port: 5000,
            history_limit: 50,
            max_upload_bytes: 16 * 1024 * 1024,
            max_concurrent_requests: 64,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, AppError> {
        let defaults = Self::default();
        let settings: Settings = Config::builder()
            .set_default("db_path", defaults.db_path.to_string_lossy().into_owned())?
            .set_default("csv_path", defaults.csv_path.to_string_lossy().into_owned())?
            .set_default("bind_host", defaults.bind_host)?
            .set_default("port", defaults.port as i64)?
            .set_default("history_limit", defaults.history_limit as i64)?
            .set_default("max_upload_bytes", defaults.max_upload_bytes as i64)?
            .set_default("max_concurrent_requests", defaults.max_concurrent_requests as i64)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::with_name("color_summarizer").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.history_limit == 0 {
            return Err(AppError::InvalidSetting(
                "history_limit must be greater than 0".to_string(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(AppError::InvalidSetting(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrent_requests == 0 {
            return Err(AppError::InvalidSetting(
                "max_concurrent_requests must be greater than 0".to_string(),
            ));
        }

        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, AppError> {
        Level::from_str(&self.log_level)
            .map_err(|_| AppError::InvalidSetting(format!("unknown log level {}", self.log_level)))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.bind_address(), "0.0.0.0:5000");
        assert_eq!(settings.level().unwrap(), Level::INFO);
    }

    #[test]
    fn test_rejects_zero_limits() {
        let settings = Settings {
            history_limit: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(AppError::InvalidSetting(_))));

        let settings = Settings {
            max_concurrent_requests: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let settings = Settings {
            log_level: "chatty".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
