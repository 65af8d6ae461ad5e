//! Environment-driven settings (`DROPQUEUE_*`).

use crate::transport::SimulatorConfig;
use crate::validation::{AcceptedTypes, UploadRules};
use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;

const ENV_PREFIX: &str = "DROPQUEUE_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment configuration: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid value for DROPQUEUE_{field}: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub max_file_size: u64,
    pub accepted_types: String,
    pub max_name_length: usize,
    pub failure_rate: f64,
    pub seed: Option<u64>,
    pub time_scale: f64,
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for Settings {
    fn default() -> Self {
        let rules = UploadRules::default();
        let simulator = SimulatorConfig::default();

        Self {
            max_file_size: rules.max_file_size,
            accepted_types: rules.accepted_types.to_string(),
            max_name_length: rules.max_name_length,
            failure_rate: simulator.failure_rate,
            seed: simulator.seed,
            time_scale: simulator.time_scale,
            metrics_addr: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment, after loading `.env` if present
    pub fn from_env() -> ConfigResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_vars(std::env::vars())
    }

    /// Read settings from explicit key/value pairs using the same prefix
    pub fn from_vars<I>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let settings: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ConfigError::OutOfRange {
                field: "FAILURE_RATE",
                value: self.failure_rate,
            });
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "TIME_SCALE",
                value: self.time_scale,
            });
        }
        Ok(())
    }

    pub fn upload_rules(&self) -> UploadRules {
        UploadRules {
            max_file_size: self.max_file_size,
            accepted_types: AcceptedTypes::from(self.accepted_types.clone()),
            max_name_length: self.max_name_length,
        }
    }

    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            failure_rate: self.failure_rate,
            seed: self.seed,
            time_scale: self.time_scale,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.upload_rules(), UploadRules::default());
        assert_eq!(settings.simulator_config(), SimulatorConfig::default());
    }

    #[test]
    fn test_prefixed_overrides() {
        let settings = Settings::from_vars(vars(&[
            ("DROPQUEUE_MAX_FILE_SIZE", "1024"),
            ("DROPQUEUE_ACCEPTED_TYPES", "image/*,.txt"),
            ("DROPQUEUE_FAILURE_RATE", "0"),
            ("DROPQUEUE_SEED", "99"),
            ("DROPQUEUE_METRICS_ADDR", "127.0.0.1:9100"),
        ]))
        .unwrap();

        let rules = settings.upload_rules();
        assert_eq!(rules.max_file_size, 1024);
        assert_eq!(rules.accepted_types, AcceptedTypes::list(["image/*", ".txt"]));

        let simulator = settings.simulator_config();
        assert_eq!(simulator.failure_rate, 0.0);
        assert_eq!(simulator.seed, Some(99));
        assert_eq!(settings.metrics_addr.map(|a| a.port()), Some(9100));
    }

    #[test]
    fn test_non_finite_simulator_values_are_rejected() {
        for (key, value) in [
            ("DROPQUEUE_FAILURE_RATE", "NaN"),
            ("DROPQUEUE_FAILURE_RATE", "1.5"),
            ("DROPQUEUE_TIME_SCALE", "inf"),
            ("DROPQUEUE_TIME_SCALE", "-1"),
        ] {
            let result = Settings::from_vars(vars(&[(key, value)]));
            assert!(
                matches!(result, Err(ConfigError::OutOfRange { .. })),
                "{key}={value} was accepted"
            );
        }

        // Large but finite scales are accepted; the simulator saturates its delays
        let settings = Settings::from_vars(vars(&[("DROPQUEUE_TIME_SCALE", "1e308")])).unwrap();
        assert_eq!(settings.simulator_config().time_scale, 1e308);
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let result = Settings::from_vars(vars(&[("DROPQUEUE_MAX_FILE_SIZE", "lots")]));
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }
}
