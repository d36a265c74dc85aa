//! Process parameters of the polling logger.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::reading::Model;
use crate::retry::RetryPolicy;

/// Pause between acquisition cycles when none is configured, in milliseconds.
pub const DEFAULT_INTERVAL_MS: u32 = 3000;

/// BCM number of the data line when none is configured (wiringPi pin 0).
pub const DEFAULT_PIN: u8 = 17;

/// Usage line listing the positional arguments in order.
pub const USAGE: &str =
    "[interval_ms] [retries] [retry_delay_ms] [log_file|-] [bcm_pin] [dht11|dht22]";

/// Configuration of the polling logger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Pause after every acquisition cycle.
    pub interval_ms: u32,
    /// Retries within one cycle.
    pub retry: RetryPolicy,
    /// File the records are appended to; standard output when `None`.
    pub log_file: Option<PathBuf>,
    /// BCM number of the data line.
    pub pin: u8,
    pub model: Model,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            retry: RetryPolicy::default(),
            log_file: None,
            pin: DEFAULT_PIN,
            model: Model::default(),
        }
    }
}

/// Errors from parsing the positional arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An argument could not be parsed for its position.
    InvalidArgument { name: &'static str, value: String },
    /// More arguments than positions.
    UnexpectedArgument(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidArgument { name, value } => {
                write!(f, "invalid {name}: {value:?}")
            }
            ConfigError::UnexpectedArgument(value) => {
                write!(f, "unexpected argument {value:?}, usage: {USAGE}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl LoggerConfig {
    /// Parses the positional arguments, program name excluded.
    ///
    /// Every position is optional; omitted ones keep their defaults.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter().map(Into::into);

        if let Some(value) = args.next() {
            config.interval_ms = parse("interval_ms", value)?;
        }
        if let Some(value) = args.next() {
            config.retry.retries = parse("retries", value)?;
        }
        if let Some(value) = args.next() {
            config.retry.retry_delay_ms = parse("retry_delay_ms", value)?;
        }
        if let Some(value) = args.next() {
            config.log_file = (value != "-").then(|| PathBuf::from(value));
        }
        if let Some(value) = args.next() {
            config.pin = parse("bcm_pin", value)?;
        }
        if let Some(value) = args.next() {
            config.model = parse("model", value)?;
        }
        if let Some(extra) = args.next() {
            return Err(ConfigError::UnexpectedArgument(extra));
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    let parsed = value.trim().parse::<T>().ok();
    parsed.ok_or(ConfigError::InvalidArgument { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config.interval_ms, 3000);
        assert_eq!(config.retry, RetryPolicy::new(3, 500));
        assert_eq!(config.log_file, None);
        assert_eq!(config.pin, 17);
        assert_eq!(config.model, Model::Dht22);
    }

    #[test]
    fn test_all_positions() {
        let config =
            LoggerConfig::from_args(["5000", "1", "250", "/var/log/dht.csv", "4", "dht11"]).unwrap();
        assert_eq!(config.interval_ms, 5000);
        assert_eq!(config.retry, RetryPolicy::new(1, 250));
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/dht.csv")));
        assert_eq!(config.pin, 4);
        assert_eq!(config.model, Model::Dht11);
    }

    #[test]
    fn test_dash_means_stdout() {
        let config = LoggerConfig::from_args(["3000", "3", "500", "-", "22"]).unwrap();
        assert_eq!(config.log_file, None);
        assert_eq!(config.pin, 22);
    }

    #[test]
    fn test_out_of_range_retries() {
        let err = LoggerConfig::from_args(["3000", "300"]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidArgument {
                name: "retries",
                value: "300".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_model() {
        let err = LoggerConfig::from_args(["1", "1", "1", "-", "17", "bme280"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgument { name: "model", .. }));
    }

    #[test]
    fn test_extra_argument() {
        let err =
            LoggerConfig::from_args(["1", "1", "1", "-", "17", "dht22", "x"]).unwrap_err();
        assert_eq!(err, ConfigError::UnexpectedArgument("x".to_string()));
    }
}
