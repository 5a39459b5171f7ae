//! Run configuration.
//!
//! Every setting comes from the environment (or the matching CLI flag in
//! the binary). Empty values count as missing.

use std::path::PathBuf;
use std::time::Duration;

use metadata_client::HttpClientConfig;
use thiserror::Error;

use crate::changeset;

pub const INTEGRATION_ID: &str = "INTEGRATION_ID";
pub const INPUT_DIR: &str = "INPUT_DIR";
pub const OUTPUT_DIR: &str = "OUTPUT_DIR";
pub const SESSION_TOKEN: &str = "SESSION_TOKEN";
pub const API_HOST: &str = "PENNSIEVE_API_HOST";
pub const API2_HOST: &str = "PENNSIEVE_API_HOST2";
pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub integration_id: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub session_token: String,
    pub api_host: String,
    pub api2_host: String,
    pub http_timeout: Duration,
}

impl ProcessorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any name-to-value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let http_timeout = match lookup(HTTP_TIMEOUT_SECS).filter(|v| !v.trim().is_empty()) {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_HTTP_TIMEOUT,
        };

        Ok(Self {
            integration_id: required(INTEGRATION_ID)?,
            input_dir: PathBuf::from(required(INPUT_DIR)?),
            output_dir: PathBuf::from(required(OUTPUT_DIR)?),
            session_token: required(SESSION_TOKEN)?,
            api_host: required(API_HOST)?,
            api2_host: required(API2_HOST)?,
            http_timeout,
        })
    }

    /// Rejects empty settings. Used for configs built field by field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, bool); 6] = [
            (INTEGRATION_ID, self.integration_id.trim().is_empty()),
            (INPUT_DIR, self.input_dir.as_os_str().is_empty()),
            (OUTPUT_DIR, self.output_dir.as_os_str().is_empty()),
            (SESSION_TOKEN, self.session_token.trim().is_empty()),
            (API_HOST, self.api_host.trim().is_empty()),
            (API2_HOST, self.api2_host.trim().is_empty()),
        ];
        match checks.iter().find(|(_, empty)| *empty) {
            Some((name, _)) => Err(ConfigError::Missing(*name)),
            None => Ok(()),
        }
    }

    pub fn changeset_path(&self) -> PathBuf {
        changeset::changeset_path(&self.output_dir)
    }

    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig::new(&self.api_host, &self.api2_host, &self.session_token)
            .with_timeout(self.http_timeout)
    }
}

pub fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            name: HTTP_TIMEOUT_SECS,
            value: value.to_string(),
        })
}
