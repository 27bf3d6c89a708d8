use iris_api::state::{DEFAULT_MAX_BATCH_SIZE, Limits};
use iris_model::ArtifactPaths;
use iris_model::artifact::{DEFAULT_METADATA_PATH, DEFAULT_MODEL_PATH};
use std::env;
use std::net::IpAddr;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub artifact: ArtifactPaths,
    pub limits: Limits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_batch_size: usize = lookup("MAX_BATCH_SIZE")
            .unwrap_or_else(|| DEFAULT_MAX_BATCH_SIZE.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_BATCH_SIZE"))?;
        if max_batch_size == 0 {
            return Err(ConfigError::InvalidValue("MAX_BATCH_SIZE"));
        }

        Ok(Config {
            host: lookup("HOST")
                .unwrap_or_else(|| "0.0.0.0".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HOST"))?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT"))?,
            artifact: ArtifactPaths::new(
                lookup("MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string()),
                lookup("METADATA_PATH").unwrap_or_else(|| DEFAULT_METADATA_PATH.to_string()),
            ),
            limits: Limits { max_batch_size },
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(var) => write!(f, "Invalid value for: {}", var),
        }
    }
}

impl std::error::Error for ConfigError {}
