use std::env;
use std::path::PathBuf;

use crate::upload::application::domain::policies::upload_policy::UploadPolicy;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required.")]
    Missing(&'static str),

    #[error("Credentials file '{0}' does not exist or is not a file.")]
    CredentialsNotFound(String),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Where uploads go and how the objects are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket: String,
    pub credentials_path: PathBuf,
    pub public_read: bool,
}

/// Process configuration, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub storage: StorageConfig,
    pub policy: UploadPolicy,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bucket = get("GCP_BUCKET").ok_or(ConfigError::Missing("GCP_BUCKET"))?;

        let credentials_path = get("GCP_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("GCP_CREDENTIALS_PATH"))?;
        if !credentials_path.is_file() {
            return Err(ConfigError::CredentialsNotFound(
                credentials_path.display().to_string(),
            ));
        }

        let public_read = match get("UPROXY_PUBLIC_READ") {
            Some(raw) => parse_bool("UPROXY_PUBLIC_READ", &raw)?,
            None => true,
        };

        let host = get("UPROXY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get("UPROXY_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "UPROXY_PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let workers = match get("UPROXY_WORKERS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        key: "UPROXY_WORKERS",
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Ok(n) => Some(n),
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        key: "UPROXY_WORKERS",
                        reason: e.to_string(),
                    })
                }
            },
            None => None,
        };

        let policy = UploadPolicy::from_lookup(&get)?;

        Ok(Self {
            host,
            port,
            workers,
            storage: StorageConfig {
                bucket,
                credentials_path,
                public_read,
            },
            policy,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}
