//! Settings read from the environment once per cold start.

use std::time::Duration;

use crate::connection_string::{ConnectionStringError, StorageConnection};

const DEFAULT_TABLE_NAME: &str = "album-images";
const DEFAULT_READ_URL_EXPIRY_MINUTES: u64 = 60;
// SigV4 presigned URLs live at most 7 days, and the 60s skew allowance counts against it.
const MAX_READ_URL_EXPIRY_MINUTES: u64 = 7 * 24 * 60 - 1;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("STORAGE_CONNECTION_STRING is invalid: {0}")]
    ConnectionString(#[from] ConnectionStringError),
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// ========== STORAGE ==========
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub connection: StorageConnection,
    pub bucket: String,
    pub read_url_expiry: Duration,
}

impl StorageSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let connection: StorageConnection =
            required(&lookup, "STORAGE_CONNECTION_STRING")?.parse()?;
        let bucket = required(&lookup, "STORAGE_BUCKET")?;

        let minutes = match optional(&lookup, "READ_URL_EXPIRY_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|m| (1..=MAX_READ_URL_EXPIRY_MINUTES).contains(m))
                .ok_or_else(|| ConfigError::Invalid {
                    name: "READ_URL_EXPIRY_MINUTES",
                    reason: format!(
                        "expected whole minutes between 1 and {}, got {:?}",
                        MAX_READ_URL_EXPIRY_MINUTES, raw
                    ),
                })?,
            None => DEFAULT_READ_URL_EXPIRY_MINUTES,
        };

        Ok(Self {
            connection,
            bucket,
            read_url_expiry: Duration::from_secs(minutes * 60),
        })
    }
}

// ========== METADATA ==========
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataSettings {
    pub table_name: String,
    /// Override for DynamoDB Local and the like
    pub endpoint: Option<String>,
}

impl MetadataSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            table_name: optional(&lookup, "TABLE_NAME")
                .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            endpoint: optional(&lookup, "DYNAMODB_ENDPOINT"),
        }
    }
}

// ========== VISION ==========
#[derive(Clone)]
pub struct VisionSettings {
    pub endpoint: String,
    pub api_key: String,
}

impl std::fmt::Debug for VisionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl VisionSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: required(&lookup, "VISION_ENDPOINT")?,
            api_key: required(&lookup, "VISION_KEY")?,
        })
    }
}
