//! Storage connection string: `AccountName=...;AccountKey=...;Region=...;Endpoint=...`
//!
//! Segments are split on `;` and then at the first `=`, so values may carry
//! `=` (base64 padding) but never `;`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConnectionStringError {
    #[error("connection string segment {0} has no '='")]
    MissingSeparator(usize),

    #[error("connection string segment {0} has an empty key")]
    EmptyKey(usize),

    #[error("connection string key {0} appears more than once")]
    DuplicateKey(String),

    #[error("connection string is missing {0}")]
    MissingKey(&'static str),
}

/// Credentials and addressing for the blob store.
#[derive(Clone, PartialEq)]
pub struct StorageConnection {
    /// Access key id of the signing identity
    pub account_name: String,
    /// Secret paired with `account_name`
    pub account_key: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

// Keeps the secret out of logs.
impl fmt::Debug for StorageConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConnection")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl FromStr for StorageConnection {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pairs = parse_pairs(s)?;
        let mut required = |key: &'static str| {
            pairs
                .remove(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConnectionStringError::MissingKey(key))
        };

        let account_name = required("AccountName")?;
        let account_key = required("AccountKey")?;

        Ok(Self {
            account_name,
            account_key,
            region: pairs.remove("Region").filter(|v| !v.is_empty()),
            endpoint: pairs.remove("Endpoint").filter(|v| !v.is_empty()),
        })
    }
}

/// Splits a connection string into its key/value pairs.
pub fn parse_pairs(s: &str) -> Result<BTreeMap<String, String>, ConnectionStringError> {
    let mut pairs = BTreeMap::new();

    for (index, segment) in s.split(';').enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (key, value) = segment
            .split_once('=')
            .ok_or(ConnectionStringError::MissingSeparator(index))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConnectionStringError::EmptyKey(index));
        }

        if pairs.insert(key.to_string(), value.trim().to_string()).is_some() {
            return Err(ConnectionStringError::DuplicateKey(key.to_string()));
        }
    }

    Ok(pairs)
}
