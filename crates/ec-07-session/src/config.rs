//! Session configuration.
//!
//! Loaded from `EC_*` environment variables on top of the defaults. Protocol
//! constants (supermajority ratio, genesis hash, identity scheme) are not
//! configurable.

use ec_02_expiry_clock::{ClockError, DurationSpec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

pub const ENV_LEDGER_PATH: &str = "EC_LEDGER_PATH";
pub const ENV_LEADER_ADDRESS: &str = "EC_LEADER_ADDRESS";
pub const ENV_DEFAULT_EXPIRY: &str = "EC_DEFAULT_EXPIRY";
pub const ENV_MIN_CONTENT_LEN: &str = "EC_MIN_CONTENT_LEN";
pub const ENV_LOG_LEVEL: &str = "EC_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ledger file.
    pub ledger_path: PathBuf,
    /// Leader's mail address. Empty means this process cannot propose.
    pub leader_address: String,
    /// Duration spec used when a draft names none, e.g. `12h`.
    pub default_expiry: String,
    /// Minimum proposal content length, in characters.
    pub min_content_len: usize,
    /// Log filter directive.
    pub log_level: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("./data/ledger.json"),
            leader_address: String::new(),
            default_expiry: "12h".to_string(),
            min_content_len: 5,
            log_level: "info".to_string(),
        }
    }
}

impl SessionConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_LEDGER_PATH) {
            config.ledger_path = PathBuf::from(path);
        }
        if let Some(address) = lookup(ENV_LEADER_ADDRESS) {
            config.leader_address = address.trim().to_string();
        }
        if let Some(expiry) = lookup(ENV_DEFAULT_EXPIRY) {
            config.default_expiry = expiry.trim().to_string();
        }
        if let Some(len) = lookup(ENV_MIN_CONTENT_LEN) {
            match len.trim().parse() {
                Ok(len) => config.min_content_len = len,
                Err(_) => warn!(
                    "[ec-07] ignoring {}={:?}: not a number",
                    ENV_MIN_CONTENT_LEN, len
                ),
            }
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        config
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_expiry_spec()?;
        if self.min_content_len == 0 {
            return Err(ConfigError::ZeroMinContentLen);
        }
        if self.ledger_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyLedgerPath);
        }
        Ok(())
    }

    pub fn default_expiry_spec(&self) -> Result<DurationSpec, ConfigError> {
        self.default_expiry
            .parse()
            .map_err(|source| ConfigError::InvalidDefaultExpiry {
                value: self.default_expiry.clone(),
                source,
            })
    }

    /// The leader address, or `MissingLeaderAddress` if unset.
    pub fn require_leader(&self) -> Result<&str, ConfigError> {
        if self.leader_address.is_empty() {
            Err(ConfigError::MissingLeaderAddress)
        } else {
            Ok(&self.leader_address)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid default expiry {value:?}: {source}")]
    InvalidDefaultExpiry { value: String, source: ClockError },

    #[error("Minimum content length must be at least 1")]
    ZeroMinContentLen,

    #[error("Ledger path is empty")]
    EmptyLedgerPath,

    #[error("No leader address configured ({})", ENV_LEADER_ADDRESS)]
    MissingLeaderAddress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_expiry_spec().unwrap().to_string(), "12h");
        assert_eq!(config.min_content_len, 5);
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let config = SessionConfig::from_lookup(lookup(&[
            (ENV_LEDGER_PATH, "/tmp/ledger.json"),
            (ENV_LEADER_ADDRESS, " leader@example.com "),
            (ENV_DEFAULT_EXPIRY, "3d"),
            (ENV_MIN_CONTENT_LEN, "10"),
        ]));
        assert_eq!(config.ledger_path, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(config.require_leader().unwrap(), "leader@example.com");
        assert_eq!(config.default_expiry, "3d");
        assert_eq!(config.min_content_len, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_unparsable_length_keeps_default() {
        let config = SessionConfig::from_lookup(lookup(&[(ENV_MIN_CONTENT_LEN, "many")]));
        assert_eq!(config.min_content_len, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = SessionConfig {
            default_expiry: "1000h".into(),
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDefaultExpiry { .. })
        ));

        let config = SessionConfig {
            min_content_len: 0,
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinContentLen));
    }

    #[test]
    fn test_missing_leader() {
        assert_eq!(
            SessionConfig::default().require_leader(),
            Err(ConfigError::MissingLeaderAddress)
        );
    }
}
