//! Registry configuration.
//!
//! Every field has a default, so `{}` is a valid config:
//!
//! ```
//! use survivor_registry::RegistryConfig;
//!
//! let config = RegistryConfig::from_json_str(r#"{ "lock_stripes": 16 }"#).unwrap();
//! assert_eq!(config.lock_stripes, 16);
//! assert_eq!(config.max_name_len, 100);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Longest accepted survivor name, in characters
    pub max_name_len: usize,

    /// Mutex stripes in the lock table
    pub lock_stripes: usize,

    /// Survivor rows pre-allocated by the in-memory store
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_name_len: 100,
            lock_stripes: 64,
            initial_capacity: 1024,
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_stripes == 0 {
            return Err(ConfigError::Invalid {
                field: "lock_stripes",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_name_len == 0 {
            return Err(ConfigError::Invalid {
                field: "max_name_len",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
