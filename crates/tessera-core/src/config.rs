//! Connection configuration.
//!
//! Describes how a storage dialect lays out atomic values. Loaded from TOML so
//! the same model can be pointed at different backends without recompiling.

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid connection config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// WideIntegers
///
/// Physical layout of 128-bit integer fields.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WideIntegers {
    /// One native 128-bit column, one parameter.
    #[default]
    Native,

    /// Two 64-bit halves (high, low), two parameters.
    Split,
}

///
/// ConnectionConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    pub vendor: String,
    pub wide_integers: WideIntegers,
}

impl ConnectionConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            vendor: "generic".to_string(),
            wide_integers: WideIntegers::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = ConnectionConfig::from_toml_str("").expect("empty config should parse");

        assert_eq!(cfg, ConnectionConfig::default());
        assert_eq!(cfg.vendor, "generic");
    }

    #[test]
    fn parses_split_wide_integers() {
        let cfg = ConnectionConfig::from_toml_str(
            r#"
            vendor = "sqlite"
            wide_integers = "split"
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.vendor, "sqlite");
        assert_eq!(cfg.wide_integers, WideIntegers::Split);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ConnectionConfig::from_toml_str("pool_size = 4").unwrap_err();

        assert!(err.to_string().starts_with("invalid connection config"));
    }
}
