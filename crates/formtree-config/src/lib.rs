//! Engine configuration for formtree.
//!
//! Every key is optional; a missing `formtree.toml` or an empty table yields
//! the defaults below, which match what the reporting API expects.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Message attached to a required field that has no value.
pub const DEFAULT_REQUIRED_MESSAGE: &str = "This field is required";

/// Field holding the synthetic client id on every array element.
pub const DEFAULT_CLIENT_ID_KEY: &str = "client_id";

/// Server key carrying errors that belong to no single field.
pub const DEFAULT_NON_FIELD_KEY: &str = "non_field_errors";

/// Server key carrying the optimistic-concurrency timestamp.
pub const DEFAULT_MODIFIED_AT_KEY: &str = "modified_at";

/// Error code the server returns for a stale `modified_at`.
pub const DEFAULT_OBSOLETE_CODE: &str = "OBSOLETE_PAYLOAD";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// EngineConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub messages: MessagesConfig,
    pub keys: KeysConfig,
    pub conflict: ConflictConfig,
    pub submit: SubmitConfig,
}

impl EngineConfig {
    /// Parse a configuration document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a configuration file, falling back to defaults when it is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }
}

///
/// MessagesConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagesConfig {
    pub required: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            required: DEFAULT_REQUIRED_MESSAGE.to_string(),
        }
    }
}

///
/// KeysConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysConfig {
    pub client_id: String,
    pub non_field: String,
    pub modified_at: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID_KEY.to_string(),
            non_field: DEFAULT_NON_FIELD_KEY.to_string(),
            modified_at: DEFAULT_MODIFIED_AT_KEY.to_string(),
        }
    }
}

///
/// ConflictConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConflictConfig {
    pub obsolete_code: String,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            obsolete_code: DEFAULT_OBSOLETE_CODE.to_string(),
        }
    }
}

///
/// SubmitConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmitConfig {
    /// Remove client ids from array elements before a request body is built.
    pub strip_client_ids: bool,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.keys.client_id, DEFAULT_CLIENT_ID_KEY);
        assert_eq!(config.conflict.obsolete_code, DEFAULT_OBSOLETE_CODE);
        assert!(!config.submit.strip_client_ids);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [messages]
            required = "Required"

            [submit]
            strip_client_ids = true
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.messages.required, "Required");
        assert!(config.submit.strip_client_ids);
        assert_eq!(config.keys.non_field, DEFAULT_NON_FIELD_KEY);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = EngineConfig::from_toml_str("[keys]\nclientid = \"x\"\n")
            .expect_err("misspelled key should fail");

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
