//! Codec configuration.
//!
//! Passed explicitly to every encode/decode call; there is no ambient
//! codec state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TAG_FIELD: &str = "_rule";
pub const DEFAULT_MAX_DEPTH: usize = 64;

fn default_tag_field() -> String {
    DEFAULT_TAG_FIELD.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid codec config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("tag_field cannot be an empty string")]
    EmptyTagField,

    #[error("max_depth must be at least 1")]
    ZeroDepth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Mapping key that marks a tagged rule node.
    #[serde(default = "default_tag_field")]
    pub tag_field: String,

    /// Maximum nesting depth accepted while decoding.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            tag_field: default_tag_field(),
            max_depth: default_max_depth(),
        }
    }
}

impl CodecConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag_field.is_empty() {
            return Err(ConfigError::EmptyTagField);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }

    pub fn with_tag_field(mut self, tag_field: impl Into<String>) -> Self {
        self.tag_field = tag_field.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = CodecConfig::from_toml_str("").expect("defaults");
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.tag_field, "_rule");
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn overrides_are_applied() {
        let config = CodecConfig::from_toml_str("tag_field = \"@rule\"\nmax_depth = 8\n")
            .expect("valid config");
        assert_eq!(config.tag_field, "@rule");
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            CodecConfig::from_toml_str("tag_field = \"\""),
            Err(ConfigError::EmptyTagField)
        ));
        assert!(matches!(
            CodecConfig::from_toml_str("max_depth = 0"),
            Err(ConfigError::ZeroDepth)
        ));
        assert!(matches!(
            CodecConfig::from_toml_str("tag = \"x\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
