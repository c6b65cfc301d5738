//! Contract document text layer.
//!
//! The format is always an explicit argument: callers infer it from a path
//! (or a media type) and pass it down.

use crate::config::CodecConfig;
use crate::decode::decode_rule;
use crate::encode::encode;
use crate::error::DecodeError;
use pactum_kernel::Rule;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid json document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid yaml document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractFormat {
    Json,
    Yaml,
}

impl ContractFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

pub fn parse_document(text: &str, format: ContractFormat) -> Result<Value, CodecError> {
    Ok(match format {
        ContractFormat::Json => serde_json::from_str(text)?,
        ContractFormat::Yaml => serde_yaml::from_str(text)?,
    })
}

pub fn render_document(value: &Value, format: ContractFormat) -> Result<String, CodecError> {
    Ok(match format {
        ContractFormat::Json => serde_json::to_string_pretty(value)?,
        ContractFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

/// Parse and decode a rule tree document.
pub fn parse_rule(text: &str, format: ContractFormat, config: &CodecConfig) -> Result<Rule, CodecError> {
    let document = parse_document(text, format)?;
    Ok(decode_rule(&document, config)?)
}

/// Encode and render a rule tree document.
pub fn render_rule(rule: &Rule, format: ContractFormat, config: &CodecConfig) -> Result<String, CodecError> {
    render_document(&encode(rule, config), format)
}
