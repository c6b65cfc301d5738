//! Errors raised while decoding or encoding rule documents.

use pactum_kernel::{Mismatch, RuleError};
use thiserror::Error;

/// A contract document cannot be decoded into a rule tree.
///
/// Every variant except `Mismatch` is a configuration error: the document is
/// malformed and decoding stops. `Mismatch` means the document is well formed
/// but a declared sample does not satisfy its own rule; sibling failures of
/// that kind are aggregated before being raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unknown rule alias `{alias}`")]
    UnknownAlias { alias: String },

    #[error("rule tag must be a string, got {found}")]
    InvalidTag { found: &'static str },

    #[error("extra attributes for `{alias}` rule: {}", .attributes.join(", "))]
    ExtraAttributes {
        alias: &'static str,
        attributes: Vec<String>,
    },

    #[error("`{alias}` rule is missing attribute `{attribute}`")]
    MissingAttribute {
        alias: &'static str,
        attribute: &'static str,
    },

    #[error("`{alias}` rule attribute `{attribute}` must be {expected}, got {found}")]
    InvalidAttribute {
        alias: &'static str,
        attribute: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("expected {expected}, got {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("rule nesting exceeds the maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error(transparent)]
    Rule(RuleError),

    #[error("contract sample does not match its rule: {0}")]
    Mismatch(Mismatch),
}

impl DecodeError {
    pub fn as_mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Mismatch(mismatch) => Some(mismatch),
            _ => None,
        }
    }

    /// Whether decoding can never succeed for this document.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::Mismatch(_))
    }
}

impl From<RuleError> for DecodeError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::InvalidSample(mismatch) => Self::Mismatch(mismatch),
            other => Self::Rule(other),
        }
    }
}
