//! Error types for rule construction and sample access.
//!
//! These are configuration errors: they signal a malformed contract, not a
//! mismatched runtime value, and are never aggregated into a
//! `MismatchCollection`.

use crate::mismatch::Mismatch;

/// A rule cannot be constructed from the given parts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("regex pattern cannot be an empty string")]
    EmptyPattern,

    #[error("invalid regex pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("datetime format cannot be an empty string")]
    EmptyFormat,

    #[error("invalid datetime format `{format}`")]
    InvalidFormat { format: String },

    #[error("`{rule}` rule needs at least one child rule")]
    NoChildren { rule: &'static str },

    /// The operand of an ordering rule must be a number or a string.
    #[error("unsupported operand for `{rule}`: {found}")]
    UnsupportedOperand { rule: &'static str, found: &'static str },

    /// The declared sample does not satisfy the rule it belongs to.
    #[error("sample does not match its own rule: {0}")]
    InvalidSample(Mismatch),
}

impl RuleError {
    /// The self-consistency mismatch, when that is what failed.
    pub fn as_mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::InvalidSample(mismatch) => Some(mismatch),
            _ => None,
        }
    }
}

/// A sample was requested from a rule that carries none.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("`{rule}` rule does not have a sample")]
    Missing { rule: &'static str },
}
