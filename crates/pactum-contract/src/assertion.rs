//! Test-facing assertions: match an observed message against a pact and
//! render any failure for a human.

use crate::message::{RequestMessage, ResponseMessage};
use crate::pact::Pact;
use pactum_kernel::Mismatch;
use std::fmt;

/// A message that does not satisfy its pact.
///
/// Renders as `Failed asserting that request `desc` matches Pact` followed by
/// either the single failure, or the failure count and one `path:\nmessage`
/// block per flattened failure.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionFailure {
    subject: String,
    mismatch: Mismatch,
}

impl AssertionFailure {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn mismatch(&self) -> &Mismatch {
        &self.mismatch
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed asserting that {}", self.subject)?;
        if self.mismatch.as_collection().is_none() {
            return write!(f, " {}", self.mismatch);
        }
        let failures = self.mismatch.flatten();
        write!(f, " ({} rules failed)", failures.len())?;
        for (path, message) in failures {
            write!(f, "\n{path}:\n{message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AssertionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.mismatch)
    }
}

pub fn assert_request_matches(
    pact: &Pact,
    request: &impl RequestMessage,
) -> Result<(), AssertionFailure> {
    pact.request()
        .assert_match(request)
        .map_err(|mismatch| AssertionFailure {
            subject: format!("request `{}` matches Pact", pact.description()),
            mismatch,
        })
}

pub fn assert_response_matches(
    pact: &Pact,
    response: &impl ResponseMessage,
) -> Result<(), AssertionFailure> {
    pact.response()
        .assert_match(response)
        .map_err(|mismatch| AssertionFailure {
            subject: format!("response `{}` matches Pact", pact.description()),
            mismatch,
        })
}
