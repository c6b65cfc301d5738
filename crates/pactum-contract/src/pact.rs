//! The pact aggregate.

use crate::error::PactError;
use crate::request::PactRequest;
use crate::response::PactResponse;
use pactum_kernel::{Mismatch, MismatchCollection, PathSegment};
use semver::Version;

const TARGET: &str = "pactum::contract";

/// Newest pact document version this engine understands.
pub const PACT_VERSION: &str = "2.0";

const SUPPORTED: Version = Version::new(2, 0, 0);

/// A request/response contract. Always satisfies its own samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Pact {
    request: PactRequest,
    response: PactResponse,
    description: String,
    version: String,
}

impl Pact {
    /// Assemble a pact, checking its version and that the message each side's
    /// samples describe is accepted by that side.
    ///
    /// Either side failing yields a collection keyed `REQUEST`/`RESPONSE`
    /// with the message `Pact is not valid`.
    pub fn new(
        request: PactRequest,
        response: PactResponse,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, PactError> {
        let description = description.into();
        let version = version.into();
        ensure_supported(&version)?;

        let mut failures: Vec<(PathSegment, Mismatch)> = Vec::new();
        let request_check = request
            .sample_message()
            .and_then(|message| request.assert_match(&message).map_err(PactError::Invalid));
        if let Some(mismatch) = mismatch_of(request_check)? {
            failures.push(("REQUEST".into(), mismatch));
        }
        let response_check = response
            .sample_message()
            .and_then(|message| response.assert_match(&message).map_err(PactError::Invalid));
        if let Some(mismatch) = mismatch_of(response_check)? {
            failures.push(("RESPONSE".into(), mismatch));
        }

        if let Some(collection) = MismatchCollection::new(failures, "Pact is not valid") {
            tracing::warn!(
                target: TARGET,
                description = %description,
                failed = collection.len(),
                "pact does not satisfy its own samples"
            );
            return Err(PactError::Invalid(collection.into()));
        }

        tracing::debug!(target: TARGET, description = %description, version = %version, "pact assembled");
        Ok(Self {
            request,
            response,
            description,
            version,
        })
    }

    /// Assemble a pact at [`PACT_VERSION`].
    pub fn current(
        request: PactRequest,
        response: PactResponse,
        description: impl Into<String>,
    ) -> Result<Self, PactError> {
        Self::new(request, response, description, PACT_VERSION)
    }

    pub fn request(&self) -> &PactRequest {
        &self.request
    }

    pub fn response(&self) -> &PactResponse {
        &self.response
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Split a self-check outcome into "mismatch to report" and "abort".
fn mismatch_of(outcome: Result<(), PactError>) -> Result<Option<Mismatch>, PactError> {
    match outcome {
        Ok(()) => Ok(None),
        Err(PactError::Invalid(mismatch)) => Ok(Some(mismatch)),
        Err(other) => Err(other),
    }
}

/// `2` and `2.0` read as `2.0.0`; more than three components is invalid.
fn parse_version(version: &str) -> Option<Version> {
    let mut components = [0u64; 3];
    let mut count = 0;
    for part in version.trim().split('.') {
        if count == components.len() || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        components[count] = part.parse().ok()?;
        count += 1;
    }
    let [major, minor, patch] = components;
    Some(Version::new(major, minor, patch))
}

fn ensure_supported(version: &str) -> Result<(), PactError> {
    let parsed = parse_version(version).ok_or_else(|| PactError::InvalidVersion {
        version: version.to_string(),
    })?;
    if parsed > SUPPORTED {
        return Err(PactError::UnsupportedVersion {
            version: version.to_string(),
            supported: PACT_VERSION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pactum_kernel::{ObjectRule, Rule, StringEqualsRule, StringRule};

    fn request() -> PactRequest {
        PactRequest::new(StringEqualsRule::new("GET", true), StringEqualsRule::new("/ping", true))
    }

    fn response() -> PactResponse {
        PactResponse::new(Rule::equals(200))
    }

    #[test]
    fn versions_pad_and_compare() {
        assert_eq!(parse_version("2"), Some(Version::new(2, 0, 0)));
        assert_eq!(parse_version("1.5"), Some(Version::new(1, 5, 0)));
        assert_eq!(parse_version("2.0.0.1"), None);
        assert_eq!(parse_version("2.x"), None);
        assert_eq!(parse_version(""), None);
        assert!(ensure_supported("2.0").is_ok());
        assert!(ensure_supported("1").is_ok());
        assert!(matches!(
            ensure_supported("2.0.1"),
            Err(PactError::UnsupportedVersion { .. })
        ));
        assert!(matches!(ensure_supported("3"), Err(PactError::UnsupportedVersion { .. })));
        assert!(matches!(ensure_supported("two"), Err(PactError::InvalidVersion { .. })));
    }

    #[test]
    fn consistent_pact_is_assembled() {
        let pact = Pact::current(request(), response(), "ping").expect("consistent");
        assert_eq!(pact.version(), PACT_VERSION);
        assert_eq!(pact.description(), "ping");
        assert_eq!(pact.request().method(), &Rule::from(StringEqualsRule::new("GET", true)));
    }

    #[test]
    fn body_that_cannot_survive_its_content_type_is_rejected() {
        // An object body declared as plain text comes back as a string.
        let request = request()
            .with_headers(ObjectRule::new([(
                "Content-Type",
                Rule::from(StringEqualsRule::new("text/plain", true)),
            )]))
            .with_body(ObjectRule::new([("q", Rule::from(StringRule::new("x")))]));
        let error = Pact::current(request, response(), "broken").expect_err("inconsistent");
        let mismatch = error.as_mismatch().expect("self-check failure");
        let collection = mismatch.as_collection().expect("collection");
        assert_eq!(collection.message(), "Pact is not valid");
        assert_eq!(collection.len(), 1);
        assert!(collection.get("REQUEST").is_some());
        assert!(collection.get("RESPONSE").is_none());
    }

    #[test]
    fn lowercase_method_sample_never_matches() {
        let request = PactRequest::new(StringEqualsRule::new("get", true), StringEqualsRule::new("/", true));
        let error = Pact::current(request, response(), "").expect_err("methods are upper-cased");
        assert_eq!(
            error.as_mismatch().map(Mismatch::flatten),
            Some(vec![(
                "REQUEST.METHOD".to_string(),
                "String \"GET\" should be equal to \"get\"".to_string()
            )])
        );
    }

    #[test]
    fn missing_sample_aborts() {
        let response = PactResponse::new(
            pactum_kernel::CompareRule::greater(199).expect("number"),
        );
        let error = Pact::current(request(), response, "").expect_err("no status sample");
        assert!(matches!(error, PactError::Sample(_)));
    }

    #[test]
    fn unsupported_version_is_rejected_before_the_self_check() {
        let error = Pact::new(request(), response(), "", "9.1").expect_err("too new");
        assert_eq!(
            error.to_string(),
            "unsupported pact version `9.1`, the newest supported version is `2.0`"
        );
    }
}
