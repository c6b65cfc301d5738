//! The response side of a pact.

use crate::error::PactError;
use crate::message::{HttpResponse, ResponseMessage};
use crate::parts::{
    BODY, HEADERS, Observed, Part, STATUS_CODE, assert_parts, canonical_headers, header_pairs,
    recorded_body, recorded_headers, sample_parts,
};
use pactum_content::{BodyEncoder, HeaderDecoder};
use pactum_kernel::value::type_name;
use pactum_kernel::{Matcher, Mismatch, MismatchCollection, ObjectRule, Rule, SampleError, TypeMismatch};
use serde_json::{Map, Value};

/// Rules for the status code, headers and (optionally) body of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct PactResponse {
    status_code: Rule,
    headers: ObjectRule,
    body: Option<Rule>,
}

impl PactResponse {
    pub fn new(status_code: impl Into<Rule>) -> Self {
        Self {
            status_code: status_code.into(),
            headers: ObjectRule::new(Vec::<(String, Rule)>::new()),
            body: None,
        }
    }

    /// Header rules; names are made `Title-Case`.
    pub fn with_headers(mut self, headers: ObjectRule) -> Self {
        self.headers = canonical_headers(headers);
        self
    }

    pub fn with_body(mut self, body: impl Into<Rule>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Record a response exactly as observed.
    pub fn from_message(message: &impl ResponseMessage) -> Self {
        let observed = Observed::decode(message.headers(), message.body());
        let mut response = Self::new(Rule::equals(message.status_code()))
            .with_headers(recorded_headers(&observed.headers));
        response.body = recorded_body(observed.body);
        response
    }

    pub fn status_code(&self) -> &Rule {
        &self.status_code
    }

    pub fn headers(&self) -> &ObjectRule {
        &self.headers
    }

    pub fn body(&self) -> Option<&Rule> {
        self.body.as_ref()
    }

    fn parts(&self) -> Vec<Part<'_>> {
        let mut parts: Vec<Part<'_>> = Vec::with_capacity(3);
        parts.push((STATUS_CODE, &self.status_code));
        parts.push((HEADERS, &self.headers));
        if let Some(body) = &self.body {
            parts.push((BODY, body));
        }
        parts
    }

    /// `{STATUS_CODE, HEADERS, BODY?}` built from each part's sample.
    pub fn sample(&self) -> Result<Value, SampleError> {
        sample_parts(&self.parts())
    }

    pub fn assert_value(&self, tested: &Value) -> Result<(), Mismatch> {
        let Some(tested) = tested.as_object() else {
            return Err(TypeMismatch::new("object", type_name(tested)).into());
        };
        assert_parts("response", &self.parts(), tested, None)
    }

    /// Decode a response message and match it part by part.
    pub fn assert_match(&self, message: &impl ResponseMessage) -> Result<(), Mismatch> {
        let observed = Observed::decode(message.headers(), message.body());
        let mut tested = Map::new();
        tested.insert(STATUS_CODE.into(), Value::from(message.status_code()));
        tested.insert(HEADERS.into(), observed.headers);
        tested.insert(BODY.into(), observed.body);
        assert_parts("response", &self.parts(), &tested, observed.body_failure)
    }

    /// The response this side's samples describe. A status sample that is
    /// not a valid status code is reported as a mismatch under `STATUS_CODE`.
    pub fn sample_message(&self) -> Result<HttpResponse, PactError> {
        let status = self.status_code.sample()?;
        let Some(status_code) = status_code(&status) else {
            let mismatch = TypeMismatch::new("status code", type_name(&status));
            return Err(PactError::Invalid(
                MismatchCollection::single(STATUS_CODE, mismatch.into(), "1 response parts not matching")
                    .into(),
            ));
        };
        let headers = self.headers.sample()?;
        let body = match &self.body {
            Some(body) => body.sample()?,
            None => Value::Null,
        };
        let content_type = HeaderDecoder::first(&headers, "Content-Type");
        Ok(HttpResponse {
            status_code,
            headers: header_pairs(&headers),
            body: BodyEncoder::encode(&body, content_type)?,
        })
    }
}

fn status_code(sample: &Value) -> Option<u16> {
    match sample {
        Value::Number(number) => number.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
