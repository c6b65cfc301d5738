//! The request side of a pact.

use crate::error::PactError;
use crate::message::{HttpRequest, RequestMessage};
use crate::parts::{
    BODY, HEADERS, METHOD, Observed, PATH, Part, assert_parts, canonical_headers,
    header_pairs, recorded_body, recorded_headers, sample_parts,
};
use pactum_content::{BodyEncoder, HeaderDecoder, scalar_text};
use pactum_kernel::{Matcher, Mismatch, ObjectRule, Rule, SampleError, StringEqualsRule, TypeMismatch};
use pactum_kernel::value::type_name;
use serde_json::{Map, Value};

/// Rules for the method, path, headers and (optionally) body of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct PactRequest {
    method: Rule,
    path: Rule,
    headers: ObjectRule,
    body: Option<Rule>,
}

impl PactRequest {
    pub fn new(method: impl Into<Rule>, path: impl Into<Rule>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
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

    /// Record a request exactly as observed: method and path must be equal,
    /// each header must be a string, the body must be equal.
    pub fn from_message(message: &impl RequestMessage) -> Self {
        let observed = Observed::decode(message.headers(), message.body());
        let mut request = Self::new(
            StringEqualsRule::new(message.method().to_ascii_uppercase(), true),
            StringEqualsRule::new(message.path(), true),
        )
        .with_headers(recorded_headers(&observed.headers));
        request.body = recorded_body(observed.body);
        request
    }

    pub fn method(&self) -> &Rule {
        &self.method
    }

    pub fn path(&self) -> &Rule {
        &self.path
    }

    pub fn headers(&self) -> &ObjectRule {
        &self.headers
    }

    pub fn body(&self) -> Option<&Rule> {
        self.body.as_ref()
    }

    fn parts(&self) -> Vec<Part<'_>> {
        let mut parts: Vec<Part<'_>> = Vec::with_capacity(4);
        parts.push((METHOD, &self.method));
        parts.push((PATH, &self.path));
        parts.push((HEADERS, &self.headers));
        if let Some(body) = &self.body {
            parts.push((BODY, body));
        }
        parts
    }

    /// `{METHOD, PATH, HEADERS, BODY?}` built from each part's sample.
    pub fn sample(&self) -> Result<Value, SampleError> {
        sample_parts(&self.parts())
    }

    /// Match an already-decoded request mapping keyed like [`Self::sample`].
    pub fn assert_value(&self, tested: &Value) -> Result<(), Mismatch> {
        let Some(tested) = tested.as_object() else {
            return Err(TypeMismatch::new("object", type_name(tested)).into());
        };
        assert_parts("request", &self.parts(), tested, None)
    }

    /// Decode a request message and match it part by part.
    pub fn assert_match(&self, message: &impl RequestMessage) -> Result<(), Mismatch> {
        let observed = Observed::decode(message.headers(), message.body());
        let mut tested = Map::new();
        tested.insert(METHOD.into(), Value::String(message.method().to_ascii_uppercase()));
        tested.insert(PATH.into(), Value::String(message.path().to_string()));
        tested.insert(HEADERS.into(), observed.headers);
        tested.insert(BODY.into(), observed.body);
        assert_parts("request", &self.parts(), &tested, observed.body_failure)
    }

    /// The request this side's samples describe, body encoded per the
    /// sampled `Content-Type`.
    pub fn sample_message(&self) -> Result<HttpRequest, PactError> {
        let headers = self.headers.sample()?;
        let body = match &self.body {
            Some(body) => body.sample()?,
            None => Value::Null,
        };
        let content_type = HeaderDecoder::first(&headers, "Content-Type");
        let body = BodyEncoder::encode(&body, content_type)?;
        Ok(HttpRequest {
            method: scalar_text(&self.method.sample()?),
            path: scalar_text(&self.path.sample()?),
            headers: header_pairs(&headers),
            body,
        })
    }
}
