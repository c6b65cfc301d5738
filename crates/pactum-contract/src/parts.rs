//! Plumbing shared by the request and response sides of a pact.
//!
//! Each side is a fixed set of named parts (`METHOD`, `PATH`, `HEADERS`,
//! ...). An observed message is decoded into a mapping with the same keys and
//! matched part by part, without short-circuiting.

use pactum_content::{BodyDecoder, HeaderDecoder, scalar_text};
use pactum_kernel::{
    KeyNotFoundMismatch, Matcher, Mismatch, MismatchCollection, ObjectRule, PathSegment, Rule,
    SampleError, SequenceRule, StringRule, ValueMismatch,
};
use serde_json::{Map, Value};

pub const METHOD: &str = "METHOD";
pub const PATH: &str = "PATH";
pub const STATUS_CODE: &str = "STATUS_CODE";
pub const HEADERS: &str = "HEADERS";
pub const BODY: &str = "BODY";

pub(crate) type Part<'a> = (&'static str, &'a dyn Matcher);

/// Match every part against the same-named key of `tested`.
///
/// `preset` is a failure already known for one part (a body that could not
/// be decoded); it stands in for that part's check.
pub(crate) fn assert_parts(
    side: &str,
    parts: &[Part<'_>],
    tested: &Map<String, Value>,
    mut preset: Option<(&'static str, Mismatch)>,
) -> Result<(), Mismatch> {
    let mut failures: Vec<(PathSegment, Mismatch)> = Vec::new();
    for &(key, rule) in parts {
        let outcome = match preset.take_if(|(failed, _)| *failed == key) {
            Some((_, mismatch)) => Err(mismatch),
            None => match tested.get(key) {
                Some(value) => rule.assert_match(value),
                None => Err(KeyNotFoundMismatch::new(key).into()),
            },
        };
        if let Err(mismatch) = outcome {
            failures.push((PathSegment::from(key), mismatch));
        }
    }
    MismatchCollection::raise_if_any(failures, |n| format!("{n} {side} parts not matching"))
}

pub(crate) fn sample_parts(parts: &[Part<'_>]) -> Result<Value, SampleError> {
    let mut sample = Map::new();
    for &(key, rule) in parts {
        sample.insert(key.to_string(), rule.sample()?);
    }
    Ok(Value::Object(sample))
}

/// Headers and body of an observed message, decoded.
pub(crate) struct Observed {
    pub headers: Value,
    pub body: Value,
    pub body_failure: Option<(&'static str, Mismatch)>,
}

impl Observed {
    pub fn decode(headers: &[(String, String)], body: &[u8]) -> Self {
        let headers = HeaderDecoder::decode(headers.iter().map(|(name, value)| (name, value)));
        let content_type = HeaderDecoder::first(&headers, "Content-Type");
        let (body, body_failure) = match BodyDecoder::decode(body, content_type) {
            Ok(body) => (body, None),
            Err(error) => {
                let mismatch = ValueMismatch::new(
                    "Body could not be decoded as {expected}: {actual}",
                    content_type.unwrap_or_default(),
                    error.to_string(),
                );
                (Value::Null, Some((BODY, mismatch.into())))
            }
        };
        Self {
            headers,
            body,
            body_failure,
        }
    }
}

/// Header `(name, value)` pairs from a headers sample; sequences repeat the name.
pub(crate) fn header_pairs(headers: &Value) -> Vec<(String, String)> {
    let Some(headers) = headers.as_object() else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    for (name, value) in headers {
        match value {
            Value::Array(values) => {
                pairs.extend(values.iter().map(|value| (name.clone(), scalar_text(value))));
            }
            Value::Null => {}
            scalar => pairs.push((name.clone(), scalar_text(scalar))),
        }
    }
    pairs
}

/// Rebuild a headers rule keyed by canonical names. A declared sample only
/// survives when the names are already canonical.
pub(crate) fn canonical_headers(headers: ObjectRule) -> ObjectRule {
    let canonical = headers
        .properties()
        .all(|(name, _)| HeaderDecoder::normalize_name(name) == name);
    if canonical {
        return headers;
    }
    ObjectRule::new(
        headers
            .properties()
            .map(|(name, rule)| (HeaderDecoder::normalize_name(name), rule.clone())),
    )
}

/// Loose header rules for a recorded message: any string per observed value.
pub(crate) fn recorded_headers(headers: &Value) -> ObjectRule {
    let Some(headers) = headers.as_object() else {
        return ObjectRule::new(Vec::<(String, Rule)>::new());
    };
    ObjectRule::new(headers.iter().filter_map(|(name, value)| {
        let rule = match value {
            Value::String(text) => Rule::from(StringRule::new(text.as_str())),
            Value::Array(values) => Rule::from(SequenceRule::new(
                values
                    .iter()
                    .map(|value| Rule::from(StringRule::new(scalar_text(value))))
                    .collect(),
            )),
            _ => return None,
        };
        Some((name.clone(), rule))
    }))
}

/// Exact body rule for a recorded message; nothing for an empty body.
pub(crate) fn recorded_body(body: Value) -> Option<Rule> {
    let empty = match &body {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    };
    (!empty).then(|| Rule::equals(body))
}
