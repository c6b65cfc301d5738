//! The mismatch algebra.
//!
//! A mismatch is the outcome of a failed `Rule::assert_match`. Leaf variants
//! carry a message template with `{expected}`/`{actual}` placeholders and the
//! resolved values; `MismatchCollection` aggregates leaves (or nested
//! collections) keyed by property name or sequence index.

use crate::value::render;
use serde_json::Value;
use std::fmt;

const EXPECTED: &str = "{expected}";
const ACTUAL: &str = "{actual}";

pub const TYPE_MISMATCH_TEMPLATE: &str = "Type {expected} was expected, but got {actual} instead";

fn fill(template: &str, expected: &Value, actual: &Value) -> String {
    template
        .replace(EXPECTED, &render(expected))
        .replace(ACTUAL, &render(actual))
}

/// A single assertion failure, or a keyed aggregation of failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Mismatch {
    /// Wrong shape.
    #[error("{0}")]
    Type(TypeMismatch),

    /// Right shape, wrong content.
    #[error("{0}")]
    Value(ValueMismatch),

    /// A required key is absent.
    #[error("{0}")]
    KeyNotFound(KeyNotFoundMismatch),

    /// Keyed aggregation of the above.
    #[error("{0}")]
    Collection(MismatchCollection),
}

impl Mismatch {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn expected(&self) -> Option<Value> {
        match self {
            Self::Type(m) => Some(Value::String(m.expected.clone())),
            Self::Value(m) => Some(m.expected.clone()),
            Self::KeyNotFound(m) => Some(Value::String(m.key.clone())),
            Self::Collection(_) => None,
        }
    }

    pub fn actual(&self) -> Option<Value> {
        match self {
            Self::Type(m) => Some(Value::String(m.actual.clone())),
            Self::Value(m) => Some(m.actual.clone()),
            Self::KeyNotFound(_) | Self::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&MismatchCollection> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Flatten to an ordered list of `(path, message)`.
    ///
    /// Nested collection keys are joined with `.`; a leaf mismatch flattens to
    /// a single entry with an empty path.
    pub fn flatten(&self) -> Vec<(String, String)> {
        match self {
            Self::Collection(c) => c.flatten(),
            leaf => vec![(String::new(), leaf.message())],
        }
    }
}

/// The tested value has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    pub expected: String,
    pub actual: String,
    template: String,
}

impl TypeMismatch {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::with_template(expected, actual, TYPE_MISMATCH_TEMPLATE)
    }

    pub fn with_template(
        expected: impl Into<String>,
        actual: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
            template: template.into(),
        }
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = Value::String(self.expected.clone());
        let actual = Value::String(self.actual.clone());
        f.write_str(&fill(&self.template, &expected, &actual))
    }
}

impl From<TypeMismatch> for Mismatch {
    fn from(m: TypeMismatch) -> Self {
        Self::Type(m)
    }
}

/// The tested value has the right shape but the wrong content.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMismatch {
    pub expected: Value,
    pub actual: Value,
    template: String,
}

impl ValueMismatch {
    pub fn new(template: impl Into<String>, expected: impl Into<Value>, actual: impl Into<Value>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
            template: template.into(),
        }
    }
}

impl fmt::Display for ValueMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&fill(&self.template, &self.expected, &self.actual))
    }
}

impl From<ValueMismatch> for Mismatch {
    fn from(m: ValueMismatch) -> Self {
        Self::Value(m)
    }
}

/// A declared key is absent from the tested mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNotFoundMismatch {
    pub key: String,
}

impl KeyNotFoundMismatch {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Display for KeyNotFoundMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key `{}` was not found", self.key)
    }
}

impl From<KeyNotFoundMismatch> for Mismatch {
    fn from(m: KeyNotFoundMismatch) -> Self {
        Self::KeyNotFound(m)
    }
}

/// Key of a collection entry: a property name or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Ordered, path-keyed aggregation of mismatches. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MismatchCollection {
    message: String,
    entries: Vec<(PathSegment, Mismatch)>,
}

impl MismatchCollection {
    /// Build a collection; `None` when there is nothing to report.
    pub fn new(entries: Vec<(PathSegment, Mismatch)>, message: impl Into<String>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Self {
            message: message.into(),
            entries,
        })
    }

    pub fn single(
        segment: impl Into<PathSegment>,
        mismatch: Mismatch,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            entries: vec![(segment.into(), mismatch)],
        }
    }

    /// Raise the collected entries, if any, with a count-aware message.
    pub fn raise_if_any(
        entries: Vec<(PathSegment, Mismatch)>,
        describe: impl FnOnce(usize) -> String,
    ) -> Result<(), Mismatch> {
        let message = describe(entries.len());
        match Self::new(entries, message) {
            Some(collection) => Err(Mismatch::Collection(collection)),
            None => Ok(()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, segment: impl Into<PathSegment>) -> Option<&Mismatch> {
        let segment = segment.into();
        self.entries
            .iter()
            .find_map(|(key, mismatch)| (*key == segment).then_some(mismatch))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathSegment, &Mismatch)> {
        self.entries.iter().map(|(key, mismatch)| (key, mismatch))
    }

    pub fn into_entries(self) -> Vec<(PathSegment, Mismatch)> {
        self.entries
    }

    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (segment, mismatch) in &self.entries {
            let path = segment.to_string();
            match mismatch {
                Mismatch::Collection(nested) => {
                    out.extend(
                        nested
                            .flatten()
                            .into_iter()
                            .map(|(sub, message)| (format!("{path}.{sub}"), message)),
                    );
                }
                leaf => out.push((path, leaf.message())),
            }
        }
        out
    }
}

impl fmt::Display for MismatchCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<MismatchCollection> for Mismatch {
    fn from(m: MismatchCollection) -> Self {
        Self::Collection(m)
    }
}
