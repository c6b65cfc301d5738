//! String-comparison family.
//!
//! Every rule here requires the tested value to be a string. Case-insensitive
//! variants compare the lowercased forms of both sides.

use super::{Matcher, verify_sample};
use crate::error::{RuleError, SampleError};
use crate::mismatch::{Mismatch, TypeMismatch, ValueMismatch};
use crate::rule::compare::CompareRule;
use crate::value::type_name;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

fn tested_str(tested: &Value) -> Result<&str, Mismatch> {
    tested
        .as_str()
        .ok_or_else(|| TypeMismatch::new("string", type_name(tested)).into())
}

fn fold(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// Any string. The sample is the string the rule was recorded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRule {
    sample: String,
}

impl StringRule {
    pub fn new(sample: impl Into<String>) -> Self {
        Self {
            sample: sample.into(),
        }
    }
}

impl Matcher for StringRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        tested_str(tested).map(|_| ())
    }

    fn has_sample(&self) -> bool {
        true
    }

    fn sample(&self) -> Result<Value, SampleError> {
        Ok(Value::String(self.sample.clone()))
    }
}

/// Exact string equality. The value is its own sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringEqualsRule {
    value: String,
    case_sensitive: bool,
}

impl StringEqualsRule {
    pub fn new(value: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            value: value.into(),
            case_sensitive,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }
}

impl Matcher for StringEqualsRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let actual = tested_str(tested)?;
        if fold(&self.value, self.case_sensitive) == fold(actual, self.case_sensitive) {
            Ok(())
        } else {
            Err(ValueMismatch::new(
                "String {actual} should be equal to {expected}",
                self.value.as_str(),
                actual,
            )
            .into())
        }
    }

    fn has_sample(&self) -> bool {
        true
    }

    fn sample(&self) -> Result<Value, SampleError> {
        Ok(Value::String(self.value.clone()))
    }
}

macro_rules! affix_rule {
    ($(#[$doc:meta])* $name:ident, $label:literal, $template:literal, $test:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            value: String,
            sample: Option<String>,
            case_sensitive: bool,
        }

        impl $name {
            pub fn new(
                value: impl Into<String>,
                sample: Option<String>,
                case_sensitive: bool,
            ) -> Result<Self, RuleError> {
                let rule = Self {
                    value: value.into(),
                    sample,
                    case_sensitive,
                };
                let sample = rule.sample.clone().map(Value::String);
                verify_sample(&rule, sample.as_ref())?;
                Ok(rule)
            }

            pub fn value(&self) -> &str {
                &self.value
            }

            pub fn declared_sample(&self) -> Option<&str> {
                self.sample.as_deref()
            }

            pub fn is_case_sensitive(&self) -> bool {
                self.case_sensitive
            }
        }

        impl Matcher for $name {
            fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
                let actual = tested_str(tested)?;
                let haystack = fold(actual, self.case_sensitive);
                let needle = fold(&self.value, self.case_sensitive);
                if haystack.$test(needle.as_str()) {
                    Ok(())
                } else {
                    Err(ValueMismatch::new($template, self.value.as_str(), actual).into())
                }
            }

            fn has_sample(&self) -> bool {
                self.sample.is_some()
            }

            fn sample(&self) -> Result<Value, SampleError> {
                self.sample
                    .clone()
                    .map(Value::String)
                    .ok_or(SampleError::Missing { rule: $label })
            }
        }
    };
}

affix_rule!(
    /// The tested string starts with the value.
    StringBeginsRule,
    "string_begins",
    "String {actual} should start with {expected}",
    starts_with
);

affix_rule!(
    /// The tested string ends with the value.
    StringEndsRule,
    "string_ends",
    "String {actual} should end with {expected}",
    ends_with
);

/// Unanchored regular-expression search.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: String,
    regex: Regex,
    sample: Option<String>,
    case_sensitive: bool,
}

impl RegexRule {
    pub fn new(
        pattern: impl Into<String>,
        sample: Option<String>,
        case_sensitive: bool,
    ) -> Result<Self, RuleError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(RuleError::EmptyPattern);
        }
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| RuleError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        let rule = Self {
            pattern,
            regex,
            sample,
            case_sensitive,
        };
        let sample = rule.sample.clone().map(Value::String);
        verify_sample(&rule, sample.as_ref())?;
        Ok(rule)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn declared_sample(&self) -> Option<&str> {
        self.sample.as_deref()
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }
}

impl PartialEq for RegexRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.sample == other.sample
            && self.case_sensitive == other.case_sensitive
    }
}

impl Matcher for RegexRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let actual = tested_str(tested)?;
        if self.regex.is_match(actual) {
            Ok(())
        } else {
            Err(ValueMismatch::new(
                "Value {actual} is not matching the regex expression {expected}",
                self.pattern.as_str(),
                actual,
            )
            .into())
        }
    }

    fn has_sample(&self) -> bool {
        self.sample.is_some()
    }

    fn sample(&self) -> Result<Value, SampleError> {
        self.sample
            .clone()
            .map(Value::String)
            .ok_or(SampleError::Missing { rule: "regex" })
    }
}

/// The tested string's byte length satisfies a comparison rule.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLengthRule {
    length: CompareRule,
    sample: Option<String>,
}

impl StringLengthRule {
    pub fn new(length: CompareRule, sample: Option<String>) -> Result<Self, RuleError> {
        let rule = Self { length, sample };
        let sample = rule.sample.clone().map(Value::String);
        verify_sample(&rule, sample.as_ref())?;
        Ok(rule)
    }

    pub fn length(&self) -> &CompareRule {
        &self.length
    }

    pub fn declared_sample(&self) -> Option<&str> {
        self.sample.as_deref()
    }
}

impl Matcher for StringLengthRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let actual = tested_str(tested)?;
        self.length
            .assert_match(&Value::from(actual.len()))
            .map_err(|inner| {
                ValueMismatch::new(
                    "The length of string {actual} should match the rule:\n    {expected}",
                    inner.message(),
                    actual,
                )
                .into()
            })
    }

    fn has_sample(&self) -> bool {
        self.sample.is_some()
    }

    fn sample(&self) -> Result<Value, SampleError> {
        self.sample
            .clone()
            .map(Value::String)
            .ok_or(SampleError::Missing {
                rule: "string_length",
            })
    }
}
