//! Datetime strings checked against a `strftime` format.

use super::{Matcher, verify_sample};
use crate::error::{RuleError, SampleError};
use crate::mismatch::{Mismatch, TypeMismatch, ValueMismatch};
use crate::value::type_name;
use chrono::format::{Item, ParseErrorKind, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

/// Holds if the tested string parses under a `strftime` format.
///
/// A format may describe a zoned datetime, a naive datetime, a date or a
/// time; the first interpretation that parses wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeRule {
    format: String,
    sample: Option<String>,
}

impl DateTimeRule {
    pub fn new(format: impl Into<String>, sample: Option<String>) -> Result<Self, RuleError> {
        let format = format.into();
        if format.is_empty() {
            return Err(RuleError::EmptyFormat);
        }
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(RuleError::InvalidFormat { format });
        }
        let rule = Self { format, sample };
        let sample = rule.sample.clone().map(Value::String);
        verify_sample(&rule, sample.as_ref())?;
        Ok(rule)
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn declared_sample(&self) -> Option<&str> {
        self.sample.as_deref()
    }

    fn parses(&self, text: &str) -> bool {
        let attempts = [
            DateTime::parse_from_str(text, &self.format).map(drop),
            NaiveDateTime::parse_from_str(text, &self.format).map(drop),
            NaiveDate::parse_from_str(text, &self.format).map(drop),
            NaiveTime::parse_from_str(text, &self.format).map(drop),
        ];
        if attempts.iter().any(Result::is_ok) {
            return true;
        }
        // Partial formats such as `%Y-%m` read every field but resolve to no
        // complete value.
        attempts
            .iter()
            .all(|attempt| matches!(attempt, Err(err) if err.kind() == ParseErrorKind::NotEnough))
    }
}

impl Matcher for DateTimeRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let Some(text) = tested.as_str() else {
            return Err(TypeMismatch::new("string", type_name(tested)).into());
        };
        if self.parses(text) {
            Ok(())
        } else {
            Err(ValueMismatch::new(
                "Cannot convert value {actual} into a valid DateTime using {expected} format",
                self.format.as_str(),
                text,
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
            .ok_or(SampleError::Missing { rule: "datetime" })
    }
}
