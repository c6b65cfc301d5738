//! Comparison family and exact booleans.

use super::{Matcher, verify_sample};
use crate::error::{RuleError, SampleError};
use crate::mismatch::{Mismatch, TypeMismatch, ValueMismatch};
use crate::value::{compare, loose_eq, type_name};
use serde_json::Value;
use std::cmp::Ordering;

/// Operator of a comparison rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparator {
    fn template(self) -> &'static str {
        match self {
            Self::Eq => "Value {actual} should be equal to {expected}",
            Self::Gt => "Value {actual} should be greater than {expected}",
            Self::Gte => "Value {actual} should be greater than or equal to {expected}",
            Self::Lt => "Value {actual} should be lower than {expected}",
            Self::Lte => "Value {actual} should be lower than or equal to {expected}",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Eq => "equals",
            Self::Gt => "greater",
            Self::Gte => "greater_or_equal",
            Self::Lt => "lower",
            Self::Lte => "lower_or_equal",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
        }
    }
}

fn is_orderable(value: &Value) -> bool {
    matches!(value, Value::Number(_) | Value::String(_))
}

/// `tested <operator> value`.
///
/// `Eq` is the equals rule: it accepts any operand, its operand is its
/// sample, and it compares structurally. The ordering operators accept only
/// numbers and strings, and order numerically when both sides look numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareRule {
    operator: Comparator,
    value: Value,
    sample: Option<Value>,
}

impl CompareRule {
    pub fn new(
        operator: Comparator,
        value: impl Into<Value>,
        sample: Option<Value>,
    ) -> Result<Self, RuleError> {
        let value = value.into();
        if operator != Comparator::Eq && !is_orderable(&value) {
            return Err(RuleError::UnsupportedOperand {
                rule: operator.label(),
                found: type_name(&value),
            });
        }
        let rule = Self {
            operator,
            value,
            sample,
        };
        verify_sample(&rule, rule.sample.as_ref())?;
        Ok(rule)
    }

    pub fn equals(value: impl Into<Value>) -> Self {
        Self {
            operator: Comparator::Eq,
            value: value.into(),
            sample: None,
        }
    }

    pub fn greater(value: impl Into<Value>) -> Result<Self, RuleError> {
        Self::new(Comparator::Gt, value, None)
    }

    pub fn greater_or_equal(value: impl Into<Value>) -> Result<Self, RuleError> {
        Self::new(Comparator::Gte, value, None)
    }

    pub fn lower(value: impl Into<Value>) -> Result<Self, RuleError> {
        Self::new(Comparator::Lt, value, None)
    }

    pub fn lower_or_equal(value: impl Into<Value>) -> Result<Self, RuleError> {
        Self::new(Comparator::Lte, value, None)
    }

    pub fn operator(&self) -> Comparator {
        self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The explicitly declared sample, if any.
    pub fn declared_sample(&self) -> Option<&Value> {
        self.sample.as_ref()
    }
}

impl Matcher for CompareRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let holds = match self.operator {
            Comparator::Eq => loose_eq(&self.value, tested),
            operator => {
                if !is_orderable(tested) {
                    return Err(TypeMismatch::new("number|string", type_name(tested)).into());
                }
                operator.holds(compare(tested, &self.value))
            }
        };
        if holds {
            Ok(())
        } else {
            Err(ValueMismatch::new(self.operator.template(), self.value.clone(), tested.clone()).into())
        }
    }

    fn has_sample(&self) -> bool {
        self.operator == Comparator::Eq || self.sample.is_some()
    }

    fn sample(&self) -> Result<Value, SampleError> {
        match (&self.sample, self.operator) {
            (Some(sample), _) => Ok(sample.clone()),
            (None, Comparator::Eq) => Ok(self.value.clone()),
            (None, operator) => Err(SampleError::Missing {
                rule: operator.label(),
            }),
        }
    }
}

/// Holds for exactly one boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanRule {
    sample: bool,
}

impl BooleanRule {
    pub fn new(sample: bool) -> Self {
        Self { sample }
    }

    pub fn value(&self) -> bool {
        self.sample
    }
}

impl Matcher for BooleanRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let Value::Bool(actual) = tested else {
            return Err(TypeMismatch::new("boolean", type_name(tested)).into());
        };
        if *actual == self.sample {
            Ok(())
        } else {
            Err(ValueMismatch::new("Boolean {actual} should be {expected}", self.sample, *actual).into())
        }
    }

    fn has_sample(&self) -> bool {
        true
    }

    fn sample(&self) -> Result<Value, SampleError> {
        Ok(Value::Bool(self.sample))
    }
}
