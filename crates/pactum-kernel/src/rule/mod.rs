//! The closed set of rule variants.
//!
//! `Rule` is a tagged enum; `assert_match`, `has_sample` and `sample`
//! dispatch exhaustively over it. Rule trees are immutable once built and
//! are `Send + Sync`, so one tree can be matched from many threads.

mod composite;
mod compare;
mod datetime;
mod string;

pub use compare::{BooleanRule, Comparator, CompareRule};
pub use composite::{AndRule, ContainsRule, CountItemsRule, CountRule, ObjectRule, SequenceRule};
pub use datetime::DateTimeRule;
pub use string::{
    RegexRule, StringBeginsRule, StringEndsRule, StringEqualsRule, StringLengthRule, StringRule,
};

use crate::error::{RuleError, SampleError};
use crate::mismatch::Mismatch;
use serde_json::Value;

/// The assertion capability shared by every rule.
pub trait Matcher {
    /// Succeed silently, or describe the discrepancy.
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch>;

    /// Whether `sample` can succeed.
    fn has_sample(&self) -> bool;

    /// The canonical example value this rule was built from.
    fn sample(&self) -> Result<Value, SampleError>;
}

/// Run the construction-time self-consistency check.
pub(crate) fn verify_sample(rule: &impl Matcher, sample: Option<&Value>) -> Result<(), RuleError> {
    match sample {
        Some(sample) => rule.assert_match(sample).map_err(RuleError::InvalidSample),
        None => Ok(()),
    }
}

/// Identity of a concrete rule variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Equals,
    Greater,
    GreaterOrEqual,
    Lower,
    LowerOrEqual,
    Boolean,
    String,
    StringEquals,
    StringBegins,
    StringEnds,
    Regex,
    StringLength,
    DateTime,
    Object,
    And,
    Contains,
    Count,
    CountItems,
    Sequence,
}

impl RuleKind {
    pub const ALL: [RuleKind; 19] = [
        Self::Equals,
        Self::Greater,
        Self::GreaterOrEqual,
        Self::Lower,
        Self::LowerOrEqual,
        Self::Boolean,
        Self::String,
        Self::StringEquals,
        Self::StringBegins,
        Self::StringEnds,
        Self::Regex,
        Self::StringLength,
        Self::DateTime,
        Self::Object,
        Self::And,
        Self::Contains,
        Self::Count,
        Self::CountItems,
        Self::Sequence,
    ];

    /// Human-readable variant name used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Equals => "EqualsRule",
            Self::Greater => "GreaterRule",
            Self::GreaterOrEqual => "GreaterOrEqualRule",
            Self::Lower => "LowerRule",
            Self::LowerOrEqual => "LowerOrEqualRule",
            Self::Boolean => "BooleanRule",
            Self::String => "StringRule",
            Self::StringEquals => "StringEqualsRule",
            Self::StringBegins => "StringBeginsRule",
            Self::StringEnds => "StringEndsRule",
            Self::Regex => "RegexRule",
            Self::StringLength => "StringLengthRule",
            Self::DateTime => "DateTimeRule",
            Self::Object => "ObjectRule",
            Self::And => "AndRule",
            Self::Contains => "ContainsRule",
            Self::Count => "CountRule",
            Self::CountItems => "CountItemsRule",
            Self::Sequence => "SequenceRule",
        }
    }

    pub fn comparator(self) -> Option<Comparator> {
        match self {
            Self::Equals => Some(Comparator::Eq),
            Self::Greater => Some(Comparator::Gt),
            Self::GreaterOrEqual => Some(Comparator::Gte),
            Self::Lower => Some(Comparator::Lt),
            Self::LowerOrEqual => Some(Comparator::Lte),
            _ => None,
        }
    }
}

impl From<Comparator> for RuleKind {
    fn from(operator: Comparator) -> Self {
        match operator {
            Comparator::Eq => Self::Equals,
            Comparator::Gt => Self::Greater,
            Comparator::Gte => Self::GreaterOrEqual,
            Comparator::Lt => Self::Lower,
            Comparator::Lte => Self::LowerOrEqual,
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A composable assertion over a value, optionally carrying a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Compare(CompareRule),
    Boolean(BooleanRule),
    String(StringRule),
    StringEquals(StringEqualsRule),
    StringBegins(StringBeginsRule),
    StringEnds(StringEndsRule),
    Regex(RegexRule),
    StringLength(StringLengthRule),
    DateTime(DateTimeRule),
    Object(ObjectRule),
    And(AndRule),
    Contains(ContainsRule),
    Count(CountRule),
    CountItems(CountItemsRule),
    Sequence(SequenceRule),
}

impl Rule {
    /// Shorthand for the equals rule.
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Compare(CompareRule::equals(value))
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Compare(rule) => rule.operator().into(),
            Self::Boolean(_) => RuleKind::Boolean,
            Self::String(_) => RuleKind::String,
            Self::StringEquals(_) => RuleKind::StringEquals,
            Self::StringBegins(_) => RuleKind::StringBegins,
            Self::StringEnds(_) => RuleKind::StringEnds,
            Self::Regex(_) => RuleKind::Regex,
            Self::StringLength(_) => RuleKind::StringLength,
            Self::DateTime(_) => RuleKind::DateTime,
            Self::Object(_) => RuleKind::Object,
            Self::And(_) => RuleKind::And,
            Self::Contains(_) => RuleKind::Contains,
            Self::Count(_) => RuleKind::Count,
            Self::CountItems(_) => RuleKind::CountItems,
            Self::Sequence(_) => RuleKind::Sequence,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRule> {
        match self {
            Self::Object(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_compare(&self) -> Option<&CompareRule> {
        match self {
            Self::Compare(rule) => Some(rule),
            _ => None,
        }
    }

    fn matcher(&self) -> &dyn Matcher {
        match self {
            Self::Compare(rule) => rule,
            Self::Boolean(rule) => rule,
            Self::String(rule) => rule,
            Self::StringEquals(rule) => rule,
            Self::StringBegins(rule) => rule,
            Self::StringEnds(rule) => rule,
            Self::Regex(rule) => rule,
            Self::StringLength(rule) => rule,
            Self::DateTime(rule) => rule,
            Self::Object(rule) => rule,
            Self::And(rule) => rule,
            Self::Contains(rule) => rule,
            Self::Count(rule) => rule,
            Self::CountItems(rule) => rule,
            Self::Sequence(rule) => rule,
        }
    }
}

impl Matcher for Rule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        self.matcher().assert_match(tested)
    }

    fn has_sample(&self) -> bool {
        self.matcher().has_sample()
    }

    fn sample(&self) -> Result<Value, SampleError> {
        self.matcher().sample()
    }
}

macro_rules! rule_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Rule {
                fn from(rule: $ty) -> Self {
                    Self::$variant(rule)
                }
            }
        )*
    };
}

rule_from!(
    Compare(CompareRule),
    Boolean(BooleanRule),
    String(StringRule),
    StringEquals(StringEqualsRule),
    StringBegins(StringBeginsRule),
    StringEnds(StringEndsRule),
    Regex(RegexRule),
    StringLength(StringLengthRule),
    DateTime(DateTimeRule),
    Object(ObjectRule),
    And(AndRule),
    Contains(ContainsRule),
    Count(CountRule),
    CountItems(CountItemsRule),
    Sequence(SequenceRule),
);
