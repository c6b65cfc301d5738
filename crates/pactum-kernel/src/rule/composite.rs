//! Combinator rules: rules built from child rules.
//!
//! Children are constructed before their parents, so every rule tree is
//! finite and acyclic by construction.

use super::{Matcher, Rule, verify_sample};
use crate::error::{RuleError, SampleError};
use crate::mismatch::{
    KeyNotFoundMismatch, Mismatch, MismatchCollection, PathSegment, TypeMismatch, ValueMismatch,
};
use crate::rule::compare::CompareRule;
use crate::value::type_name;
use serde_json::{Map, Value};

fn tested_array(tested: &Value) -> Result<&Vec<Value>, Mismatch> {
    tested
        .as_array()
        .ok_or_else(|| TypeMismatch::new("array", type_name(tested)).into())
}

/// Declared properties must be present and match; undeclared keys are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRule {
    properties: Vec<(String, Rule)>,
    sample: Option<Value>,
}

impl ObjectRule {
    /// Build from `(name, rule)` pairs; a repeated name replaces the earlier rule.
    pub fn new<K: Into<String>>(properties: impl IntoIterator<Item = (K, Rule)>) -> Self {
        let mut ordered: Vec<(String, Rule)> = Vec::new();
        for (name, rule) in properties {
            let name = name.into();
            match ordered.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = rule,
                None => ordered.push((name, rule)),
            }
        }
        Self {
            properties: ordered,
            sample: None,
        }
    }

    pub fn with_sample<K: Into<String>>(
        properties: impl IntoIterator<Item = (K, Rule)>,
        sample: Value,
    ) -> Result<Self, RuleError> {
        let mut rule = Self::new(properties);
        rule.sample = Some(sample);
        verify_sample(&rule, rule.sample.as_ref())?;
        Ok(rule)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.properties.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn property(&self, name: &str) -> Option<&Rule> {
        self.properties
            .iter()
            .find_map(|(key, rule)| (key == name).then_some(rule))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn declared_sample(&self) -> Option<&Value> {
        self.sample.as_ref()
    }
}

impl Matcher for ObjectRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let Some(object) = tested.as_object() else {
            return Err(TypeMismatch::new("object", type_name(tested)).into());
        };
        let mut failures: Vec<(PathSegment, Mismatch)> = Vec::new();
        for (name, rule) in &self.properties {
            let outcome = match object.get(name) {
                Some(value) => rule.assert_match(value),
                None => Err(KeyNotFoundMismatch::new(name.as_str()).into()),
            };
            if let Err(mismatch) = outcome {
                failures.push((PathSegment::Key(name.clone()), mismatch));
            }
        }
        MismatchCollection::raise_if_any(failures, |n| {
            format!("{n} properties not matching the value")
        })
    }

    fn has_sample(&self) -> bool {
        self.sample.is_some() || self.properties.iter().all(|(_, rule)| rule.has_sample())
    }

    fn sample(&self) -> Result<Value, SampleError> {
        if let Some(sample) = &self.sample {
            return Ok(sample.clone());
        }
        let mut object = Map::new();
        for (name, rule) in &self.properties {
            object.insert(name.clone(), rule.sample()?);
        }
        Ok(Value::Object(object))
    }
}

/// Every child must hold. All children are evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct AndRule {
    rules: Vec<Rule>,
    sample: Option<Value>,
}

impl AndRule {
    pub fn new(rules: Vec<Rule>, sample: Option<Value>) -> Result<Self, RuleError> {
        if rules.is_empty() {
            return Err(RuleError::NoChildren { rule: "and" });
        }
        let rule = Self { rules, sample };
        verify_sample(&rule, rule.sample.as_ref())?;
        Ok(rule)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn declared_sample(&self) -> Option<&Value> {
        self.sample.as_ref()
    }
}

impl Matcher for AndRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let failures: Vec<(PathSegment, Mismatch)> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                rule.assert_match(tested)
                    .err()
                    .map(|mismatch| (PathSegment::Index(index), mismatch))
            })
            .collect();
        MismatchCollection::raise_if_any(failures, |n| format!("{n} rules not matching the value"))
    }

    fn has_sample(&self) -> bool {
        self.sample.is_some()
    }

    fn sample(&self) -> Result<Value, SampleError> {
        self.sample.clone().ok_or(SampleError::Missing { rule: "and" })
    }
}

/// At least one element of the tested sequence satisfies the child.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainsRule {
    rule: Box<Rule>,
    sample: Value,
}

impl ContainsRule {
    pub fn new(rule: Rule, sample: Value) -> Result<Self, RuleError> {
        let rule = Self {
            rule: Box::new(rule),
            sample,
        };
        verify_sample(&rule, Some(&rule.sample))?;
        Ok(rule)
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }
}

impl Matcher for ContainsRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let items = tested_array(tested)?;
        if items.iter().any(|item| self.rule.assert_match(item).is_ok()) {
            return Ok(());
        }
        let expected = self
            .rule
            .sample()
            .unwrap_or_else(|_| Value::String(self.rule.kind().label().to_string()));
        Err(ValueMismatch::new(
            "At least one item of array {actual} should match the rule {expected}",
            expected,
            tested.clone(),
        )
        .into())
    }

    fn has_sample(&self) -> bool {
        true
    }

    fn sample(&self) -> Result<Value, SampleError> {
        Ok(self.sample.clone())
    }
}

const COUNT_TEMPLATE: &str = "The items count in array {actual} should match the rule:\n    {expected}";

fn assert_count(rule: &impl Matcher, tested: &Value) -> Result<(), Mismatch> {
    let count = tested_array(tested)?.len();
    rule.assert_match(&Value::from(count))
        .map_err(|inner| ValueMismatch::new(COUNT_TEMPLATE, inner.message(), count).into())
}

/// The element count of the tested sequence satisfies any child rule.
#[derive(Debug, Clone, PartialEq)]
pub struct CountRule {
    rule: Box<Rule>,
    sample: Option<Value>,
}

impl CountRule {
    pub fn new(rule: Rule, sample: Option<Value>) -> Result<Self, RuleError> {
        let rule = Self {
            rule: Box::new(rule),
            sample,
        };
        verify_sample(&rule, rule.sample.as_ref())?;
        Ok(rule)
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn declared_sample(&self) -> Option<&Value> {
        self.sample.as_ref()
    }
}

impl Matcher for CountRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        assert_count(self.rule.as_ref(), tested)
    }

    fn has_sample(&self) -> bool {
        self.sample.is_some()
    }

    fn sample(&self) -> Result<Value, SampleError> {
        self.sample.clone().ok_or(SampleError::Missing { rule: "count" })
    }
}

/// The element count of the tested sequence satisfies a comparison rule.
#[derive(Debug, Clone, PartialEq)]
pub struct CountItemsRule {
    rule: CompareRule,
    sample: Option<Value>,
}

impl CountItemsRule {
    pub fn new(rule: CompareRule, sample: Option<Value>) -> Result<Self, RuleError> {
        let rule = Self { rule, sample };
        verify_sample(&rule, rule.sample.as_ref())?;
        Ok(rule)
    }

    pub fn rule(&self) -> &CompareRule {
        &self.rule
    }

    pub fn declared_sample(&self) -> Option<&Value> {
        self.sample.as_ref()
    }
}

impl Matcher for CountItemsRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        assert_count(&self.rule, tested)
    }

    fn has_sample(&self) -> bool {
        self.sample.is_some()
    }

    fn sample(&self) -> Result<Value, SampleError> {
        self.sample
            .clone()
            .ok_or(SampleError::Missing { rule: "count_items" })
    }
}

/// Positional rules: element `i` of the tested sequence satisfies rule `i`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceRule {
    rules: Vec<Rule>,
}

impl SequenceRule {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Matcher for SequenceRule {
    fn assert_match(&self, tested: &Value) -> Result<(), Mismatch> {
        let items = tested_array(tested)?;
        let mut failures: Vec<(PathSegment, Mismatch)> = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            let outcome = match items.get(index) {
                Some(item) => rule.assert_match(item),
                None => Err(KeyNotFoundMismatch::new(index.to_string()).into()),
            };
            if let Err(mismatch) = outcome {
                failures.push((PathSegment::Index(index), mismatch));
            }
        }
        MismatchCollection::raise_if_any(failures, |n| format!("{n} items not matching the value"))
    }

    fn has_sample(&self) -> bool {
        self.rules.iter().all(Rule::has_sample)
    }

    fn sample(&self) -> Result<Value, SampleError> {
        self.rules
            .iter()
            .map(Rule::sample)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}
