//! Rule tree -> primitive tree.
//!
//! Most variants encode to a tagged mapping. A few collapse to shorthand:
//!
//! - boolean and equals rules become their bare sample, unless that sample
//!   holds a mapping that would read back as something else;
//! - a case-sensitive string-equals rule becomes its bare string;
//! - an object rule without an explicit sample becomes the bare mapping of
//!   its encoded properties, unless its keys would read back as a tag or as
//!   a sequence;
//! - a sequence rule becomes the bare array of its encoded children.
//!
//! Where a variant has a `value`, a `sample` equal to it is omitted. Absent
//! and `null` attributes are never written.

use crate::config::CodecConfig;
use crate::decode::sequential_keys;
use crate::registry::alias_for;
use pactum_kernel::{Comparator, CompareRule, Matcher, ObjectRule, Rule, RuleKind};
use serde_json::{Map, Value};

/// Encode a rule tree into its wire form.
pub fn encode(rule: &Rule, config: &CodecConfig) -> Value {
    Encoder { config }.rule(rule)
}

struct Encoder<'c> {
    config: &'c CodecConfig,
}

fn unless_equal(sample: Option<&str>, value: &str) -> Option<Value> {
    sample
        .filter(|sample| *sample != value)
        .map(|sample| Value::String(sample.to_string()))
}

/// Whether plain data written bare decodes to an equals-shaped tree again.
fn reads_back_bare(value: &Value, tag_field: &str) -> bool {
    match value {
        Value::Object(map) => {
            !map.contains_key(tag_field)
                && !sequential_keys(map.keys().map(String::as_str))
                && map.values().all(|child| reads_back_bare(child, tag_field))
        }
        Value::Array(items) => items.iter().all(|child| reads_back_bare(child, tag_field)),
        _ => true,
    }
}

fn text(value: Option<&str>) -> Option<Value> {
    value.map(|value| Value::String(value.to_string()))
}

impl Encoder<'_> {
    fn rule(&self, rule: &Rule) -> Value {
        match rule {
            Rule::Compare(compare) => self.compare(compare),
            Rule::Boolean(boolean) => Value::Bool(boolean.value()),
            Rule::String(string) => self.tagged(rule.kind(), [("sample", string.sample().ok())]),
            Rule::StringEquals(equals) if equals.is_case_sensitive() => {
                Value::String(equals.value().to_string())
            }
            Rule::StringEquals(equals) => self.tagged(
                rule.kind(),
                [
                    ("value", text(Some(equals.value()))),
                    ("case_sensitive", Some(Value::Bool(false))),
                ],
            ),
            Rule::StringBegins(affix) => self.tagged(
                rule.kind(),
                [
                    ("value", text(Some(affix.value()))),
                    ("sample", unless_equal(affix.declared_sample(), affix.value())),
                    ("case_sensitive", Some(Value::Bool(affix.is_case_sensitive()))),
                ],
            ),
            Rule::StringEnds(affix) => self.tagged(
                rule.kind(),
                [
                    ("value", text(Some(affix.value()))),
                    ("sample", unless_equal(affix.declared_sample(), affix.value())),
                    ("case_sensitive", Some(Value::Bool(affix.is_case_sensitive()))),
                ],
            ),
            Rule::Regex(regex) => self.tagged(
                rule.kind(),
                [
                    ("pattern", text(Some(regex.pattern()))),
                    ("sample", text(regex.declared_sample())),
                    ("case_sensitive", Some(Value::Bool(regex.is_case_sensitive()))),
                ],
            ),
            Rule::StringLength(length) => self.tagged(
                rule.kind(),
                [
                    ("length", Some(self.compare(length.length()))),
                    ("sample", text(length.declared_sample())),
                ],
            ),
            Rule::DateTime(datetime) => self.tagged(
                rule.kind(),
                [
                    ("format", text(Some(datetime.format()))),
                    ("sample", text(datetime.declared_sample())),
                ],
            ),
            Rule::Object(object) => self.object(object),
            Rule::And(and) => self.tagged(
                rule.kind(),
                [
                    ("rules", Some(self.sequence(and.rules()))),
                    ("sample", and.declared_sample().cloned()),
                ],
            ),
            Rule::Contains(contains) => self.tagged(
                rule.kind(),
                [
                    ("rule", Some(self.rule(contains.rule()))),
                    ("sample", contains.sample().ok()),
                ],
            ),
            Rule::Count(count) => self.tagged(
                rule.kind(),
                [
                    ("rule", Some(self.rule(count.rule()))),
                    ("sample", count.declared_sample().cloned()),
                ],
            ),
            Rule::CountItems(count) => self.tagged(
                rule.kind(),
                [
                    ("rule", Some(self.compare(count.rule()))),
                    ("sample", count.declared_sample().cloned()),
                ],
            ),
            Rule::Sequence(sequence) => self.sequence(sequence.rules()),
        }
    }

    fn compare(&self, rule: &CompareRule) -> Value {
        let sample_or_value = rule.declared_sample().unwrap_or(rule.value());
        if rule.operator() == Comparator::Eq
            && reads_back_bare(sample_or_value, &self.config.tag_field)
        {
            return sample_or_value.clone();
        }
        let sample = rule
            .declared_sample()
            .filter(|sample| *sample != rule.value())
            .cloned();
        self.tagged(
            RuleKind::from(rule.operator()),
            [("value", Some(rule.value().clone())), ("sample", sample)],
        )
    }

    fn object(&self, rule: &ObjectRule) -> Value {
        let properties: Map<String, Value> = rule
            .properties()
            .map(|(name, child)| (name.to_string(), self.rule(child)))
            .collect();
        // Such keys would read back as a tag or as a sequence.
        let ambiguous = properties.contains_key(&self.config.tag_field)
            || sequential_keys(properties.keys().map(String::as_str));
        match rule.declared_sample() {
            None if !ambiguous => Value::Object(properties),
            sample => self.tagged(
                RuleKind::Object,
                [
                    ("properties", Some(Value::Object(properties))),
                    ("sample", sample.cloned()),
                ],
            ),
        }
    }

    fn sequence(&self, rules: &[Rule]) -> Value {
        Value::Array(rules.iter().map(|rule| self.rule(rule)).collect())
    }

    fn tagged<const N: usize>(
        &self,
        kind: RuleKind,
        attributes: [(&'static str, Option<Value>); N],
    ) -> Value {
        let mut map = Map::new();
        map.insert(
            self.config.tag_field.clone(),
            Value::String(alias_for(kind).to_string()),
        );
        for (name, value) in attributes {
            if let Some(value) = value.filter(|value| !value.is_null()) {
                map.insert(name.to_string(), value);
            }
        }
        Value::Object(map)
    }
}
