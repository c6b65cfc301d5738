//! Primitive tree -> rule tree.
//!
//! A tagged mapping is routed through the alias registry to a per-variant
//! decode function that consumes its attributes by name. Anything untagged
//! goes through shorthand inference. An untagged mapping keyed exactly
//! `"0"`, `"1"`, ... in order reads as a sequence.

use crate::config::CodecConfig;
use crate::error::DecodeError;
use crate::registry;
use pactum_kernel::value::type_name;
use pactum_kernel::{
    AndRule, BooleanRule, Comparator, CompareRule, ContainsRule, CountItemsRule, CountRule,
    DateTimeRule, MismatchCollection, ObjectRule, PathSegment, RegexRule, Rule, SequenceRule,
    StringBeginsRule, StringEndsRule, StringEqualsRule, StringLengthRule, StringRule,
};
use serde_json::{Map, Value};

const TARGET: &str = "pactum::codec";

/// Decode one rule tree.
pub fn decode_rule(value: &Value, config: &CodecConfig) -> Result<Rule, DecodeError> {
    Decoder::new(config).rule(value)
}

/// Decode a sequence of independent rule trees.
pub fn decode_rules(value: &Value, config: &CodecConfig) -> Result<Vec<Rule>, DecodeError> {
    let Value::Array(items) = value else {
        return Err(DecodeError::UnexpectedShape {
            expected: "an array of rules",
            found: type_name(value),
        });
    };
    Decoder::new(config).descend()?.rules(items)
}

/// Decode a node that must resolve to a comparison rule.
pub fn decode_comparison(value: &Value, config: &CodecConfig) -> Result<CompareRule, DecodeError> {
    Decoder::new(config).comparison(value)
}

/// Keys are exactly `"0".."n-1"` in order, with at least one key.
pub(crate) fn sequential_keys<'k>(keys: impl IntoIterator<Item = &'k str>) -> bool {
    let mut count = 0;
    for (index, key) in keys.into_iter().enumerate() {
        if key != index.to_string() {
            return false;
        }
        count += 1;
    }
    count > 0
}

/// Collect sibling results: configuration errors abort, sample mismatches
/// are gathered into one collection keyed like the siblings.
fn gather<K, T>(
    children: impl IntoIterator<Item = (K, Result<T, DecodeError>)>,
    describe: impl FnOnce(usize) -> String,
) -> Result<Vec<(K, T)>, DecodeError>
where
    K: Into<PathSegment>,
{
    let mut decoded = Vec::new();
    let mut failures = Vec::new();
    for (key, outcome) in children {
        match outcome {
            Ok(item) => decoded.push((key, item)),
            Err(DecodeError::Mismatch(mismatch)) => failures.push((key.into(), mismatch)),
            Err(fatal) => return Err(fatal),
        }
    }
    MismatchCollection::raise_if_any(failures, describe).map_err(DecodeError::Mismatch)?;
    Ok(decoded)
}

pub(crate) struct Decoder<'c> {
    config: &'c CodecConfig,
    depth: usize,
}

impl<'c> Decoder<'c> {
    fn new(config: &'c CodecConfig) -> Self {
        Self { config, depth: 0 }
    }

    fn descend(&self) -> Result<Self, DecodeError> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(DecodeError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(Self {
            config: self.config,
            depth,
        })
    }

    pub(crate) fn rule(&self, value: &Value) -> Result<Rule, DecodeError> {
        let inner = self.descend()?;
        match value {
            Value::Object(map) => match map.get(&self.config.tag_field) {
                Some(tag) => inner.tagged(tag, map),
                None if sequential_keys(map.keys().map(String::as_str)) => inner
                    .rules(map.values())
                    .map(|rules| SequenceRule::new(rules).into()),
                None => inner.properties(map).map(|props| ObjectRule::new(props).into()),
            },
            Value::Array(items) => inner.rules(items).map(|rules| SequenceRule::new(rules).into()),
            Value::Bool(flag) => Ok(BooleanRule::new(*flag).into()),
            Value::String(text) if !text.is_empty() => {
                Ok(StringEqualsRule::new(text.as_str(), true).into())
            }
            other => Ok(Rule::equals(other.clone())),
        }
    }

    pub(crate) fn rules<'v>(
        &self,
        items: impl IntoIterator<Item = &'v Value>,
    ) -> Result<Vec<Rule>, DecodeError> {
        let decoded = gather(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index, self.rule(item))),
            |n| format!("{n} rules are not valid"),
        )?;
        Ok(decoded.into_iter().map(|(_, rule)| rule).collect())
    }

    pub(crate) fn properties(
        &self,
        map: &Map<String, Value>,
    ) -> Result<Vec<(String, Rule)>, DecodeError> {
        gather(
            map.iter().map(|(name, value)| (name.clone(), self.rule(value))),
            |n| format!("{n} properties are not valid"),
        )
    }

    pub(crate) fn comparison(&self, value: &Value) -> Result<CompareRule, DecodeError> {
        match self.rule(value)? {
            Rule::Compare(rule) => Ok(rule),
            other => Err(DecodeError::UnexpectedShape {
                expected: "a comparison rule",
                found: other.kind().label(),
            }),
        }
    }

    fn comparison_attribute(
        &self,
        alias: &'static str,
        attribute: &'static str,
        value: &Value,
    ) -> Result<CompareRule, DecodeError> {
        self.comparison(value).map_err(|err| match err {
            DecodeError::UnexpectedShape { expected, found } => DecodeError::InvalidAttribute {
                alias,
                attribute,
                expected,
                found,
            },
            other => other,
        })
    }

    fn tagged(&self, tag: &Value, map: &Map<String, Value>) -> Result<Rule, DecodeError> {
        let Some(alias) = tag.as_str() else {
            return Err(DecodeError::InvalidTag {
                found: type_name(tag),
            });
        };
        let Some(entry) = registry::entry(alias) else {
            return Err(DecodeError::UnknownAlias {
                alias: alias.to_string(),
            });
        };
        tracing::debug!(
            target: TARGET,
            alias = entry.alias,
            depth = self.depth,
            "decoding tagged rule"
        );
        (entry.decode)(self, Attributes::new(entry.alias, map, &self.config.tag_field))
    }
}

/// The attributes of one tagged node, consumed by name.
pub(crate) struct Attributes<'a> {
    alias: &'static str,
    pending: Vec<(&'a str, &'a Value)>,
}

impl<'a> Attributes<'a> {
    fn new(alias: &'static str, map: &'a Map<String, Value>, tag_field: &str) -> Self {
        Self {
            alias,
            pending: map
                .iter()
                .filter(|(key, _)| key.as_str() != tag_field)
                .map(|(key, value)| (key.as_str(), value))
                .collect(),
        }
    }

    /// Raw attribute, `null` included.
    fn take(&mut self, name: &'static str) -> Option<&'a Value> {
        let index = self.pending.iter().position(|(key, _)| *key == name)?;
        Some(self.pending.remove(index).1)
    }

    /// Optional attribute; `null` counts as absent.
    fn optional(&mut self, name: &'static str) -> Option<&'a Value> {
        self.take(name).filter(|value| !value.is_null())
    }

    fn required(&mut self, name: &'static str) -> Result<&'a Value, DecodeError> {
        self.optional(name).ok_or(DecodeError::MissingAttribute {
            alias: self.alias,
            attribute: name,
        })
    }

    fn invalid(&self, name: &'static str, expected: &'static str, found: &Value) -> DecodeError {
        DecodeError::InvalidAttribute {
            alias: self.alias,
            attribute: name,
            expected,
            found: type_name(found),
        }
    }

    fn string(&mut self, name: &'static str) -> Result<String, DecodeError> {
        let value = self.required(name)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(name, "a string", value))
    }

    fn optional_string(&mut self, name: &'static str) -> Result<Option<String>, DecodeError> {
        match self.optional(name) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(other) => Err(self.invalid(name, "a string", other)),
        }
    }

    fn boolean(&mut self, name: &'static str) -> Result<bool, DecodeError> {
        let value = self.required(name)?;
        value
            .as_bool()
            .ok_or_else(|| self.invalid(name, "a boolean", value))
    }

    fn flag(&mut self, name: &'static str, default: bool) -> Result<bool, DecodeError> {
        match self.optional(name) {
            None => Ok(default),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(other) => Err(self.invalid(name, "a boolean", other)),
        }
    }

    fn mapping(&mut self, name: &'static str) -> Result<&'a Map<String, Value>, DecodeError> {
        let value = self.required(name)?;
        value
            .as_object()
            .ok_or_else(|| self.invalid(name, "a mapping", value))
    }

    fn sequence(&mut self, name: &'static str) -> Result<&'a [Value], DecodeError> {
        let value = self.required(name)?;
        value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.invalid(name, "an array", value))
    }

    /// Reject whatever was not consumed.
    fn finish(self) -> Result<&'static str, DecodeError> {
        if self.pending.is_empty() {
            return Ok(self.alias);
        }
        Err(DecodeError::ExtraAttributes {
            alias: self.alias,
            attributes: self
                .pending
                .into_iter()
                .map(|(key, _)| key.to_string())
                .collect(),
        })
    }
}

// Per-variant decode functions, bound to aliases in `registry`.
// Each takes its raw attributes, rejects leftovers, then decodes children.

pub(crate) fn equals(_: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let value = attrs.take("value");
    let sample = attrs.take("sample");
    let alias = attrs.finish()?;
    let (value, sample) = match (value, sample) {
        (Some(value), sample) => (value.clone(), sample.cloned()),
        (None, Some(sample)) => (sample.clone(), None),
        (None, None) => {
            return Err(DecodeError::MissingAttribute {
                alias,
                attribute: "sample",
            });
        }
    };
    Ok(CompareRule::new(Comparator::Eq, value, sample)?.into())
}

fn ordering(operator: Comparator, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let value = attrs.required("value")?.clone();
    let sample = attrs.optional("sample").cloned();
    attrs.finish()?;
    Ok(CompareRule::new(operator, value, sample)?.into())
}

pub(crate) fn greater(_: &Decoder<'_>, attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    ordering(Comparator::Gt, attrs)
}

pub(crate) fn greater_or_equal(_: &Decoder<'_>, attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    ordering(Comparator::Gte, attrs)
}

pub(crate) fn lower(_: &Decoder<'_>, attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    ordering(Comparator::Lt, attrs)
}

pub(crate) fn lower_or_equal(_: &Decoder<'_>, attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    ordering(Comparator::Lte, attrs)
}

pub(crate) fn boolean(_: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let sample = attrs.boolean("sample")?;
    attrs.finish()?;
    Ok(BooleanRule::new(sample).into())
}

pub(crate) fn string(_: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let sample = attrs.string("sample")?;
    attrs.finish()?;
    Ok(StringRule::new(sample).into())
}

pub(crate) fn string_equals(_: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let value = attrs.string("value")?;
    let case_sensitive = attrs.flag("case_sensitive", true)?;
    attrs.finish()?;
    Ok(StringEqualsRule::new(value, case_sensitive).into())
}

pub(crate) fn string_begins(_: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let value = attrs.string("value")?;
    let sample = attrs.optional_string("sample")?;
    let case_sensitive = attrs.flag("case_sensitive", false)?;
    attrs.finish()?;
    Ok(StringBeginsRule::new(value, sample, case_sensitive)?.into())
}

pub(crate) fn string_ends(_: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let value = attrs.string("value")?;
    let sample = attrs.optional_string("sample")?;
    let case_sensitive = attrs.flag("case_sensitive", false)?;
    attrs.finish()?;
    Ok(StringEndsRule::new(value, sample, case_sensitive)?.into())
}

pub(crate) fn regex(_: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let pattern = attrs.string("pattern")?;
    let sample = attrs.optional_string("sample")?;
    let case_sensitive = attrs.flag("case_sensitive", false)?;
    attrs.finish()?;
    Ok(RegexRule::new(pattern, sample, case_sensitive)?.into())
}

pub(crate) fn string_length(decoder: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let length = attrs.required("length")?;
    let sample = attrs.optional_string("sample")?;
    let alias = attrs.finish()?;
    let length = decoder.comparison_attribute(alias, "length", length)?;
    Ok(StringLengthRule::new(length, sample)?.into())
}

pub(crate) fn datetime(_: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let format = attrs.string("format")?;
    let sample = attrs.optional_string("sample")?;
    attrs.finish()?;
    Ok(DateTimeRule::new(format, sample)?.into())
}

pub(crate) fn object(decoder: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let properties = attrs.mapping("properties")?;
    let sample = attrs.optional("sample").cloned();
    attrs.finish()?;
    let properties = decoder.properties(properties)?;
    match sample {
        Some(sample) => Ok(ObjectRule::with_sample(properties, sample)?.into()),
        None => Ok(ObjectRule::new(properties).into()),
    }
}

pub(crate) fn and(decoder: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let rules = attrs.sequence("rules")?;
    let sample = attrs.optional("sample").cloned();
    attrs.finish()?;
    let rules = decoder.rules(rules)?;
    Ok(AndRule::new(rules, sample)?.into())
}

pub(crate) fn contains(decoder: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let rule = attrs.required("rule")?;
    let sample = attrs.required("sample")?.clone();
    attrs.finish()?;
    Ok(ContainsRule::new(decoder.rule(rule)?, sample)?.into())
}

pub(crate) fn count(decoder: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let rule = attrs.required("rule")?;
    let sample = attrs.optional("sample").cloned();
    attrs.finish()?;
    Ok(CountRule::new(decoder.rule(rule)?, sample)?.into())
}

pub(crate) fn count_items(decoder: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let rule = attrs.required("rule")?;
    let sample = attrs.optional("sample").cloned();
    let alias = attrs.finish()?;
    let rule = decoder.comparison_attribute(alias, "rule", rule)?;
    Ok(CountItemsRule::new(rule, sample)?.into())
}

pub(crate) fn list(decoder: &Decoder<'_>, mut attrs: Attributes<'_>) -> Result<Rule, DecodeError> {
    let rules = attrs.sequence("rules")?;
    attrs.finish()?;
    Ok(SequenceRule::new(decoder.rules(rules)?).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pactum_kernel::{Matcher, Mismatch, RuleError, RuleKind};
    use serde_json::json;

    fn decode(value: Value) -> Result<Rule, DecodeError> {
        decode_rule(&value, &CodecConfig::default())
    }

    #[test]
    fn sequentially_keyed_mapping_is_a_sequence() {
        let rule = decode(json!({"0": "a", "1": "b"})).expect("sequence");
        assert_eq!(
            rule,
            Rule::from(SequenceRule::new(vec![
                StringEqualsRule::new("a", true).into(),
                StringEqualsRule::new("b", true).into(),
            ]))
        );
        assert!(rule.assert_match(&json!(["a", "b"])).is_ok());

        for keyed in [json!({"1": "a", "0": "b"}), json!({"0": "a", "2": "b"}), json!({"00": "a"})] {
            assert_eq!(decode(keyed).map(|rule| rule.kind()), Ok(RuleKind::Object));
        }
        assert_eq!(decode(json!({})), Ok(ObjectRule::new(Vec::<(String, Rule)>::new()).into()));
    }

    #[test]
    fn shorthand_inference() {
        assert_eq!(decode(json!(true)), Ok(BooleanRule::new(true).into()));
        assert_eq!(decode(json!("GET")), Ok(StringEqualsRule::new("GET", true).into()));
        assert_eq!(decode(json!(12.5)), Ok(Rule::equals(12.5)));
        assert_eq!(decode(json!("")), Ok(Rule::equals("")));
        assert_eq!(decode(json!(null)), Ok(Rule::equals(Value::Null)));

        let object = decode(json!({"a": 1, "b": "x"})).expect("bare mapping");
        assert_eq!(object.kind(), RuleKind::Object);
        let sequence = decode(json!([1, "x"])).expect("bare array");
        assert_eq!(sequence.kind(), RuleKind::Sequence);
        assert!(sequence.assert_match(&json!([1, "x"])).is_ok());
    }

    #[test]
    fn tagged_object_with_equals_property() {
        let rule = decode(json!({"_rule": "object", "properties": {"a": {"_rule": "eq", "sample": 1}}}))
            .expect("valid document");
        let object = rule.as_object().expect("object rule");
        assert_eq!(object.len(), 1);
        let property = object.property("a").expect("property a");
        assert_eq!(property, &Rule::equals(1));
        assert!(property.assert_match(&json!(1)).is_ok());
        assert!(property.assert_match(&json!(2)).is_err());
    }

    #[test]
    fn equals_accepts_value_or_sample() {
        assert_eq!(decode(json!({"_rule": "eq", "value": [1]})), Ok(Rule::equals(json!([1]))));
        assert_eq!(decode(json!({"_rule": "eq", "sample": null})), Ok(Rule::equals(Value::Null)));
        assert_eq!(
            decode(json!({"_rule": "eq"})),
            Err(DecodeError::MissingAttribute { alias: "eq", attribute: "sample" })
        );
    }

    #[test]
    fn unknown_alias_and_bad_tags_are_fatal() {
        assert_eq!(
            decode(json!({"_rule": "nope"})),
            Err(DecodeError::UnknownAlias { alias: "nope".into() })
        );
        assert_eq!(decode(json!({"_rule": 3})), Err(DecodeError::InvalidTag { found: "number" }));
    }

    #[test]
    fn extra_attributes_are_rejected() {
        let err = decode(json!({"_rule": "boolean", "sample": true, "colour": "red", "size": 1}))
            .expect_err("strict attributes");
        assert_eq!(
            err,
            DecodeError::ExtraAttributes {
                alias: "boolean",
                attributes: vec!["colour".into(), "size".into()],
            }
        );
    }

    #[test]
    fn attribute_types_are_checked() {
        assert_eq!(
            decode(json!({"_rule": "regex", "pattern": 5})),
            Err(DecodeError::InvalidAttribute {
                alias: "regex",
                attribute: "pattern",
                expected: "a string",
                found: "number",
            })
        );
        assert!(matches!(
            decode(json!({"_rule": "count_items", "rule": "many"})),
            Err(DecodeError::InvalidAttribute { alias: "count_items", attribute: "rule", .. })
        ));
    }

    #[test]
    fn rule_configuration_errors_propagate() {
        assert_eq!(
            decode(json!({"_rule": "regex", "pattern": ""})),
            Err(DecodeError::Rule(RuleError::EmptyPattern))
        );
        assert!(matches!(
            decode(json!({"_rule": "lower", "value": true})),
            Err(DecodeError::Rule(RuleError::UnsupportedOperand { .. }))
        ));
    }

    #[test]
    fn sibling_sample_failures_are_collected() {
        let err = decode(json!({
            "a": {"_rule": "lower", "value": 5, "sample": 9},
            "b": 1,
            "c": {"_rule": "string_begins", "value": "x", "sample": "yx"},
        }))
        .expect_err("two bad samples");
        let Some(Mismatch::Collection(collection)) = err.as_mismatch() else {
            panic!("expected a collection, got {err:?}");
        };
        assert_eq!(collection.len(), 2);
        assert!(collection.get("a").is_some());
        assert!(collection.get("c").is_some());
    }

    #[test]
    fn configuration_errors_win_over_sample_failures() {
        let err = decode(json!([
            {"_rule": "lower", "value": 5, "sample": 9},
            {"_rule": "missing"},
        ]))
        .expect_err("unknown alias");
        assert!(err.is_configuration_error());
    }

    #[test]
    fn depth_is_bounded() {
        let config = CodecConfig::default().with_max_depth(3);
        assert!(decode_rule(&json!({"a": {"b": 1}}), &config).is_ok());
        assert_eq!(
            decode_rule(&json!({"a": {"b": {"c": 1}}}), &config),
            Err(DecodeError::DepthExceeded { limit: 3 })
        );
    }

    #[test]
    fn custom_tag_field() {
        let config = CodecConfig::default().with_tag_field("@rule");
        let rule = decode_rule(&json!({"@rule": "greater", "value": 1}), &config).expect("tagged");
        assert_eq!(rule.kind(), RuleKind::Greater);
        let bare = decode_rule(&json!({"_rule": "greater"}), &config).expect("plain mapping");
        assert_eq!(bare.kind(), RuleKind::Object);
    }

    #[test]
    fn comparison_capability() {
        let config = CodecConfig::default();
        assert_eq!(decode_comparison(&json!(3), &config), Ok(CompareRule::equals(3)));
        assert_eq!(
            decode_comparison(&json!(true), &config),
            Err(DecodeError::UnexpectedShape {
                expected: "a comparison rule",
                found: "BooleanRule",
            })
        );
        assert!(matches!(
            decode_rules(&json!({}), &config),
            Err(DecodeError::UnexpectedShape { found: "object", .. })
        ));
    }
}
