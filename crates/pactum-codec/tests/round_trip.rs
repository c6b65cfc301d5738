//! Property-based tests for the codec round-trip law.
//!
//! - Rule trees built without collapsible samples survive encode -> decode.
//! - Plain, untagged data decodes to a rule that matches that same data and
//!   encodes back to it unchanged.

use pactum_codec::{CodecConfig, ContractFormat, decode_rule, encode, parse_rule, render_rule};
use pactum_kernel::{
    AndRule, BooleanRule, CompareRule, Matcher, ObjectRule, RegexRule, Rule, SequenceRule,
    StringBeginsRule, StringEqualsRule,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn property_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

/// Object rule keys, including ones that read as a tag or a sequence when bare.
fn rule_property_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => property_name(),
        2 => "[0-2]",
        1 => Just("_rule".to_string()),
    ]
}

fn leaf_rule() -> impl Strategy<Value = Rule> {
    prop_oneof![
        any::<bool>().prop_map(|flag| Rule::from(BooleanRule::new(flag))),
        any::<i32>().prop_map(Rule::equals),
        "[a-zA-Z0-9 ]{1,12}".prop_map(|text| Rule::from(StringEqualsRule::new(text, true))),
        "[a-z]{1,6}".prop_map(|text| Rule::from(StringEqualsRule::new(text, false))),
        (any::<i32>(), any::<bool>()).prop_filter_map("valid operand", |(bound, greater)| {
            let rule = if greater {
                CompareRule::greater(bound)
            } else {
                CompareRule::lower_or_equal(bound)
            };
            rule.ok().map(Rule::from)
        }),
        ("[a-z]{1,4}", any::<bool>()).prop_filter_map("valid affix", |(value, sensitive)| {
            StringBeginsRule::new(value, None, sensitive).ok().map(Rule::from)
        }),
        prop::sample::select(vec!["^a", "[0-9]+", "x|y", "^$"]).prop_filter_map(
            "valid pattern",
            |pattern| RegexRule::new(pattern, None, false).ok().map(Rule::from)
        ),
    ]
}

fn rule_tree() -> impl Strategy<Value = Rule> {
    leaf_rule().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::btree_map(rule_property_name(), inner.clone(), 0..5)
                .prop_map(|properties| Rule::from(ObjectRule::new(properties))),
            prop::collection::vec(inner.clone(), 0..5)
                .prop_map(|rules| Rule::from(SequenceRule::new(rules))),
            prop::collection::vec(inner, 1..4).prop_filter_map("non-empty", |rules| {
                AndRule::new(rules, None).ok().map(Rule::from)
            }),
        ]
    })
}

fn plain_data() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map(property_name(), inner, 0..5)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn encoded_rule_trees_decode_to_themselves(rule in rule_tree()) {
        let config = CodecConfig::default();
        let decoded = decode_rule(&encode(&rule, &config), &config);
        prop_assert_eq!(decoded, Ok(rule));
    }

    #[test]
    fn yaml_text_round_trips(rule in rule_tree()) {
        let config = CodecConfig::default();
        let text = render_rule(&rule, ContractFormat::Yaml, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let parsed = parse_rule(&text, ContractFormat::Yaml, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(parsed, rule);
    }

    #[test]
    fn plain_data_is_its_own_contract(data in plain_data()) {
        let config = CodecConfig::default();
        let rule = decode_rule(&data, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(rule.assert_match(&data).is_ok());
        prop_assert_eq!(rule.sample().ok(), Some(data.clone()));
        prop_assert_eq!(encode(&rule, &config), data);
    }
}
