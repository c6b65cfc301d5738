//! Integration tests: matching behaviour of composed rule trees.

use pactum_kernel::{
    AndRule, BooleanRule, CompareRule, ContainsRule, CountItemsRule, Matcher, Mismatch, ObjectRule,
    Rule, RuleError, StringEqualsRule, StringLengthRule,
};
use serde_json::{Value, json};

fn report(mismatch: &Mismatch) -> String {
    mismatch
        .flatten()
        .into_iter()
        .map(|(path, message)| format!("{path}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn greater(value: i64) -> Rule {
    CompareRule::greater(value).expect("numeric operand").into()
}

#[test]
fn object_ignores_undeclared_keys() {
    let rule = ObjectRule::new([("a", Rule::equals(1))]);
    assert!(rule.assert_match(&json!({"a": 1, "b": 2})).is_ok());

    let err = rule.assert_match(&json!({"b": 2})).expect_err("a is missing");
    let collection = err.as_collection().expect("collection");
    assert_eq!(collection.len(), 1);
    assert!(matches!(collection.get("a"), Some(Mismatch::KeyNotFound(k)) if k.key == "a"));
}

#[test]
fn and_evaluates_every_child() {
    let rule = AndRule::new(vec![Rule::equals(1), greater(0)], None).expect("no sample");
    let err = rule.assert_match(&json!(-1)).expect_err("both children fail");
    assert_eq!(err.as_collection().map(|c| c.len()), Some(2));
}

#[test]
fn contains_needs_one_matching_element() {
    let rule = ContainsRule::new(Rule::equals(3), json!([1, 2, 3])).expect("sample contains 3");
    assert!(rule.assert_match(&json!([4, 5])).is_err());
    assert!(rule.assert_match(&json!([1, 2, 3])).is_ok());
}

#[test]
fn count_items_counts_sequences_only() {
    let rule = CountItemsRule::new(CompareRule::greater(2).expect("numeric operand"), None)
        .expect("no sample");
    assert!(rule.assert_match(&json!([1, 2, 3])).is_ok());
    assert!(matches!(rule.assert_match(&json!("str")), Err(Mismatch::Type(_))));
}

#[test]
fn ordering_follows_operand_shape() {
    let lower_90 = CompareRule::lower("90").expect("string operand");
    assert!(lower_90.assert_match(&json!("0")).is_ok());
    assert!(lower_90.assert_match(&json!(89.5)).is_ok());
    assert!(lower_90.assert_match(&json!("100")).is_err());

    let lower_zzz = CompareRule::lower("zzz").expect("string operand");
    assert!(lower_zzz.assert_match(&json!("a")).is_ok());
    assert!(lower_zzz.assert_match(&json!("zzzz")).is_err());
}

#[test]
fn declared_samples_satisfy_their_rules() {
    let rules: Vec<Rule> = vec![
        CompareRule::new(pactum_kernel::Comparator::Gte, 10, Some(json!(10)))
            .expect("10 >= 10")
            .into(),
        BooleanRule::new(false).into(),
        StringEqualsRule::new("GET", false).into(),
        StringLengthRule::new(CompareRule::equals(2), Some("ok".into()))
            .expect("two bytes")
            .into(),
        ObjectRule::with_sample([("id", greater(0))], json!({"id": 7}))
            .expect("7 > 0")
            .into(),
    ];
    for rule in rules {
        let sample: Value = rule.sample().expect("declared sample");
        assert!(rule.assert_match(&sample).is_ok(), "{:?}", rule.kind());
    }
}

#[test]
fn inconsistent_sample_is_a_configuration_error() {
    let err = AndRule::new(vec![greater(10)], Some(json!(3))).expect_err("3 is not > 10");
    let RuleError::InvalidSample(mismatch) = err else {
        panic!("expected a self-consistency failure");
    };
    assert!(matches!(mismatch, Mismatch::Collection(_)));
}

#[test]
fn nested_failures_flatten_to_dotted_paths() {
    let rule = ObjectRule::new([
        ("id", greater(0)),
        ("name", StringEqualsRule::new("Ada", true).into()),
        (
            "tags",
            ContainsRule::new(Rule::equals("x"), json!(["x"]))
                .expect("sample contains x")
                .into(),
        ),
        ("meta", ObjectRule::new([("version", Rule::equals(2))]).into()),
    ]);
    let err = rule
        .assert_match(&json!({"id": 0, "name": "ada", "tags": ["y"], "meta": {}}))
        .expect_err("every property fails");

    insta::assert_snapshot!(report(&err), @r#"
    id: Value 0 should be greater than 0
    name: String "ada" should be equal to "Ada"
    tags: At least one item of array ["y"] should match the rule "x"
    meta.version: Key `version` was not found
    "#);
}

#[test]
fn rule_trees_match_from_many_threads() {
    let rule = std::sync::Arc::new(Rule::from(ObjectRule::new([("n", greater(0))])));
    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let rule = std::sync::Arc::clone(&rule);
            std::thread::spawn(move || rule.assert_match(&json!({"n": n})).is_ok())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().expect("thread completes"));
    }
}
