//! Integration tests: decode contract fixtures and run their match vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - document: the wire form of a rule tree
//! - kind: the expected root rule variant
//! - sample: the expected root sample, or null when the root has none
//! - accept: values the decoded rule must match
//! - reject: values it must not match, with the flattened failure paths

use pactum_codec::{CodecConfig, ContractFormat, decode_rule, encode, parse_document};
use pactum_kernel::{Matcher, Rule, RuleKind};
use serde_json::Value;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(name: &str) -> Value {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    let format = ContractFormat::from_path(&path)
        .unwrap_or_else(|| panic!("unknown fixture format: {}", path.display()));
    parse_document(&text, format)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn run_fixture(name: &str) -> Rule {
    let fixture = load_fixture(name);
    let config = CodecConfig::default();

    let rule = decode_rule(&fixture["document"], &config)
        .unwrap_or_else(|e| panic!("fixture {name} failed to decode: {e}"));

    let kind: RuleKind = serde_json::from_value(fixture["kind"].clone())
        .unwrap_or_else(|e| panic!("fixture {name} has an invalid kind: {e}"));
    assert_eq!(rule.kind(), kind, "fixture {name}: root kind");

    match &fixture["sample"] {
        Value::Null => {}
        expected => assert_eq!(rule.sample().ok().as_ref(), Some(expected), "fixture {name}: sample"),
    }

    for value in fixture["accept"].as_array().expect("accept list") {
        if let Err(mismatch) = rule.assert_match(value) {
            panic!("fixture {name}: {value} should match, got {:?}", mismatch.flatten());
        }
    }

    for case in fixture["reject"].as_array().expect("reject list") {
        let value = &case["value"];
        let Err(mismatch) = rule.assert_match(value) else {
            panic!("fixture {name}: {value} should not match");
        };
        let paths: Vec<String> = mismatch.flatten().into_iter().map(|(path, _)| path).collect();
        let expected: Vec<String> = serde_json::from_value(case["paths"].clone()).expect("paths");
        assert_eq!(paths, expected, "fixture {name}: failure paths for {value}");
    }

    // Re-decoding the encoded tree yields the same tree.
    let reencoded = encode(&rule, &config);
    let redecoded = decode_rule(&reencoded, &config).expect("encoded form decodes");
    assert_eq!(redecoded, rule, "fixture {name}: re-decoded tree");

    rule
}

#[test]
fn tagged_object_with_equals_property() {
    let rule = run_fixture("object_eq.json");
    let property = rule
        .as_object()
        .and_then(|object| object.property("a"))
        .expect("property a");
    assert_eq!(property, &Rule::equals(1));
}

#[test]
fn login_request_body() {
    run_fixture("login_request_body.json");
}

#[test]
fn order_response_yaml() {
    run_fixture("order_response.yaml");
}
