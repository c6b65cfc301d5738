//! Pact documents.
//!
//! ```text
//! version: "2.0"
//! description: login
//! request:  { method, path, headers?, body? }
//! response: { status_code, headers?, body? }
//! ```
//!
//! Every rule position holds an encoded rule tree. Unknown keys are rejected.

use crate::error::PactError;
use crate::pact::{PACT_VERSION, Pact};
use crate::request::PactRequest;
use crate::response::PactResponse;
use pactum_codec::{CodecConfig, ContractFormat, decode_rule, encode, parse_document, render_document};
use pactum_kernel::{ObjectRule, Rule};
use serde_json::{Map, Value};

const ROOT_KEYS: &[&str] = &["version", "description", "request", "response"];
const REQUEST_KEYS: &[&str] = &["method", "path", "headers", "body"];
const RESPONSE_KEYS: &[&str] = &["status_code", "headers", "body"];

/// Encode a pact into its document tree. Empty headers and absent bodies
/// are left out.
pub fn encode_pact(pact: &Pact, config: &CodecConfig) -> Value {
    let mut request = Map::new();
    request.insert("method".into(), encode(pact.request().method(), config));
    request.insert("path".into(), encode(pact.request().path(), config));
    encode_payload(&mut request, pact.request().headers(), pact.request().body(), config);

    let mut response = Map::new();
    response.insert("status_code".into(), encode(pact.response().status_code(), config));
    encode_payload(&mut response, pact.response().headers(), pact.response().body(), config);

    let mut document = Map::new();
    document.insert("version".into(), Value::String(pact.version().to_string()));
    document.insert("description".into(), Value::String(pact.description().to_string()));
    document.insert("request".into(), Value::Object(request));
    document.insert("response".into(), Value::Object(response));
    Value::Object(document)
}

fn encode_payload(
    section: &mut Map<String, Value>,
    headers: &ObjectRule,
    body: Option<&Rule>,
    config: &CodecConfig,
) {
    if !headers.is_empty() {
        section.insert("headers".into(), encode(&Rule::from(headers.clone()), config));
    }
    if let Some(body) = body {
        section.insert("body".into(), encode(body, config));
    }
}

/// Decode a document tree into a pact. A missing `version` means
/// [`PACT_VERSION`]; a missing `description` is empty.
pub fn decode_pact(document: &Value, config: &CodecConfig) -> Result<Pact, PactError> {
    let root = Section::open("", document, ROOT_KEYS)?;
    let version = root.text("version")?.unwrap_or_else(|| PACT_VERSION.to_string());
    let description = root.text("description")?.unwrap_or_default();

    let section = root.section("request", REQUEST_KEYS)?;
    let mut request = PactRequest::new(
        section.required_rule("method", config)?,
        section.required_rule("path", config)?,
    )
    .with_headers(section.headers(config)?);
    if let Some(body) = section.rule("body", config)? {
        request = request.with_body(body);
    }

    let section = root.section("response", RESPONSE_KEYS)?;
    let mut response = PactResponse::new(section.required_rule("status_code", config)?)
        .with_headers(section.headers(config)?);
    if let Some(body) = section.rule("body", config)? {
        response = response.with_body(body);
    }

    Pact::new(request, response, description, version)
}

/// Parse and decode pact text in the given format.
pub fn load_pact(text: &str, format: ContractFormat, config: &CodecConfig) -> Result<Pact, PactError> {
    decode_pact(&parse_document(text, format)?, config)
}

pub fn render_pact(pact: &Pact, format: ContractFormat, config: &CodecConfig) -> Result<String, PactError> {
    Ok(render_document(&encode_pact(pact, config), format)?)
}

/// A mapping inside a pact document, with its dotted location.
struct Section<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Section<'a> {
    fn open(path: &str, value: &'a Value, allowed: &[&str]) -> Result<Self, PactError> {
        let Some(map) = value.as_object() else {
            return Err(malformed(path, "expected a mapping"));
        };
        let section = Self {
            path: path.to_string(),
            map,
        };
        if let Some(key) = map.keys().find(|key| !allowed.contains(&key.as_str())) {
            return Err(malformed(&section.at(key), "unexpected key"));
        }
        Ok(section)
    }

    fn at(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn section(&self, key: &str, allowed: &[&str]) -> Result<Section<'a>, PactError> {
        match self.map.get(key) {
            Some(value) => Section::open(&self.at(key), value, allowed),
            None => Err(malformed(&self.at(key), "missing key")),
        }
    }

    /// Strings as they are, numbers as written (`version: 2.0` in YAML).
    fn text(&self, key: &str) -> Result<Option<String>, PactError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(Value::Number(number)) => Ok(Some(number.to_string())),
            Some(_) => Err(malformed(&self.at(key), "expected a string")),
        }
    }

    fn rule(&self, key: &str, config: &CodecConfig) -> Result<Option<Rule>, PactError> {
        let Some(value) = self.map.get(key) else {
            return Ok(None);
        };
        decode_rule(value, config)
            .map(Some)
            .map_err(|source| PactError::Decode {
                path: self.at(key),
                source,
            })
    }

    fn required_rule(&self, key: &str, config: &CodecConfig) -> Result<Rule, PactError> {
        self.rule(key, config)?
            .ok_or_else(|| malformed(&self.at(key), "missing key"))
    }

    fn headers(&self, config: &CodecConfig) -> Result<ObjectRule, PactError> {
        match self.rule("headers", config)? {
            None => Ok(ObjectRule::new(Vec::<(String, Rule)>::new())),
            Some(Rule::Object(headers)) => Ok(headers),
            Some(_) => Err(malformed(&self.at("headers"), "expected a mapping of header rules")),
        }
    }
}

fn malformed(path: &str, reason: &str) -> PactError {
    PactError::Malformed {
        path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> CodecConfig {
        CodecConfig::default()
    }

    #[test]
    fn minimal_document_decodes() {
        let pact = decode_pact(
            &json!({
                "request": {"method": "GET", "path": "/ping"},
                "response": {"status_code": 200},
            }),
            &config(),
        )
        .expect("minimal pact");
        assert_eq!(pact.version(), PACT_VERSION);
        assert_eq!(pact.description(), "");
        assert!(pact.request().headers().is_empty());
        assert_eq!(pact.response().body(), None);
    }

    #[test]
    fn encoding_leaves_out_empty_parts() {
        let document = json!({
            "version": "2.0",
            "description": "ping",
            "request": {"method": "GET", "path": "/ping"},
            "response": {"status_code": 204},
        });
        let pact = decode_pact(&document, &config()).expect("valid");
        assert_eq!(encode_pact(&pact, &config()), document);
    }

    #[test]
    fn unknown_and_missing_keys_are_malformed() {
        let extra = json!({
            "request": {"method": "GET", "path": "/", "query": "a=1"},
            "response": {"status_code": 200},
        });
        assert_eq!(
            decode_pact(&extra, &config()).expect_err("query is unknown").to_string(),
            "malformed pact document at `request.query`: unexpected key"
        );

        let missing = json!({"request": {"method": "GET"}, "response": {"status_code": 200}});
        assert_eq!(
            decode_pact(&missing, &config()).expect_err("no path").to_string(),
            "malformed pact document at `request.path`: missing key"
        );

        assert!(matches!(
            decode_pact(&json!([]), &config()),
            Err(PactError::Malformed { path, .. }) if path == "<root>"
        ));
    }

    #[test]
    fn rule_errors_carry_their_location() {
        let document = json!({
            "request": {"method": "GET", "path": {"_rule": "nope"}},
            "response": {"status_code": 200},
        });
        let error = decode_pact(&document, &config()).expect_err("unknown alias");
        assert_eq!(error.to_string(), "cannot decode `request.path`: unknown rule alias `nope`");
    }

    #[test]
    fn headers_must_be_a_mapping() {
        let document = json!({
            "request": {"method": "GET", "path": "/", "headers": ["Accept"]},
            "response": {"status_code": 200},
        });
        assert!(matches!(
            decode_pact(&document, &config()),
            Err(PactError::Malformed { path, .. }) if path == "request.headers"
        ));
    }

    #[test]
    fn numeric_version_is_read_as_text() {
        let pact = load_pact(
            "version: 1.5\nrequest: {method: GET, path: /}\nresponse: {status_code: 200}\n",
            ContractFormat::Yaml,
            &config(),
        )
        .expect("yaml pact");
        assert_eq!(pact.version(), "1.5");
    }
}
