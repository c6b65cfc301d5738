//! Message body decoding.

use crate::error::ContentError;
use serde_json::{Map, Value};

/// How a body is decoded, derived from its content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Json,
    Yaml,
    Form,
    Raw,
}

impl MediaType {
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = normalize_content_type(content_type);
        match essence.as_str() {
            "application/json" | "text/json" => Self::Json,
            "application/yaml" | "application/x-yaml" | "text/yaml" | "text/x-yaml" => Self::Yaml,
            "application/x-www-form-urlencoded" => Self::Form,
            other if other.ends_with("+json") => Self::Json,
            other if other.ends_with("+yaml") => Self::Yaml,
            _ => Self::Raw,
        }
    }
}

/// Lowercase the media type and drop its parameters.
///
/// `Application/JSON; charset=UTF-8` becomes `application/json`.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub struct BodyDecoder;

impl BodyDecoder {
    /// Decode a body. An empty body is `null` whatever its content type.
    pub fn decode(body: &[u8], content_type: Option<&str>) -> Result<Value, ContentError> {
        let media_type = content_type.map_or(MediaType::Raw, MediaType::from_content_type);
        Self::decode_as(body, media_type)
    }

    pub fn decode_as(body: &[u8], media_type: MediaType) -> Result<Value, ContentError> {
        if body.is_empty() {
            return Ok(Value::Null);
        }
        match media_type {
            MediaType::Json if body.trim_ascii().is_empty() => Ok(Value::Null),
            MediaType::Json => Ok(serde_json::from_slice(body)?),
            MediaType::Yaml => Ok(serde_yaml::from_slice(body)?),
            MediaType::Form => Ok(decode_form(body)),
            MediaType::Raw => Ok(Value::String(String::from_utf8_lossy(body).into_owned())),
        }
    }
}

pub struct BodyEncoder;

impl BodyEncoder {
    /// Encode a value as a body of the given content type. `null` encodes
    /// to an empty body.
    pub fn encode(value: &Value, content_type: Option<&str>) -> Result<Vec<u8>, ContentError> {
        let media_type = content_type.map_or(MediaType::Raw, MediaType::from_content_type);
        Self::encode_as(value, media_type)
    }

    pub fn encode_as(value: &Value, media_type: MediaType) -> Result<Vec<u8>, ContentError> {
        if value.is_null() {
            return Ok(Vec::new());
        }
        match media_type {
            MediaType::Json => Ok(serde_json::to_vec(value)?),
            MediaType::Yaml => Ok(serde_yaml::to_string(value)?.into_bytes()),
            MediaType::Form => Ok(encode_form(value).into_bytes()),
            MediaType::Raw => Ok(scalar_text(value).into_bytes()),
        }
    }
}

/// Strings verbatim, anything else as compact JSON.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn flatten_form(prefix: &str, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_form(&format!("{prefix}[{key}]"), child, pairs);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_form(&format!("{prefix}[{index}]"), child, pairs);
            }
        }
        Value::Null => pairs.push((prefix.to_string(), String::new())),
        scalar => pairs.push((prefix.to_string(), scalar_text(scalar))),
    }
}

fn encode_form(value: &Value) -> String {
    let mut pairs = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_form(key, child, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_form(&index.to_string(), child, &mut pairs);
            }
        }
        scalar => return scalar_text(scalar),
    }
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Split `a[b][]` into `("a", ["b", ""])`. Keys with unbalanced brackets are
/// taken literally; anything after the last closing bracket is ignored.
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    let head = &key[..open];
    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            return if segments.is_empty() {
                (key, Vec::new())
            } else {
                (head, segments)
            };
        };
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    (head, segments)
}

fn next_index(map: &Map<String, Value>) -> String {
    map.keys()
        .filter_map(|key| key.parse::<usize>().ok())
        .max()
        .map_or(0, |max| max + 1)
        .to_string()
}

fn insert(slot: &mut Map<String, Value>, key: String, path: &[&str], value: String) {
    let Some((next, tail)) = path.split_first() else {
        slot.insert(key, Value::String(value));
        return;
    };
    let entry = slot
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        let next = if next.is_empty() {
            next_index(child)
        } else {
            (*next).to_string()
        };
        insert(child, next, tail, value);
    }
}

/// Mappings keyed exactly `0..n` become sequences ordered by index.
fn fold_sequences(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    let mut indexed: Vec<(usize, Value)> = Vec::with_capacity(map.len());
    let mut entries: Vec<(String, Value)> = Vec::with_capacity(map.len());
    for (key, child) in map {
        let child = fold_sequences(child);
        if let Some(index) = key.parse::<usize>().ok().filter(|i| i.to_string() == key) {
            indexed.push((index, child.clone()));
        }
        entries.push((key, child));
    }
    indexed.sort_by_key(|(index, _)| *index);
    let is_sequence = !entries.is_empty()
        && indexed.len() == entries.len()
        && indexed.iter().enumerate().all(|(position, (index, _))| position == *index);
    if is_sequence {
        Value::Array(indexed.into_iter().map(|(_, child)| child).collect())
    } else {
        Value::Object(entries.into_iter().collect())
    }
}

fn decode_form(body: &[u8]) -> Value {
    let mut root = Map::new();
    for (key, value) in form_urlencoded::parse(body) {
        let (head, path) = split_key(&key);
        if head.is_empty() {
            continue;
        }
        insert(&mut root, head.to_string(), &path, value.into_owned());
    }
    fold_sequences(Value::Object(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_type_is_normalized() {
        assert_eq!(normalize_content_type("Application/JSON; charset=UTF-8"), "application/json");
        assert_eq!(normalize_content_type("  text/plain "), "text/plain");
        assert_eq!(MediaType::from_content_type("application/problem+json"), MediaType::Json);
        assert_eq!(MediaType::from_content_type("application/vnd.api+yaml"), MediaType::Yaml);
        assert_eq!(MediaType::from_content_type("text/YAML"), MediaType::Yaml);
        assert_eq!(
            MediaType::from_content_type("application/x-www-form-urlencoded"),
            MediaType::Form
        );
        assert_eq!(MediaType::from_content_type("text/html"), MediaType::Raw);
    }

    #[test]
    fn json_with_charset() {
        let body = br#"{"a":1,"0":[2,"3"]}"#;
        let value = BodyDecoder::decode(body, Some("application/json; charset=UTF-8")).expect("json");
        assert_eq!(value, json!({"a": 1, "0": [2, "3"]}));
    }

    #[test]
    fn yaml_body() {
        let value = BodyDecoder::decode(b"name: Ada\ntags: [a, b]\n", Some("application/x-yaml"))
            .expect("yaml");
        assert_eq!(value, json!({"name": "Ada", "tags": ["a", "b"]}));
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(BodyDecoder::decode(b"", Some("application/json")).expect("empty"), Value::Null);
        assert_eq!(BodyDecoder::decode(b" \n", Some("application/json")).expect("blank"), Value::Null);
        assert_eq!(BodyDecoder::decode(b"", None).expect("empty"), Value::Null);
    }

    #[test]
    fn raw_body_is_lossy_text() {
        assert_eq!(BodyDecoder::decode(b"some content", None).expect("raw"), json!("some content"));
        assert_eq!(
            BodyDecoder::decode(b"caf\xe9", Some("text/plain")).expect("raw"),
            json!("caf\u{FFFD}")
        );
    }

    #[test]
    fn malformed_structured_body_is_an_error() {
        assert!(matches!(
            BodyDecoder::decode(b"{", Some("application/json")),
            Err(ContentError::Json(_))
        ));
        assert!(matches!(
            BodyDecoder::decode(b"a: [1", Some("text/yaml")),
            Err(ContentError::Yaml(_))
        ));
    }

    #[test]
    fn form_brackets_fold_into_sequences() {
        let value = BodyDecoder::decode(
            b"a=1&b%5B0%5D=2.1&b%5B1%5D=3",
            Some("application/x-www-form-urlencoded"),
        )
        .expect("form");
        assert_eq!(value, json!({"a": "1", "b": ["2.1", "3"]}));
    }

    #[test]
    fn form_nested_mappings_and_appends() {
        let value = BodyDecoder::decode_as(
            b"user[name]=Ada+L&user[roles][]=admin&user[roles][]=dev&tags[]=x&plain=%26",
            MediaType::Form,
        )
        .expect("form");
        assert_eq!(
            value,
            json!({
                "user": {"name": "Ada L", "roles": ["admin", "dev"]},
                "tags": ["x"],
                "plain": "&",
            })
        );
    }

    #[test]
    fn form_out_of_order_indices_still_fold() {
        let value = BodyDecoder::decode_as(b"a[1]=y&a[0]=x", MediaType::Form).expect("form");
        assert_eq!(value, json!({"a": ["x", "y"]}));
        let sparse = BodyDecoder::decode_as(b"a[0]=x&a[2]=z", MediaType::Form).expect("form");
        assert_eq!(sparse, json!({"a": {"0": "x", "2": "z"}}));
    }

    #[test]
    fn form_odd_keys() {
        assert_eq!(split_key("a[b"), ("a[b", vec![]));
        assert_eq!(split_key("a[b]c"), ("a", vec!["b"]));
        assert_eq!(split_key("a[b][c"), ("a", vec!["b"]));
        let value = BodyDecoder::decode_as(b"=skip&k=1&k=2", MediaType::Form).expect("form");
        assert_eq!(value, json!({"k": "2"}));
    }

    #[test]
    fn encoded_bodies_decode_back() {
        let value = json!({"user": {"name": "Ada L", "roles": ["admin", "dev"]}, "page": "2"});
        for content_type in ["application/json", "text/yaml", "application/x-www-form-urlencoded"] {
            let body = BodyEncoder::encode(&value, Some(content_type)).expect("encodes");
            assert_eq!(BodyDecoder::decode(&body, Some(content_type)).expect("decodes"), value);
        }
    }

    #[test]
    fn raw_encoding_and_null() {
        assert_eq!(BodyEncoder::encode(&json!("plain"), None).expect("raw"), b"plain");
        assert_eq!(BodyEncoder::encode(&json!({"a": 1}), Some("text/plain")).expect("raw"), br#"{"a":1}"#);
        assert!(BodyEncoder::encode(&Value::Null, Some("application/json")).expect("null").is_empty());
        let form = BodyEncoder::encode(&json!({"q": "a&b", "n": 5}), Some("application/x-www-form-urlencoded"))
            .expect("form");
        assert_eq!(form, b"q=a%26b&n=5");
    }
}
