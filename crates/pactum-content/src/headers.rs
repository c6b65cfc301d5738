//! Header decoding.

use serde_json::{Map, Value};

pub struct HeaderDecoder;

impl HeaderDecoder {
    /// Decode `(name, value)` pairs into a mapping keyed by `Title-Case`
    /// names. A name seen once maps to its value; a repeated name maps to
    /// the ordered sequence of its values.
    pub fn decode<I, K, V>(pairs: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut headers = Map::new();
        for (name, value) in pairs {
            let name = Self::normalize_name(name.as_ref());
            let value = Value::String(value.as_ref().to_string());
            match headers.get_mut(&name) {
                None => {
                    headers.insert(name, value);
                }
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
        Value::Object(headers)
    }

    /// `x-CUSTOM-header` becomes `X-Custom-Header`.
    pub fn normalize_name(name: &str) -> String {
        name.trim()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join("-")
    }

    /// First value of a header in a decoded mapping, by any spelling of its name.
    pub fn first<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
        match headers.get(Self::normalize_name(name))? {
            Value::String(value) => Some(value.as_str()),
            Value::Array(values) => values.first().and_then(Value::as_str),
            _ => None,
        }
    }
}
