//! # Pactum Codec
//!
//! Bidirectional mapping between rule trees and the primitive tree
//! (`serde_json::Value`), plus the JSON/YAML text layer.
//!
//! A node on the wire is either a tagged mapping
//! `{"_rule": <alias>, <attribute>: ...}` resolved through the alias
//! [`registry`], or a shorthand form:
//!
//! | shorthand | decodes to |
//! |---|---|
//! | `true` / `false` | boolean rule |
//! | non-empty string | case-sensitive string-equals rule |
//! | number, `null`, `""` | equals rule |
//! | untagged mapping | object rule over decoded properties |
//! | array | positional sequence rule |
//!
//! `decode(encode(rule))` reproduces `rule` up to the shorthand collapses
//! documented on [`encode`].

pub mod config;
mod decode;
mod encode;
pub mod error;
pub mod format;
pub mod registry;

pub use config::{CodecConfig, ConfigError};
pub use decode::{decode_comparison, decode_rule, decode_rules};
pub use encode::encode;
pub use error::DecodeError;
pub use format::{CodecError, ContractFormat, parse_document, parse_rule, render_document, render_rule};
