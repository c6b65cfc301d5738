//! Canonical alias -> rule variant registry.
//!
//! This table is the single authority binding wire tags to rule variants.
//! The lookup index is built once on first use and read-only afterwards.

use crate::decode::{self, Attributes, Decoder};
use crate::error::DecodeError;
use pactum_kernel::{Rule, RuleKind};
use std::collections::HashMap;
use std::sync::OnceLock;

pub(crate) type DecodeFn = fn(&Decoder<'_>, Attributes<'_>) -> Result<Rule, DecodeError>;

#[derive(Clone, Copy)]
pub(crate) struct AliasEntry {
    pub alias: &'static str,
    pub kind: RuleKind,
    pub decode: DecodeFn,
}

const fn row(alias: &'static str, kind: RuleKind, decode: DecodeFn) -> AliasEntry {
    AliasEntry {
        alias,
        kind,
        decode,
    }
}

pub(crate) static RULE_ALIASES: &[AliasEntry] = &[
    row("eq", RuleKind::Equals, decode::equals),
    row("greater", RuleKind::Greater, decode::greater),
    row("greater_or_equal", RuleKind::GreaterOrEqual, decode::greater_or_equal),
    row("lower", RuleKind::Lower, decode::lower),
    row("lower_or_equal", RuleKind::LowerOrEqual, decode::lower_or_equal),
    row("boolean", RuleKind::Boolean, decode::boolean),
    row("string", RuleKind::String, decode::string),
    row("string_equals", RuleKind::StringEquals, decode::string_equals),
    row("string_begins", RuleKind::StringBegins, decode::string_begins),
    row("string_ends", RuleKind::StringEnds, decode::string_ends),
    row("regex", RuleKind::Regex, decode::regex),
    row("string_length", RuleKind::StringLength, decode::string_length),
    row("datetime", RuleKind::DateTime, decode::datetime),
    row("object", RuleKind::Object, decode::object),
    row("and", RuleKind::And, decode::and),
    row("contains", RuleKind::Contains, decode::contains),
    row("count", RuleKind::Count, decode::count),
    row("count_items", RuleKind::CountItems, decode::count_items),
    row("list", RuleKind::Sequence, decode::list),
];

fn index() -> &'static HashMap<&'static str, &'static AliasEntry> {
    static INDEX: OnceLock<HashMap<&'static str, &'static AliasEntry>> = OnceLock::new();
    INDEX.get_or_init(|| RULE_ALIASES.iter().map(|entry| (entry.alias, entry)).collect())
}

pub(crate) fn entry(alias: &str) -> Option<&'static AliasEntry> {
    index().get(alias).copied()
}

/// The rule variant bound to a wire alias.
pub fn lookup(alias: &str) -> Option<RuleKind> {
    entry(alias).map(|entry| entry.kind)
}

/// The wire alias of a rule variant.
pub fn alias_for(kind: RuleKind) -> &'static str {
    match kind {
        RuleKind::Equals => "eq",
        RuleKind::Greater => "greater",
        RuleKind::GreaterOrEqual => "greater_or_equal",
        RuleKind::Lower => "lower",
        RuleKind::LowerOrEqual => "lower_or_equal",
        RuleKind::Boolean => "boolean",
        RuleKind::String => "string",
        RuleKind::StringEquals => "string_equals",
        RuleKind::StringBegins => "string_begins",
        RuleKind::StringEnds => "string_ends",
        RuleKind::Regex => "regex",
        RuleKind::StringLength => "string_length",
        RuleKind::DateTime => "datetime",
        RuleKind::Object => "object",
        RuleKind::And => "and",
        RuleKind::Contains => "contains",
        RuleKind::Count => "count",
        RuleKind::CountItems => "count_items",
        RuleKind::Sequence => "list",
    }
}

/// All registered `(alias, kind)` pairs in table order.
pub fn aliases() -> impl Iterator<Item = (&'static str, RuleKind)> {
    RULE_ALIASES.iter().map(|entry| (entry.alias, entry.kind))
}
