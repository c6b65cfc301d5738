//! # Pactum Kernel
//!
//! Rules, matching and the mismatch algebra for consumer-driven contract
//! tests.
//!
//! A contract is a tree of [`Rule`]s. Each rule asserts something about a
//! value of the primitive tree (`serde_json::Value`) and may carry a sample:
//! a canonical example that satisfies it. Every sample is checked against its
//! own rule when the rule is built, so a constructed rule tree is always
//! self-consistent.
//!
//! ```text
//! Rule::assert_match(value)
//!     │
//!     ├─ Ok(())                         the value satisfies the rule
//!     └─ Err(Mismatch)
//!            ├─ Type / Value / KeyNotFound
//!            └─ Collection { path → Mismatch, ... }
//! ```
//!
//! This crate knows nothing about documents, HTTP or wire aliases; see
//! `pactum-codec` and `pactum-contract` for those layers.

pub mod error;
pub mod mismatch;
pub mod rule;
pub mod value;

pub use error::{RuleError, SampleError};
pub use mismatch::{
    KeyNotFoundMismatch, Mismatch, MismatchCollection, PathSegment, TypeMismatch, ValueMismatch,
};
pub use rule::{
    AndRule, BooleanRule, Comparator, CompareRule, ContainsRule, CountItemsRule, CountRule,
    DateTimeRule, Matcher, ObjectRule, RegexRule, Rule, RuleKind, SequenceRule, StringBeginsRule,
    StringEndsRule, StringEqualsRule, StringLengthRule, StringRule,
};
