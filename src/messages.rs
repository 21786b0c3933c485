//! Centralized soft-error message text.
//!
//! Single source of truth for everything the rule catalog writes into a
//! [`Report`](crate::report::Report). Comparison rules distinguish numeric
//! values ("must be …") from length-measured kinds ("length must be …"),
//! and floats render with two decimals.

use std::fmt;

use crate::record::Kind;

pub const MALFORMED_PARAM: &str = "malformed rule parameter";
pub const CANNOT_BE_EMPTY: &str = "must not be empty or zero";
pub const INVALID_FORMAT: &str = "invalid format";
pub const NOT_NUMERIC: &str = "must contain only numeric characters";

/// Comparison phrase for the `len` rule.
pub const EQUAL_TO: &str = "equal to";

pub fn must_be(phrase: &str, bound: impl fmt::Display) -> String {
    format!("must be {phrase} {bound}")
}

pub fn length_must_be(phrase: &str, bound: impl fmt::Display) -> String {
    format!("length must be {phrase} {bound}")
}

pub fn bad_date(layout: &str) -> String {
    format!("does not match time layout {layout}")
}

pub fn not_one_of(set: &str) -> String {
    format!("must be one of {set}")
}

pub fn not_subset_of(set: &str) -> String {
    format!("must be one or more of {set}")
}

pub fn duplicate_values(values: impl fmt::Debug) -> String {
    format!("contains duplicate values {values:?}")
}

pub fn not_allowed(rule: &str, kind: Kind) -> String {
    format!("rule `{rule}` is not allowed for {kind} values")
}
