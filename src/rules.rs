//! The built-in rule catalog.
//!
//! Every handler shares the registry's uniform signature and records its
//! failures as soft errors in the report; the `Result` is reserved for
//! structural failures bubbling out of nested traversals (`dive`).
//!
//! Dispatch has already applied the zero-value short-circuit before a
//! handler runs (see the `skip_zero` descriptor flag), so handlers other
//! than `required`, `default`, and `dive` only ever see non-zero values.
//! Text lengths are character counts, not byte lengths; sequences and
//! maps measure element count.

use std::collections::HashSet;

use regex::Regex;

use crate::diagnostics::SieveError;
use crate::messages;
use crate::patterns;
use crate::record::{FieldMeta, Value};
use crate::registry::Ctx;
use crate::report::Report;
use crate::syntax::RuleSpec;

// ============================================================================
// REQUIRED
// ============================================================================

pub(crate) fn required(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    _spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    if value.is_zero() {
        report.push(meta.name, meta.label, messages::CANNOT_BE_EMPTY);
    }
    Ok(())
}

// ============================================================================
// COMPARISONS
// ============================================================================

#[derive(Clone, Copy)]
enum Op {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Op::Gt => "greater than",
            Op::Gte => "greater than or equal to",
            Op::Lt => "less than",
            Op::Lte => "less than or equal to",
        }
    }

    fn holds<T: PartialOrd>(self, value: T, bound: T) -> bool {
        match self {
            Op::Gt => value > bound,
            Op::Gte => value >= bound,
            Op::Lt => value < bound,
            Op::Lte => value <= bound,
        }
    }
}

/// Shared core for gt/gte/lt/lte: integers and floats compare the value,
/// text and sequences/maps compare the length.
fn compare(op: Op, meta: &FieldMeta, value: &Value<'_>, param: &str, report: &mut Report) {
    if let Some(v) = value.as_int() {
        match param.parse::<i64>() {
            Ok(bound) if op.holds(v, bound) => {}
            Ok(bound) => report.push(meta.name, meta.label, messages::must_be(op.phrase(), bound)),
            Err(_) => report.push(meta.name, meta.label, messages::MALFORMED_PARAM),
        }
    } else if let Some(v) = value.as_float() {
        match param.parse::<f64>() {
            Ok(bound) if op.holds(v, bound) => {}
            Ok(bound) => report.push(
                meta.name,
                meta.label,
                messages::must_be(op.phrase(), format!("{bound:.2}")),
            ),
            Err(_) => report.push(meta.name, meta.label, messages::MALFORMED_PARAM),
        }
    } else if let Some(s) = value.as_str() {
        let count = s.chars().count() as i64;
        match param.parse::<i64>() {
            Ok(bound) if op.holds(count, bound) => {}
            Ok(bound) => report.push(
                meta.name,
                meta.label,
                messages::length_must_be(op.phrase(), bound),
            ),
            Err(_) => report.push(meta.name, meta.label, messages::MALFORMED_PARAM),
        }
    } else if let Some(len) = value.seq_len() {
        match param.parse::<i64>() {
            Ok(bound) if op.holds(len as i64, bound) => {}
            Ok(bound) => report.push(
                meta.name,
                meta.label,
                messages::length_must_be(op.phrase(), bound),
            ),
            Err(_) => report.push(meta.name, meta.label, messages::MALFORMED_PARAM),
        }
    } else {
        report.push(
            meta.name,
            meta.label,
            messages::not_allowed(op.name(), value.kind()),
        );
    }
}

macro_rules! comparison_rule {
    ($fn_name:ident, $op:expr) => {
        pub(crate) fn $fn_name(
            _ctx: &Ctx<'_>,
            meta: &FieldMeta,
            value: &mut Value<'_>,
            spec: &RuleSpec,
            report: &mut Report,
        ) -> Result<(), SieveError> {
            compare($op, meta, value, &spec.param, report);
            Ok(())
        }
    };
}

comparison_rule!(gt, Op::Gt);
comparison_rule!(gte, Op::Gte);
comparison_rule!(lt, Op::Lt);
comparison_rule!(lte, Op::Lte);

/// `len=n`: exact character count for text, exact element count for
/// sequences and maps.
pub(crate) fn len(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    let measured = if let Some(s) = value.as_str() {
        Some(s.chars().count())
    } else {
        value.seq_len()
    };

    match measured {
        Some(count) => match spec.param.parse::<usize>() {
            Ok(bound) if count == bound => {}
            Ok(bound) => report.push(
                meta.name,
                meta.label,
                messages::length_must_be(messages::EQUAL_TO, bound),
            ),
            Err(_) => report.push(meta.name, meta.label, messages::MALFORMED_PARAM),
        },
        None => report.push(
            meta.name,
            meta.label,
            messages::not_allowed("len", value.kind()),
        ),
    }
    Ok(())
}

// ============================================================================
// SET MEMBERSHIP
// ============================================================================

/// `in=a b c`: the value equals one of the space-separated tokens.
pub(crate) fn one_of(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    let param = spec.param.as_str();
    if let Some(v) = value.as_int() {
        for token in param.split(' ') {
            match token.parse::<i64>() {
                Ok(t) if t == v => return Ok(()),
                Ok(_) => {}
                Err(_) => {
                    report.push(meta.name, meta.label, messages::MALFORMED_PARAM);
                    return Ok(());
                }
            }
        }
        report.push(meta.name, meta.label, messages::not_one_of(param));
    } else if let Some(s) = value.as_str() {
        if !param.split(' ').any(|t| t == s) {
            report.push(meta.name, meta.label, messages::not_one_of(param));
        }
    } else {
        report.push(
            meta.name,
            meta.label,
            messages::not_allowed("in", value.kind()),
        );
    }
    Ok(())
}

/// `sin=a b c`: every element of the sequence is a member of the token
/// set.
pub(crate) fn subset_of(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    let param = spec.param.as_str();
    match value {
        Value::IntSeq(elems) => {
            let mut set = HashSet::new();
            for token in param.split(' ') {
                match token.parse::<i64>() {
                    Ok(t) => {
                        set.insert(t);
                    }
                    Err(_) => {
                        report.push(meta.name, meta.label, messages::MALFORMED_PARAM);
                        return Ok(());
                    }
                }
            }
            if elems.iter().any(|e| !set.contains(e)) {
                report.push(meta.name, meta.label, messages::not_subset_of(param));
            }
        }
        Value::StrSeq(elems) => {
            let set: HashSet<&str> = param.split(' ').collect();
            if elems.iter().any(|e| !set.contains(e.as_str())) {
                report.push(meta.name, meta.label, messages::not_subset_of(param));
            }
        }
        other => report.push(
            meta.name,
            meta.label,
            messages::not_allowed("sin", other.kind()),
        ),
    }
    Ok(())
}

/// `distinct`: no duplicate elements. The message quotes the whole
/// offending sequence.
pub(crate) fn distinct(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    _spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    match value {
        Value::IntSeq(elems) => {
            let mut seen = HashSet::new();
            for e in elems.iter() {
                if !seen.insert(*e) {
                    report.push(meta.name, meta.label, messages::duplicate_values(&**elems));
                    break;
                }
            }
        }
        Value::StrSeq(elems) => {
            let mut seen = HashSet::new();
            for e in elems.iter() {
                if !seen.insert(e.as_str()) {
                    report.push(meta.name, meta.label, messages::duplicate_values(&**elems));
                    break;
                }
            }
        }
        other => report.push(
            meta.name,
            meta.label,
            messages::not_allowed("distinct", other.kind()),
        ),
    }
    Ok(())
}

// ============================================================================
// DATE AND PATTERNS
// ============================================================================

/// `date=<layout>`: the text parses under the chrono layout string in the
/// engine's configured zone. The layout is the rule parameter verbatim.
pub(crate) fn date(
    ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    match value.as_str() {
        Some(s) => {
            if !ctx.engine.zone().parses(&spec.param, s) {
                report.push(meta.name, meta.label, messages::bad_date(&spec.param));
            }
        }
        None => report.push(
            meta.name,
            meta.label,
            messages::not_allowed("date", value.kind()),
        ),
    }
    Ok(())
}

/// `regex`: matches the pattern compiled by the grammar's bracket form,
/// or — for the bare `regex=pat` spelling — a pattern compiled here, with
/// a compile failure reported as a soft format error.
pub(crate) fn regex_match(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    let matched = match value.as_str() {
        Some(s) => match &spec.pattern {
            Some(re) => re.is_match(s),
            None => Regex::new(&spec.param).map(|re| re.is_match(s)).unwrap_or(false),
        },
        None => false,
    };
    if !matched {
        report.push(meta.name, meta.label, messages::INVALID_FORMAT);
    }
    Ok(())
}

macro_rules! pattern_rule {
    ($fn_name:ident, $pattern:expr) => {
        pub(crate) fn $fn_name(
            _ctx: &Ctx<'_>,
            meta: &FieldMeta,
            value: &mut Value<'_>,
            _spec: &RuleSpec,
            report: &mut Report,
        ) -> Result<(), SieveError> {
            match value.as_str() {
                Some(s) if $pattern.is_match(s) => {}
                _ => report.push(meta.name, meta.label, messages::INVALID_FORMAT),
            }
            Ok(())
        }
    };
}

pattern_rule!(email, patterns::EMAIL);
pattern_rule!(mobile, patterns::MOBILE);
pattern_rule!(url, patterns::URL);
pattern_rule!(base64, patterns::BASE64);
pattern_rule!(ip, patterns::IP);

pub(crate) fn id_card(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    _spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    match value.as_str() {
        Some(s) if patterns::id_card(s) => {}
        _ => report.push(meta.name, meta.label, messages::INVALID_FORMAT),
    }
    Ok(())
}

pub(crate) fn numeric(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    _spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    match value.as_str() {
        Some(s) if s.chars().all(|c| c.is_ascii_digit()) => {}
        _ => report.push(meta.name, meta.label, messages::NOT_NUMERIC),
    }
    Ok(())
}

// ============================================================================
// MUTATING RULES
// ============================================================================

/// `default=<literal>`: writes the literal into a zero-valued field of a
/// settable kind (integers and text, owned or optional). Set fields and
/// unsupported kinds are left untouched; only an unparsable integer
/// literal is an error.
pub(crate) fn default_value(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    if !value.is_zero() {
        return Ok(());
    }
    match value {
        Value::Int(i) => match spec.param.parse::<i64>() {
            Ok(v) => **i = v,
            Err(_) => report.push(meta.name, meta.label, messages::MALFORMED_PARAM),
        },
        Value::OptInt(o) => match spec.param.parse::<i64>() {
            Ok(v) => **o = Some(v),
            Err(_) => report.push(meta.name, meta.label, messages::MALFORMED_PARAM),
        },
        Value::Str(s) => **s = spec.param.clone(),
        Value::OptStr(o) => **o = Some(spec.param.clone()),
        _ => {}
    }
    Ok(())
}

/// `trimSpace`: strips leading and trailing whitespace in place.
pub(crate) fn trim_space(
    _ctx: &Ctx<'_>,
    meta: &FieldMeta,
    value: &mut Value<'_>,
    _spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    let kind = value.kind();
    match value.as_str_mut() {
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
        None => report.push(meta.name, meta.label, messages::not_allowed("trimSpace", kind)),
    }
    Ok(())
}

// ============================================================================
// DIVE
// ============================================================================

/// `dive`: recurse validation into a nested record, an optional record
/// slot (allocating a fresh default instance when unset), or a sequence
/// of records, sharing the caller's accumulator. Scalar sequences are a
/// silent no-op.
pub(crate) fn dive(
    ctx: &Ctx<'_>,
    _meta: &FieldMeta,
    value: &mut Value<'_>,
    _spec: &RuleSpec,
    report: &mut Report,
) -> Result<(), SieveError> {
    match value {
        Value::Record(record) => ctx.engine.traverse(&mut **record, report),
        Value::OptRecord(slot) => ctx.engine.traverse(slot.get_or_insert(), report),
        Value::RecordSeq(seq) => seq.visit(&mut |record| ctx.engine.traverse(record, report)),
        _ => Ok(()),
    }
}
