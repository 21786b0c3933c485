//! Rule annotation grammar.
//!
//! Purely syntactic: one annotation string in, an ordered list of
//! [`RuleSpec`] out, or a spanned structural error. No registry lookups
//! happen here.
//!
//! The grammar is two-level. Rules are comma-separated `name` or
//! `name=param` segments, with `param` taken verbatim to the end of the
//! segment. One special case runs first: a `regex=(/pattern/)` group is
//! located by scanning for the literal `regex=(/` marker and the *last*
//! `/)` in the string, compiled, consumed wholesale as a single spec, and
//! spliced out before the comma split — so the pattern may contain commas
//! and the group may sit anywhere among the other rules. An opening
//! marker with no closing `/)` at or after it aborts parsing.
//!
//! The empty annotation and the skip marker `-` produce no rules at all.

use regex::Regex;

use crate::diagnostics::SieveError;

pub const SKIP_MARKER: &str = "-";
pub const RULE_SEP: char = ',';
pub const PARAM_SEP: char = '=';
pub const REGEX_OPEN: &str = "regex=(/";
pub const REGEX_CLOSE: &str = "/)";

/// One parsed rule instance: canonical (upper-first) name, raw parameter,
/// and — for the bracketed regex form — the pattern compiled at parse
/// time.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pub name: String,
    pub param: String,
    pub pattern: Option<Regex>,
}

/// Parse one field's annotation into its ordered rule list.
pub fn parse_rules(annotation: &str) -> Result<Vec<RuleSpec>, SieveError> {
    let tag = annotation.trim();
    if tag.is_empty() || tag == SKIP_MARKER {
        return Ok(Vec::new());
    }

    let mut specs = Vec::new();
    let rest = extract_regex(tag, &mut specs)?;

    for segment in rest.split(RULE_SEP) {
        if segment.is_empty() {
            continue;
        }
        let segment = segment.trim();
        let (name, param) = match segment.split_once(PARAM_SEP) {
            Some((name, param)) => (name, param),
            None => (segment, ""),
        };
        specs.push(RuleSpec {
            name: to_upper_first(name),
            param: param.to_string(),
            pattern: None,
        });
    }

    Ok(specs)
}

/// Pull the `regex=(/.../)` group out of `tag`, if present. The compiled
/// spec is pushed first (regex rules run ahead of the rest) and the
/// matched span removed from the returned remainder.
fn extract_regex(tag: &str, specs: &mut Vec<RuleSpec>) -> Result<String, SieveError> {
    let open = match tag.find(REGEX_OPEN) {
        None => return Ok(tag.to_string()),
        Some(open) => open,
    };
    let body = open + REGEX_OPEN.len();

    let close = match tag.rfind(REGEX_CLOSE) {
        Some(close) if close >= body => close,
        _ => {
            return Err(SieveError::UnterminatedRegex {
                annotation: tag.to_string(),
                open: (open..body).into(),
            })
        }
    };

    let pattern = &tag[body..close];
    let compiled = Regex::new(pattern).map_err(|cause| SieveError::BadPattern {
        cause,
        annotation: tag.to_string(),
        span: (body..close).into(),
    })?;

    specs.push(RuleSpec {
        name: "Regex".to_string(),
        param: pattern.to_string(),
        pattern: Some(compiled),
    });

    let mut rest = tag[..open].trim().to_string();
    rest.push_str(tag[close + REGEX_CLOSE.len()..].trim());
    Ok(rest)
}

/// Canonical registry form: ASCII first letter upper-cased.
pub(crate) fn to_upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {
            let mut out = String::with_capacity(name.len());
            out.push(c.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        _ => name.to_string(),
    }
}

/// Diagnostic form: ASCII first letter lower-cased, the way rule names
/// are written in annotations.
pub(crate) fn to_lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {
            let mut out = String::with_capacity(name.len());
            out.push(c.to_ascii_lowercase());
            out.push_str(chars.as_str());
            out
        }
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(specs: &[RuleSpec]) -> Vec<&str> {
        specs.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn empty_and_skip_yield_no_rules() {
        assert!(parse_rules("").unwrap().is_empty());
        assert!(parse_rules("-").unwrap().is_empty());
        assert!(parse_rules("  ").unwrap().is_empty());
    }

    #[test]
    fn names_are_canonicalized_and_params_kept_verbatim() {
        let specs = parse_rules("required,gt=2,date=%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(names(&specs), ["Required", "Gt", "Date"]);
        assert_eq!(specs[1].param, "2");
        assert_eq!(specs[2].param, "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn already_canonical_names_pass_through() {
        let specs = parse_rules("idCard,trimSpace").unwrap();
        assert_eq!(names(&specs), ["IdCard", "TrimSpace"]);
    }

    #[test]
    fn segments_are_trimmed_and_empties_skipped() {
        let specs = parse_rules("required, email,").unwrap();
        assert_eq!(names(&specs), ["Required", "Email"]);
    }

    #[test]
    fn regex_group_is_extracted_and_runs_first() {
        let specs = parse_rules(r"required,regex=(/^\d{3}$/)").unwrap();
        assert_eq!(names(&specs), ["Regex", "Required"]);
        assert_eq!(specs[0].param, r"^\d{3}$");
        assert!(specs[0].pattern.as_ref().unwrap().is_match("001"));
        assert!(!specs[0].pattern.as_ref().unwrap().is_match("0a1"));
    }

    #[test]
    fn regex_pattern_may_contain_commas() {
        let specs = parse_rules(r"required,regex=(/^a{1,3}$/),email").unwrap();
        assert_eq!(names(&specs), ["Regex", "Required", "Email"]);
        assert_eq!(specs[0].param, "^a{1,3}$");
    }

    #[test]
    fn regex_group_may_sit_anywhere() {
        let specs = parse_rules(r"regex=(/^x$/),required").unwrap();
        assert_eq!(names(&specs), ["Regex", "Required"]);
    }

    #[test]
    fn unterminated_regex_is_structural() {
        let err = parse_rules("required,regex=(/foo").unwrap_err();
        assert!(matches!(err, SieveError::UnterminatedRegex { .. }));
    }

    #[test]
    fn close_marker_before_open_is_structural() {
        let err = parse_rules("a/),regex=(/foo").unwrap_err();
        assert!(matches!(err, SieveError::UnterminatedRegex { .. }));
    }

    #[test]
    fn uncompilable_pattern_is_structural() {
        let err = parse_rules("regex=(/((/)").unwrap_err();
        assert!(matches!(err, SieveError::BadPattern { .. }));
    }

    #[test]
    fn bare_regex_rule_keeps_param_uncompiled() {
        let specs = parse_rules("regex=^foo$").unwrap();
        assert_eq!(names(&specs), ["Regex"]);
        assert_eq!(specs[0].param, "^foo$");
        assert!(specs[0].pattern.is_none());
    }

    #[test]
    fn case_helpers_are_ascii_only() {
        assert_eq!(to_upper_first("gt"), "Gt");
        assert_eq!(to_upper_first("idCard"), "IdCard");
        assert_eq!(to_upper_first(""), "");
        assert_eq!(to_lower_first("TrimSpace"), "trimSpace");
        assert_eq!(to_lower_first("gt"), "gt");
    }
}
