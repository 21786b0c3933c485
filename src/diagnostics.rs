//! Structural failure channel for the validation engine.
//!
//! Soft field failures (a value failing its rule) are plain data and
//! accumulate in a [`Report`](crate::report::Report); they never travel
//! through this module. `SieveError` covers the cases that abort a
//! `validate` call outright: malformed rule syntax, an unknown rule name,
//! a dispatch arity mismatch, or an unrecognized time-zone name. Syntax
//! errors carry the offending annotation string as miette source code so
//! the diagnostic can point at the exact span.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SieveError {
    /// `regex=(/` was opened but no closing `/)` follows it.
    #[error("unterminated regex rule: missing closing `/)`")]
    #[diagnostic(
        code(sieve::syntax::unterminated_regex),
        help("write regex rules as `regex=(/pattern/)`")
    )]
    UnterminatedRegex {
        #[source_code]
        annotation: String,
        #[label("regex rule opens here")]
        open: SourceSpan,
    },

    /// The bracketed regex pattern failed to compile.
    #[error("invalid regex pattern in rule annotation")]
    #[diagnostic(code(sieve::syntax::bad_pattern))]
    BadPattern {
        #[source]
        cause: regex::Error,
        #[source_code]
        annotation: String,
        #[label("this pattern")]
        span: SourceSpan,
    },

    /// A rule name with no entry in the registry. The catalog is closed;
    /// ad-hoc checks belong in a record's `post_validate` hook.
    #[error("unknown rule `{name}`")]
    #[diagnostic(
        code(sieve::registry::unknown_rule),
        help(
            "built-in rules: required, gt, gte, lt, lte, len, in, sin, distinct, \
             date, regex, email, mobile, url, base64, ip, idCard, numeric, \
             default, trimSpace, dive"
        )
    )]
    UnknownRule { name: String },

    /// A descriptor whose declared arity disagrees with the dispatch
    /// convention. Only reachable through a misdeclared catalog entry.
    #[error("rule `{name}` declares arity {got}, dispatch expects {expected}")]
    #[diagnostic(code(sieve::registry::arity))]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("unrecognized time zone `{name}`")]
    #[diagnostic(
        code(sieve::config::unknown_zone),
        help("supported forms: `UTC`, `Local`, or a fixed offset such as `+08:00`")
    )]
    UnknownZone { name: String },
}
