//! The rule registry: a closed, process-lifetime table mapping canonical
//! rule names to handler descriptors.
//!
//! Built once on first use and read-only thereafter, so concurrent
//! validation of independent records needs no locking. There is no public
//! registration API — the catalog is fixed, and ad-hoc logic belongs in a
//! record's `post_validate` hook. `build_registry` is the single source
//! of truth for what exists; never construct a second table.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::diagnostics::SieveError;
use crate::engine::Engine;
use crate::record::{FieldMeta, Value};
use crate::report::Report;
use crate::rules;
use crate::syntax::{self, RuleSpec};

/// Per-invocation context threaded to every handler. Carries the engine
/// so `dive` can recurse and `date` can read the configured time zone.
pub struct Ctx<'e> {
    pub engine: &'e Engine,
}

/// The uniform handler signature: static field description, mutable value
/// handle, the parsed rule spec, and the shared accumulator. `Ok` means
/// "dispatched"; failed checks are soft errors pushed into the report.
pub type RuleFn =
    fn(&Ctx<'_>, &FieldMeta, &mut Value<'_>, &RuleSpec, &mut Report) -> Result<(), SieveError>;

/// Number of per-field arguments a handler invocation passes (meta,
/// value, spec). Descriptors declare their arity against this.
pub const INVOKE_ARITY: usize = 3;

/// One registry entry.
pub struct Descriptor {
    pub name: &'static str,
    /// Declared invocation arity, checked at dispatch.
    pub arity: usize,
    /// Whether the handler may write through the value handle.
    pub mutates: bool,
    /// Whether dispatch skips the handler on a zero/empty value. Only the
    /// required and default families (and dive, which must visit unset
    /// pointer slots) opt out.
    pub skip_zero: bool,
    pub run: RuleFn,
}

static REGISTRY: Lazy<HashMap<&'static str, Descriptor>> = Lazy::new(build_registry);

fn build_registry() -> HashMap<&'static str, Descriptor> {
    let mut table = HashMap::new();
    let mut add = |name: &'static str, mutates: bool, skip_zero: bool, run: RuleFn| {
        table.insert(
            name,
            Descriptor {
                name,
                arity: INVOKE_ARITY,
                mutates,
                skip_zero,
                run,
            },
        );
    };

    add("Required", false, false, rules::required);
    add("Gt", false, true, rules::gt);
    add("Gte", false, true, rules::gte);
    add("Lt", false, true, rules::lt);
    add("Lte", false, true, rules::lte);
    add("Len", false, true, rules::len);
    add("In", false, true, rules::one_of);
    add("Sin", false, true, rules::subset_of);
    add("Distinct", false, true, rules::distinct);
    add("Date", false, true, rules::date);
    add("Regex", false, true, rules::regex_match);
    add("Email", false, true, rules::email);
    add("Mobile", false, true, rules::mobile);
    add("Url", false, true, rules::url);
    add("Base64", false, true, rules::base64);
    add("Ip", false, true, rules::ip);
    add("IdCard", false, true, rules::id_card);
    add("Numeric", false, true, rules::numeric);
    add("Default", true, false, rules::default_value);
    add("TrimSpace", true, true, rules::trim_space);
    add("Dive", true, false, rules::dive);

    table
}

/// Look up a canonical rule name. `None` becomes the structural
/// `UnknownRule` failure at the dispatch site.
pub fn resolve(name: &str) -> Option<&'static Descriptor> {
    REGISTRY.get(name)
}

/// Dispatch-time arity check. With a closed catalog of uniform fn
/// pointers this only fires on a misdeclared descriptor.
pub fn check_arity(descriptor: &Descriptor) -> Result<(), SieveError> {
    if descriptor.arity == INVOKE_ARITY {
        Ok(())
    } else {
        Err(SieveError::Arity {
            name: syntax::to_lower_first(descriptor.name),
            expected: INVOKE_ARITY,
            got: descriptor.arity,
        })
    }
}
