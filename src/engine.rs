//! The traversal engine.
//!
//! One [`Engine`] owns the validation configuration (today: the time zone
//! read by the `date` rule) and exposes the single entry point,
//! [`Engine::validate`]. Traversal is depth-first and synchronous: for
//! each declared field, in declaration order, parse the annotation,
//! resolve each rule against the registry, gate on the zero-value
//! short-circuit, and invoke the handler; `dive` re-enters the engine on
//! nested records, sharing the same accumulator. After the last field,
//! the record's custom-validation hook runs exactly once.
//!
//! The engine is `Copy`-cheap and immutable after construction, so one
//! instance may serve any number of threads validating independent
//! records. The zone travels with the engine rather than through global
//! state, so concurrent engines with different zones cannot race.

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::diagnostics::SieveError;
use crate::record::Record;
use crate::registry::{self, Ctx};
use crate::report::Report;
use crate::syntax;

/// Default layout for date-only text, e.g. `2022-01-02`.
pub const DATE_LAYOUT: &str = "%Y-%m-%d";
/// Default layout for datetime text, e.g. `2022-01-02 15:04:05`.
pub const DATETIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// ZONE CONFIGURATION
// ============================================================================

/// The time zone the `date` rule parses wall-clock text against.
///
/// Parsed from `"UTC"`, `"Local"`, or a fixed `±HH:MM` offset; anything
/// else is [`SieveError::UnknownZone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl Default for Zone {
    fn default() -> Self {
        Zone::Local
    }
}

impl FromStr for Zone {
    type Err = SieveError;

    fn from_str(s: &str) -> Result<Self, SieveError> {
        match s {
            "UTC" | "utc" | "Z" => Ok(Zone::Utc),
            "Local" | "local" => Ok(Zone::Local),
            _ => parse_offset(s)
                .map(Zone::Fixed)
                .ok_or_else(|| SieveError::UnknownZone {
                    name: s.to_string(),
                }),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Utc => f.write_str("UTC"),
            Zone::Local => f.write_str("Local"),
            Zone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl Zone {
    /// Whether `text` parses under the chrono `layout` as a valid
    /// wall-clock value in this zone. Datetime, date-only, and time-only
    /// layouts are all accepted.
    pub fn parses(&self, layout: &str, text: &str) -> bool {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return self.admits(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, layout) {
            return self.admits(d.and_time(NaiveTime::MIN));
        }
        NaiveTime::parse_from_str(text, layout).is_ok()
    }

    /// Fixed-offset zones admit every wall-clock value; the local zone
    /// rejects values that fall into a DST gap.
    fn admits(&self, dt: NaiveDateTime) -> bool {
        match self {
            Zone::Utc | Zone::Fixed(_) => true,
            Zone::Local => Local.from_local_datetime(&dt).earliest().is_some(),
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    zone: Zone,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(zone: Zone) -> Self {
        Engine { zone }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Validate one record. `Err` is the structural channel (malformed
    /// rule syntax, unknown rule, dispatch mismatch) and aborts the whole
    /// call; soft field failures land in the returned [`Report`], whose
    /// emptiness is the pass/fail answer.
    pub fn validate(&self, record: &mut dyn Record) -> Result<Report, SieveError> {
        let mut report = Report::new();
        self.traverse(record, &mut report)?;
        Ok(report)
    }

    /// Depth-first walk of one record instance; `dive` re-enters here
    /// with the same report.
    pub(crate) fn traverse(
        &self,
        record: &mut dyn Record,
        report: &mut Report,
    ) -> Result<(), SieveError> {
        let ctx = Ctx { engine: self };

        let mut fields = record.fields();
        for field in fields.iter_mut() {
            let specs = syntax::parse_rules(field.meta.rules)?;
            for spec in &specs {
                let descriptor = registry::resolve(&spec.name).ok_or_else(|| {
                    SieveError::UnknownRule {
                        name: syntax::to_lower_first(&spec.name),
                    }
                })?;
                registry::check_arity(descriptor)?;
                if descriptor.skip_zero && field.value.is_zero() {
                    continue;
                }
                (descriptor.run)(&ctx, &field.meta, &mut field.value, spec, report)?;
            }
        }
        drop(fields);

        // The hook runs once per record instance, after all declared
        // fields, whether or not errors were recorded above.
        record.post_validate(report);
        Ok(())
    }
}

/// Validate with a default-configured engine.
pub fn validate<R: Record>(record: &mut R) -> Result<Report, SieveError> {
    Engine::new().validate(record)
}
